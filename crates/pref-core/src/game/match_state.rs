use crate::game::events::GameEvent;
use crate::game::serialization::{MatchSnapshot, SaveError};
use crate::model::auction::{AuctionResolution, BidError};
use crate::model::bid::{Bid, Contract};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::round::{ExchangeError, PlayError, PlayOutcome, RoundState};
use crate::model::score::{RoundResult, RoundScore, RuleConfig, ScoreBoard, score_round};
use crate::model::seat::Seat;
use crate::model::trick::Trick;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Drives a whole session: deals rounds, routes commands into the
/// current round, applies scoring exactly once per round, and decides
/// when the match is over.
#[derive(Debug, Clone)]
pub struct MatchState {
    config: RuleConfig,
    scores: ScoreBoard,
    dealer: Seat,
    round_number: u32,
    pass_round_streak: u32,
    current_round: RoundState,
    history: Vec<RoundRecord>,
    status: MatchStatus,
    events: Vec<GameEvent>,
    rng: StdRng,
    seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    InProgress,
    Finished(FinishReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// A player's pool reached the configured maximum.
    PoolFilled(Seat),
    MaxRoundsPlayed,
    Stopped,
}

/// One scored round, kept for the score-history display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub contract: Option<Contract>,
    pub tricks: [u8; 3],
    pub score: RoundScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("the match is finished")]
    MatchFinished,
    #[error(transparent)]
    Bid(#[from] BidError),
    #[error(transparent)]
    Play(#[from] PlayError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

impl MatchState {
    pub fn new(config: RuleConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    pub fn with_seed(config: RuleConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let dealer = Seat::South;
        let deck = Deck::shuffled(&mut rng);
        let current_round = RoundState::deal(&deck, dealer, config.auction_floor(0));
        Self {
            config,
            scores: ScoreBoard::new(),
            dealer,
            round_number: 1,
            pass_round_streak: 0,
            current_round,
            history: Vec::new(),
            status: MatchStatus::InProgress,
            events: Vec::new(),
            rng,
            seed,
        }
    }

    pub(crate) fn from_snapshot(snapshot: MatchSnapshot) -> Result<Self, SaveError> {
        snapshot.validate()?;
        let mut rng = StdRng::seed_from_u64(snapshot.seed);
        // Replay the shuffles already consumed so future deals follow
        // the original sequence.
        for _ in 0..snapshot.round_number {
            let _ = Deck::shuffled(&mut rng);
        }
        Ok(Self {
            config: snapshot.config,
            scores: snapshot.scores,
            dealer: snapshot.dealer,
            round_number: snapshot.round_number,
            pass_round_streak: snapshot.pass_round_streak,
            current_round: snapshot.round,
            history: snapshot.history,
            status: snapshot.status,
            events: Vec::new(),
            rng,
            seed: snapshot.seed,
        })
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn round(&self) -> &RoundState {
        &self.current_round
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn pass_round_streak(&self) -> u32 {
        self.pass_round_streak
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Whose action the match is waiting on, if anyone's.
    pub fn turn(&self) -> Option<Seat> {
        match self.status {
            MatchStatus::InProgress => self.current_round.turn(),
            MatchStatus::Finished(_) => None,
        }
    }

    /// A seat's hand, gated by the reveal capability: callers see their
    /// own cards, and everyone's with `reveal_hands` set.
    pub fn current_hand(&self, viewer: Seat, seat: Seat, reveal_hands: bool) -> Option<&Hand> {
        if reveal_hands || viewer == seat {
            Some(self.current_round.hand(seat))
        } else {
            None
        }
    }

    pub fn legal_moves(&self, seat: Seat) -> Vec<Card> {
        self.current_round.legal_moves(seat)
    }

    pub fn current_trick(&self) -> &Trick {
        self.current_round.current_trick()
    }

    /// Notifications accumulated since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn submit_bid(&mut self, seat: Seat, bid: Bid) -> Result<(), GameError> {
        self.ensure_in_progress(seat)?;
        match self.current_round.submit_bid(seat, bid) {
            Ok(resolution) => {
                self.after_auction_action(resolution);
                Ok(())
            }
            Err(err) => Err(self.reject(seat, err.into())),
        }
    }

    pub fn submit_pass(&mut self, seat: Seat) -> Result<(), GameError> {
        self.ensure_in_progress(seat)?;
        match self.current_round.submit_pass(seat) {
            Ok(resolution) => {
                self.after_auction_action(resolution);
                Ok(())
            }
            Err(err) => Err(self.reject(seat, err.into())),
        }
    }

    pub fn take_talon(&mut self, seat: Seat) -> Result<[Card; 2], GameError> {
        self.ensure_in_progress(seat)?;
        match self.current_round.take_talon(seat) {
            Ok(talon) => {
                self.events.push(GameEvent::HandChanged(seat));
                Ok(talon)
            }
            Err(err) => Err(self.reject(seat, err.into())),
        }
    }

    pub fn discard(&mut self, seat: Seat, cards: [Card; 2]) -> Result<(), GameError> {
        self.ensure_in_progress(seat)?;
        match self.current_round.discard(seat, cards) {
            Ok(()) => {
                self.events.push(GameEvent::HandChanged(seat));
                Ok(())
            }
            Err(err) => Err(self.reject(seat, err.into())),
        }
    }

    pub fn return_drop(&mut self, seat: Seat) -> Result<(), GameError> {
        self.ensure_in_progress(seat)?;
        match self.current_round.return_drop(seat) {
            Ok(()) => {
                self.events.push(GameEvent::HandChanged(seat));
                Ok(())
            }
            Err(err) => Err(self.reject(seat, err.into())),
        }
    }

    pub fn declare_contract(&mut self, seat: Seat, bid: Bid) -> Result<(), GameError> {
        self.ensure_in_progress(seat)?;
        match self.current_round.declare(seat, bid) {
            Ok(()) => {
                if let Some(turn) = self.current_round.turn() {
                    self.events.push(GameEvent::TurnChanged(turn));
                }
                Ok(())
            }
            Err(err) => Err(self.reject(seat, err.into())),
        }
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, GameError> {
        self.ensure_in_progress(seat)?;
        let outcome = match self.current_round.play_card(seat, card) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.reject(seat, err.into())),
        };
        self.events.push(GameEvent::HandChanged(seat));
        match outcome {
            PlayOutcome::Played => {
                if let Some(turn) = self.current_round.turn() {
                    self.events.push(GameEvent::TurnChanged(turn));
                }
            }
            PlayOutcome::TrickCompleted { winner } => {
                self.events.push(GameEvent::TrickCompleted { winner });
                self.events.push(GameEvent::TurnChanged(winner));
            }
            PlayOutcome::RoundComplete { winner, .. } => {
                self.events.push(GameEvent::TrickCompleted { winner });
                self.finish_round();
            }
        }
        Ok(outcome)
    }

    /// Ends the match at the players' request.
    pub fn stop(&mut self) {
        if matches!(self.status, MatchStatus::InProgress) {
            self.finish(FinishReason::Stopped);
        }
    }

    fn ensure_in_progress(&mut self, seat: Seat) -> Result<(), GameError> {
        match self.status {
            MatchStatus::InProgress => Ok(()),
            MatchStatus::Finished(_) => Err(self.reject(seat, GameError::MatchFinished)),
        }
    }

    fn reject(&mut self, seat: Seat, err: GameError) -> GameError {
        self.events.push(GameEvent::InvalidMoveAttempted {
            seat,
            reason: err.to_string(),
        });
        err
    }

    fn after_auction_action(&mut self, resolution: Option<AuctionResolution>) {
        if let Some(AuctionResolution::Contract(contract)) = resolution {
            self.events.push(GameEvent::TurnChanged(contract.declarer));
        } else if let Some(turn) = self.current_round.turn() {
            self.events.push(GameEvent::TurnChanged(turn));
        }
    }

    fn finish_round(&mut self) {
        let result = RoundResult {
            contract: self.current_round.contract(),
            tricks: self.current_round.tricks_taken(),
            pass_round_streak: self.pass_round_streak,
        };
        let score = score_round(&result, &self.config);
        tracing::info!(
            round = self.round_number,
            contract = ?result.contract,
            tricks = ?result.tricks,
            "round scored"
        );
        self.scores.apply(&score);
        self.history.push(RoundRecord {
            contract: result.contract,
            tricks: result.tricks,
            score,
        });
        self.events.push(GameEvent::RoundScored { score });
        if result.contract.is_none() {
            self.pass_round_streak += 1;
        } else {
            self.pass_round_streak = 0;
        }

        if let Some(seat) = self.scores.pool_filled(self.config.max_pool) {
            self.finish(FinishReason::PoolFilled(seat));
            return;
        }
        if let Some(max_rounds) = self.config.max_rounds {
            if self.round_number >= max_rounds {
                self.finish(FinishReason::MaxRoundsPlayed);
                return;
            }
        }

        self.round_number += 1;
        self.dealer = self.dealer.next();
        let deck = Deck::shuffled(&mut self.rng);
        self.current_round = RoundState::deal(
            &deck,
            self.dealer,
            self.config.auction_floor(self.pass_round_streak),
        );
        for seat in Seat::LOOP.iter().copied() {
            self.events.push(GameEvent::HandChanged(seat));
        }
        self.events.push(GameEvent::TurnChanged(self.dealer.next()));
    }

    fn finish(&mut self, reason: FinishReason) {
        tracing::info!(?reason, "match finished");
        self.status = MatchStatus::Finished(reason);
        self.events.push(GameEvent::MatchFinished { reason });
    }
}
