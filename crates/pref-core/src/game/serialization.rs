use crate::game::match_state::{MatchState, MatchStatus, RoundRecord};
use crate::model::card::Card;
use crate::model::deck::DECK_SIZE;
use crate::model::round::{RoundPhase, RoundState};
use crate::model::score::{RuleConfig, ScoreBoard};
use crate::model::seat::Seat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// The persisted `.prf` body: everything needed to resume a match
/// exactly, including a round stopped mid-trick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub config: RuleConfig,
    pub seed: u64,
    pub round_number: u32,
    pub dealer: Seat,
    pub pass_round_streak: u32,
    pub scores: ScoreBoard,
    pub history: Vec<RoundRecord>,
    pub status: MatchStatus,
    pub round: RoundState,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("corrupt save state: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        MatchSnapshot {
            config: *state.config(),
            seed: state.seed(),
            round_number: state.round_number(),
            dealer: state.dealer(),
            pass_round_streak: state.pass_round_streak(),
            scores: *state.scores(),
            history: state.history().to_vec(),
            status: state.status(),
            round: state.round().clone(),
        }
    }

    pub fn restore(self) -> Result<MatchState, SaveError> {
        MatchState::from_snapshot(self)
    }

    pub fn to_json(state: &MatchState) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(&Self::capture(state))?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Integrity check before a snapshot is trusted: every card must be
    /// accounted for exactly once across hands, talon, discard buffer
    /// and played tricks.
    pub(crate) fn validate(&self) -> Result<(), SaveError> {
        let round = &self.round;
        let mut cards: Vec<Card> = Vec::with_capacity(DECK_SIZE);
        for seat in Seat::LOOP.iter().copied() {
            cards.extend(round.hand(seat).iter().copied());
        }
        if !round.talon_taken() {
            cards.extend(round.talon().iter().copied());
        }
        if let Some(out) = round.cards_out() {
            cards.extend(out.iter().copied());
        }
        for trick in round.trick_history() {
            cards.extend(trick.plays().iter().map(|play| play.card));
        }
        cards.extend(round.current_trick().plays().iter().map(|play| play.card));

        let unique: HashSet<Card> = cards.iter().copied().collect();
        if unique.len() != cards.len() {
            return Err(SaveError::Corrupt(
                "a card is present in two places".into(),
            ));
        }
        if cards.len() != DECK_SIZE {
            return Err(SaveError::Corrupt(format!(
                "{} cards accounted for, expected {DECK_SIZE}",
                cards.len()
            )));
        }

        let taken: usize = round.tricks_taken().iter().map(|&t| usize::from(t)).sum();
        if taken != round.trick_history().len() {
            return Err(SaveError::Corrupt(
                "trick counts disagree with the trick history".into(),
            ));
        }

        if let Some(contract) = round.contract() {
            if !contract.bid.is_valid() {
                return Err(SaveError::Corrupt(format!(
                    "contract bid {} is off the ladder",
                    contract.bid
                )));
            }
        }
        if let RoundPhase::Bidding(auction) = round.phase() {
            if let Some(high) = auction.high_bid() {
                if !high.bid.is_valid() {
                    return Err(SaveError::Corrupt(format!(
                        "auction bid {} is off the ladder",
                        high.bid
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchSnapshot, SaveError};
    use crate::game::match_state::{MatchState, MatchStatus};
    use crate::model::bid::Bid;
    use crate::model::card::Card;
    use crate::model::hand::Hand;
    use crate::model::rank::Rank;
    use crate::model::round::RoundState;
    use crate::model::score::{RuleConfig, ScoreBoard};
    use crate::model::seat::Seat;
    use crate::model::suit::Suit;

    fn mid_round_match() -> MatchState {
        let mut state = MatchState::with_seed(RuleConfig::default(), 42);
        state.submit_bid(Seat::West, Bid::MINIMUM).unwrap();
        state.submit_pass(Seat::East).unwrap();
        state.submit_pass(Seat::South).unwrap();
        let talon = state.take_talon(Seat::West).unwrap();
        state.discard(Seat::West, talon).unwrap();
        state.declare_contract(Seat::West, Bid::MINIMUM).unwrap();
        for _ in 0..4 {
            let seat = state.turn().unwrap();
            let moves = state.legal_moves(seat);
            state.play_card(seat, moves[0]).unwrap();
        }
        state
    }

    fn snapshot_with_round(round: RoundState) -> MatchSnapshot {
        MatchSnapshot {
            config: RuleConfig::default(),
            seed: 1,
            round_number: 1,
            dealer: Seat::South,
            pass_round_streak: 0,
            scores: ScoreBoard::new(),
            history: Vec::new(),
            status: MatchStatus::InProgress,
            round,
        }
    }

    #[test]
    fn json_roundtrip_restores_mid_round_state() {
        let state = mid_round_match();
        let json = MatchSnapshot::to_json(&state).unwrap();
        let restored = MatchSnapshot::from_json(&json).unwrap().restore().unwrap();

        assert_eq!(restored.round(), state.round());
        assert_eq!(restored.scores(), state.scores());
        assert_eq!(restored.round_number(), state.round_number());
        assert_eq!(restored.dealer(), state.dealer());
        assert_eq!(restored.status(), state.status());
        assert_eq!(restored.turn(), state.turn());
        assert_eq!(restored.seed(), state.seed());
    }

    #[test]
    fn restored_match_keeps_playing_to_completion() {
        let state = mid_round_match();
        let snapshot = MatchSnapshot::capture(&state);
        let mut restored = snapshot.restore().unwrap();

        loop {
            let Some(seat) = restored.turn() else { break };
            let moves = restored.legal_moves(seat);
            if moves.is_empty() {
                break;
            }
            restored.play_card(seat, moves[0]).unwrap();
        }
        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.round_number(), 2);
    }

    #[test]
    fn duplicated_card_is_rejected_as_corrupt() {
        let duplicate = Card::new(Rank::Ace, Suit::Hearts);
        let mut cards = Vec::new();
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        // Hand out 10/10/10 but plant the ace of hearts twice.
        let mut south: Vec<Card> = cards[0..10].to_vec();
        south[0] = duplicate;
        let west: Vec<Card> = cards[10..20].to_vec();
        let east: Vec<Card> = cards[20..30].to_vec();
        let talon = [cards[30], cards[31]];

        let round = RoundState::from_hands(
            [
                Hand::with_cards(south),
                Hand::with_cards(west),
                Hand::with_cards(east),
            ],
            talon,
            Seat::South,
            0,
        );
        match snapshot_with_round(round).restore() {
            Err(SaveError::Corrupt(reason)) => {
                assert!(reason.contains("two places"), "unexpected reason {reason}")
            }
            other => panic!("expected corrupt save, got {other:?}"),
        }
    }

    #[test]
    fn short_deck_is_rejected_as_corrupt() {
        let mut cards = Vec::new();
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        // Nine-card South hand: one card vanished from the deal.
        let round = RoundState::from_hands(
            [
                Hand::with_cards(cards[0..9].to_vec()),
                Hand::with_cards(cards[10..20].to_vec()),
                Hand::with_cards(cards[20..30].to_vec()),
            ],
            [cards[30], cards[31]],
            Seat::South,
            0,
        );
        match snapshot_with_round(round).restore() {
            Err(SaveError::Corrupt(reason)) => {
                assert!(reason.contains("expected 32"), "unexpected reason {reason}")
            }
            other => panic!("expected corrupt save, got {other:?}"),
        }
    }

    #[test]
    fn off_ladder_contract_bid_is_rejected_as_corrupt() {
        let state = mid_round_match();
        let json = MatchSnapshot::to_json(&state).unwrap();
        let tampered = json.replace("\"level\": 6", "\"level\": 200");
        assert_ne!(tampered, json);
        match MatchSnapshot::from_json(&tampered).unwrap().restore() {
            Err(SaveError::Corrupt(reason)) => {
                assert!(reason.contains("ladder"), "unexpected reason {reason}")
            }
            other => panic!("expected corrupt save, got {other:?}"),
        }
    }

    #[test]
    fn off_ladder_auction_bid_is_rejected_as_corrupt() {
        let mut state = MatchState::with_seed(RuleConfig::default(), 42);
        state.submit_bid(Seat::West, Bid::MINIMUM).unwrap();

        let json = MatchSnapshot::to_json(&state).unwrap();
        let tampered = json.replace("\"level\": 6", "\"level\": 200");
        assert_ne!(tampered, json);
        match MatchSnapshot::from_json(&tampered).unwrap().restore() {
            Err(SaveError::Corrupt(reason)) => {
                assert!(reason.contains("ladder"), "unexpected reason {reason}")
            }
            other => panic!("expected corrupt save, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_survives_a_completed_pass_round_history() {
        let mut state = MatchState::with_seed(RuleConfig::default(), 6);
        for seat in [Seat::West, Seat::East, Seat::South] {
            state.submit_pass(seat).unwrap();
        }
        loop {
            let Some(seat) = state.turn() else { break };
            let moves = state.legal_moves(seat);
            if moves.is_empty() {
                break;
            }
            state.play_card(seat, moves[0]).unwrap();
        }
        assert_eq!(state.round_number(), 2);

        let json = MatchSnapshot::to_json(&state).unwrap();
        let restored = MatchSnapshot::from_json(&json).unwrap().restore().unwrap();
        assert_eq!(restored.history(), state.history());
        assert_eq!(restored.pass_round_streak(), 1);
        assert_eq!(restored.round(), state.round());
    }
}
