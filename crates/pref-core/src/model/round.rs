use crate::model::auction::{Auction, AuctionResolution, BidError};
use crate::model::bid::{Bid, Contract};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use crate::model::trick::{Trick, TrickError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One round of Preferans: auction, talon exchange, then ten tricks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    hands: [Hand; 3],
    talon: [Card; 2],
    talon_taken: bool,
    cards_out: Option<[Card; 2]>,
    phase: RoundPhase,
    contract: Option<Contract>,
    current_trick: Trick,
    trick_history: Vec<Trick>,
    tricks_taken: [u8; 3],
    dealer: Seat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    Bidding(Auction),
    Exchanging,
    Playing,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted {
        winner: Seat,
    },
    RoundComplete {
        winner: Seat,
        tricks: [u8; 3],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("the round is not in the playing phase")]
    NotInPlayPhase,
    #[error("card {0} is not in the hand")]
    CardNotInHand(Card),
    #[error("expected {expected} to play but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("must follow the led suit {0}")]
    MustFollowSuit(Suit),
    #[error("void in the led suit, must play trump {0}")]
    MustPlayTrump(Suit),
    #[error(transparent)]
    Trick(#[from] TrickError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("the round is not in the exchange phase")]
    NotInExchangePhase,
    #[error("{0} is not the declarer")]
    NotDeclarer(Seat),
    #[error("the talon was already taken")]
    TalonAlreadyTaken,
    #[error("the talon has not been taken yet")]
    TalonNotTaken,
    #[error("two cards are already set aside")]
    AlreadyDropped,
    #[error("no cards have been set aside")]
    NothingDropped,
    #[error("the two discards must be distinct")]
    DuplicateDiscard,
    #[error("card {0} is not in the hand")]
    CardNotInHand(Card),
    #[error("two cards must be set aside before declaring")]
    DiscardRequired,
    #[error("the final contract cannot rank below the winning bid")]
    BelowAuctionBid,
}

impl RoundState {
    /// `floor` is the minimum opening bid rank for the auction (raised
    /// by rule variants). The first hand, the seat after the dealer,
    /// bids first and leads the first trick.
    pub fn deal(deck: &Deck, dealer: Seat, floor: u8) -> Self {
        let (hands, talon) = deck.deal();
        Self::from_hands(hands, talon, dealer, floor)
    }

    /// Builds a round from explicit hands. Callers are responsible for
    /// handing in a consistent partition of the deck.
    pub fn from_hands(hands: [Hand; 3], talon: [Card; 2], dealer: Seat, floor: u8) -> Self {
        let first_hand = dealer.next();
        Self {
            hands,
            talon,
            talon_taken: false,
            cards_out: None,
            phase: RoundPhase::Bidding(Auction::new(first_hand, floor)),
            contract: None,
            current_trick: Trick::new(first_hand),
            trick_history: Vec::new(),
            tricks_taken: [0; 3],
            dealer,
        }
    }

    pub fn phase(&self) -> &RoundPhase {
        &self.phase
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn talon(&self) -> &[Card; 2] {
        &self.talon
    }

    pub fn talon_taken(&self) -> bool {
        self.talon_taken
    }

    /// The declarer's two-card discard buffer, if currently occupied.
    pub fn cards_out(&self) -> Option<&[Card; 2]> {
        self.cards_out.as_ref()
    }

    pub fn contract(&self) -> Option<Contract> {
        self.contract
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.contract.and_then(|c| c.bid.trump().suit())
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn tricks_taken(&self) -> [u8; 3] {
        self.tricks_taken
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, RoundPhase::Complete)
    }

    /// Whose action the round is waiting on, if anyone's.
    pub fn turn(&self) -> Option<Seat> {
        match &self.phase {
            RoundPhase::Bidding(auction) => Some(auction.turn()),
            RoundPhase::Exchanging => self.contract.map(|c| c.declarer),
            RoundPhase::Playing => Some(self.current_trick.expected_seat()),
            RoundPhase::Complete => None,
        }
    }

    pub fn submit_bid(
        &mut self,
        seat: Seat,
        bid: Bid,
    ) -> Result<Option<AuctionResolution>, BidError> {
        let resolution = match &mut self.phase {
            RoundPhase::Bidding(auction) => auction.bid(seat, bid)?,
            _ => return Err(BidError::BiddingClosed),
        };
        if let Some(resolution) = resolution {
            self.resolve_auction(resolution);
        }
        Ok(resolution)
    }

    pub fn submit_pass(&mut self, seat: Seat) -> Result<Option<AuctionResolution>, BidError> {
        let resolution = match &mut self.phase {
            RoundPhase::Bidding(auction) => auction.pass(seat)?,
            _ => return Err(BidError::BiddingClosed),
        };
        if let Some(resolution) = resolution {
            self.resolve_auction(resolution);
        }
        Ok(resolution)
    }

    fn resolve_auction(&mut self, resolution: AuctionResolution) {
        match resolution {
            AuctionResolution::Contract(contract) => {
                self.contract = Some(contract);
                self.phase = RoundPhase::Exchanging;
            }
            // All passed: the pass round is played out with no trump.
            AuctionResolution::AllPassed => {
                self.contract = None;
                self.phase = RoundPhase::Playing;
            }
        }
    }

    fn check_declarer(&self, seat: Seat) -> Result<Contract, ExchangeError> {
        let contract = match self.phase {
            RoundPhase::Exchanging => self
                .contract
                .ok_or(ExchangeError::NotInExchangePhase)?,
            _ => return Err(ExchangeError::NotInExchangePhase),
        };
        if contract.declarer != seat {
            return Err(ExchangeError::NotDeclarer(seat));
        }
        Ok(contract)
    }

    /// Moves both talon cards into the declarer's hand.
    pub fn take_talon(&mut self, seat: Seat) -> Result<[Card; 2], ExchangeError> {
        self.check_declarer(seat)?;
        if self.talon_taken {
            return Err(ExchangeError::TalonAlreadyTaken);
        }
        for card in self.talon {
            self.hands[seat.index()]
                .insert(card)
                .expect("talon cards are disjoint from all hands");
        }
        self.talon_taken = true;
        Ok(self.talon)
    }

    /// Sets two cards aside after the talon pickup. Reversible via
    /// [`RoundState::return_drop`] until the final contract is declared.
    pub fn discard(&mut self, seat: Seat, cards: [Card; 2]) -> Result<(), ExchangeError> {
        self.check_declarer(seat)?;
        if !self.talon_taken {
            return Err(ExchangeError::TalonNotTaken);
        }
        if self.cards_out.is_some() {
            return Err(ExchangeError::AlreadyDropped);
        }
        if cards[0] == cards[1] {
            return Err(ExchangeError::DuplicateDiscard);
        }
        for card in cards {
            if !self.hands[seat.index()].contains(card) {
                return Err(ExchangeError::CardNotInHand(card));
            }
        }
        for card in cards {
            self.hands[seat.index()]
                .remove(card)
                .expect("discard presence checked above");
        }
        self.cards_out = Some(cards);
        Ok(())
    }

    /// Returns the set-aside cards to the declarer's hand.
    pub fn return_drop(&mut self, seat: Seat) -> Result<(), ExchangeError> {
        self.check_declarer(seat)?;
        let cards = self.cards_out.ok_or(ExchangeError::NothingDropped)?;
        for card in cards {
            self.hands[seat.index()]
                .insert(card)
                .expect("set-aside cards left the hand when dropped");
        }
        self.cards_out = None;
        Ok(())
    }

    /// Fixes the final contract and opens play. The declared game may
    /// raise the auction bid but never lower it.
    pub fn declare(&mut self, seat: Seat, bid: Bid) -> Result<(), ExchangeError> {
        let auction_contract = self.check_declarer(seat)?;
        if self.cards_out.is_none() {
            return Err(ExchangeError::DiscardRequired);
        }
        if !bid.is_valid() || bid.ladder_rank() < auction_contract.bid.ladder_rank() {
            return Err(ExchangeError::BelowAuctionBid);
        }
        self.contract = Some(Contract {
            declarer: seat,
            bid,
        });
        self.phase = RoundPhase::Playing;
        Ok(())
    }

    /// Follow the led suit if possible; void in it, trump if holding
    /// trump; void in both, discard freely. The first card of a trick
    /// is unrestricted.
    fn check_legality(&self, seat: Seat, card: Card) -> Result<(), PlayError> {
        let Some(led) = self.current_trick.lead_suit() else {
            return Ok(());
        };
        if card.suit == led {
            return Ok(());
        }
        let hand = &self.hands[seat.index()];
        if hand.has_suit(led) {
            return Err(PlayError::MustFollowSuit(led));
        }
        if let Some(trump) = self.trump_suit() {
            if card.suit != trump && hand.has_suit(trump) {
                return Err(PlayError::MustPlayTrump(trump));
            }
        }
        Ok(())
    }

    /// All cards `play_card` would currently accept from `seat`, in
    /// canonical hand order. Empty when it is not that seat's turn.
    pub fn legal_moves(&self, seat: Seat) -> Vec<Card> {
        if !matches!(self.phase, RoundPhase::Playing)
            || self.current_trick.expected_seat() != seat
        {
            return Vec::new();
        }
        self.hands[seat.index()]
            .iter()
            .copied()
            .filter(|card| self.check_legality(seat, *card).is_ok())
            .collect()
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, PlayError> {
        if !matches!(self.phase, RoundPhase::Playing) {
            return Err(PlayError::NotInPlayPhase);
        }
        if !self.hands[seat.index()].contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }
        let expected = self.current_trick.expected_seat();
        if expected != seat {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        self.check_legality(seat, card)?;

        // All checks passed; mutate.
        self.current_trick.play(seat, card)?;
        self.hands[seat.index()]
            .remove(card)
            .map_err(|_| PlayError::CardNotInHand(card))?;

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let winner = self
            .current_trick
            .winner(self.trump_suit())
            .expect("complete trick has a winner");
        self.tricks_taken[winner.index()] += 1;
        let finished = std::mem::replace(&mut self.current_trick, Trick::new(winner));
        self.trick_history.push(finished);

        if self.trick_history.len() == 10 {
            self.phase = RoundPhase::Complete;
            Ok(PlayOutcome::RoundComplete {
                winner,
                tricks: self.tricks_taken,
            })
        } else {
            Ok(PlayOutcome::TrickCompleted { winner })
        }
    }
}
