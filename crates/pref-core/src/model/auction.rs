use crate::model::bid::{Bid, Contract};
use crate::model::seat::Seat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The auction among the three seats. Bidding starts at the first hand
/// (the seat after the dealer) and proceeds seat by seat; passing is
/// terminal for the round. The auction resolves when only one unpassed
/// bidder remains holding the high bid, or when all three pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    turn: Seat,
    passed: [bool; 3],
    high: Option<Contract>,
    floor: u8,
    resolution: Option<AuctionResolution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionResolution {
    Contract(Contract),
    AllPassed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BidError {
    #[error("expected {expected} to act but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("{0} has already passed this round")]
    AlreadyPassed(Seat),
    #[error("bid {0} is not on the bidding ladder")]
    InvalidBid(Bid),
    #[error("bid {0} does not beat the required minimum")]
    BidTooLow(Bid),
    #[error("the auction is already resolved")]
    AuctionOver,
    #[error("bidding is closed for this round")]
    BiddingClosed,
}

impl Auction {
    /// `floor` is the minimum ladder rank an opening bid must reach;
    /// rule variants raise it above `Bid::MINIMUM`.
    pub fn new(first_bidder: Seat, floor: u8) -> Self {
        Self {
            turn: first_bidder,
            passed: [false; 3],
            high: None,
            floor,
            resolution: None,
        }
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn high_bid(&self) -> Option<Contract> {
        self.high
    }

    pub fn has_passed(&self, seat: Seat) -> bool {
        self.passed[seat.index()]
    }

    pub fn resolution(&self) -> Option<AuctionResolution> {
        self.resolution
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    pub fn bid(&mut self, seat: Seat, bid: Bid) -> Result<Option<AuctionResolution>, BidError> {
        self.check_actor(seat)?;
        if !bid.is_valid() {
            return Err(BidError::InvalidBid(bid));
        }
        if bid.ladder_rank() < self.floor {
            return Err(BidError::BidTooLow(bid));
        }
        if let Some(high) = self.high {
            if bid.ladder_rank() <= high.bid.ladder_rank() {
                return Err(BidError::BidTooLow(bid));
            }
        }
        self.high = Some(Contract {
            declarer: seat,
            bid,
        });
        Ok(self.after_action(seat))
    }

    pub fn pass(&mut self, seat: Seat) -> Result<Option<AuctionResolution>, BidError> {
        self.check_actor(seat)?;
        self.passed[seat.index()] = true;
        Ok(self.after_action(seat))
    }

    fn check_actor(&self, seat: Seat) -> Result<(), BidError> {
        if self.is_resolved() {
            return Err(BidError::AuctionOver);
        }
        if self.passed[seat.index()] {
            return Err(BidError::AlreadyPassed(seat));
        }
        if self.turn != seat {
            return Err(BidError::OutOfTurn {
                expected: self.turn,
                actual: seat,
            });
        }
        Ok(())
    }

    fn after_action(&mut self, seat: Seat) -> Option<AuctionResolution> {
        let active: Vec<Seat> = Seat::LOOP
            .iter()
            .copied()
            .filter(|s| !self.passed[s.index()])
            .collect();

        let resolution = match (active.as_slice(), self.high) {
            ([], _) => Some(AuctionResolution::AllPassed),
            ([last], Some(high)) if high.declarer == *last => {
                Some(AuctionResolution::Contract(high))
            }
            _ => None,
        };

        if resolution.is_some() {
            self.resolution = resolution;
            return resolution;
        }

        let mut next = seat.next();
        while self.passed[next.index()] {
            next = next.next();
        }
        self.turn = next;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{Auction, AuctionResolution, BidError};
    use crate::model::bid::{Bid, Trump};
    use crate::model::seat::Seat;
    use crate::model::suit::Suit;

    const fn game(level: u8, suit: Suit) -> Bid {
        Bid::Game {
            level,
            trump: Trump::Suit(suit),
        }
    }

    #[test]
    fn single_bidder_takes_the_contract() {
        let mut auction = Auction::new(Seat::West, 0);
        assert_eq!(auction.bid(Seat::West, Bid::MINIMUM).unwrap(), None);
        assert_eq!(auction.pass(Seat::East).unwrap(), None);
        let resolution = auction.pass(Seat::South).unwrap();
        match resolution {
            Some(AuctionResolution::Contract(contract)) => {
                assert_eq!(contract.declarer, Seat::West);
                assert_eq!(contract.bid, Bid::MINIMUM);
            }
            other => panic!("expected contract, got {other:?}"),
        }
        assert!(auction.is_resolved());
    }

    #[test]
    fn all_three_passing_resolves_to_all_passed() {
        let mut auction = Auction::new(Seat::West, 0);
        assert_eq!(auction.pass(Seat::West).unwrap(), None);
        assert_eq!(auction.pass(Seat::East).unwrap(), None);
        assert_eq!(
            auction.pass(Seat::South).unwrap(),
            Some(AuctionResolution::AllPassed)
        );
    }

    #[test]
    fn raises_must_strictly_exceed_the_high_bid() {
        let mut auction = Auction::new(Seat::West, 0);
        auction.bid(Seat::West, game(6, Suit::Clubs)).unwrap();
        assert_eq!(
            auction.bid(Seat::East, game(6, Suit::Clubs)),
            Err(BidError::BidTooLow(game(6, Suit::Clubs)))
        );
        assert_eq!(
            auction.bid(Seat::East, game(6, Suit::Spades)),
            Err(BidError::BidTooLow(game(6, Suit::Spades)))
        );
        auction.bid(Seat::East, game(6, Suit::Diamonds)).unwrap();
    }

    #[test]
    fn floor_rejects_low_opening_bids() {
        let mut auction = Auction::new(Seat::West, game(7, Suit::Spades).ladder_rank());
        assert_eq!(
            auction.bid(Seat::West, Bid::MINIMUM),
            Err(BidError::BidTooLow(Bid::MINIMUM))
        );
        auction.bid(Seat::West, game(7, Suit::Spades)).unwrap();
    }

    #[test]
    fn acting_out_of_turn_is_rejected() {
        let mut auction = Auction::new(Seat::West, 0);
        assert_eq!(
            auction.bid(Seat::South, Bid::MINIMUM),
            Err(BidError::OutOfTurn {
                expected: Seat::West,
                actual: Seat::South,
            })
        );
    }

    #[test]
    fn passing_is_terminal() {
        let mut auction = Auction::new(Seat::West, 0);
        auction.pass(Seat::West).unwrap();
        auction.bid(Seat::East, Bid::MINIMUM).unwrap();
        assert_eq!(
            auction.bid(Seat::West, game(6, Suit::Clubs)),
            Err(BidError::AlreadyPassed(Seat::West))
        );
    }

    #[test]
    fn turn_skips_passed_seats() {
        let mut auction = Auction::new(Seat::West, 0);
        auction.pass(Seat::West).unwrap();
        auction.bid(Seat::East, Bid::MINIMUM).unwrap();
        // West passed, so the turn moves straight to South.
        assert_eq!(auction.turn(), Seat::South);
        auction.bid(Seat::South, game(6, Suit::Clubs)).unwrap();
        assert_eq!(auction.turn(), Seat::East);
    }

    #[test]
    fn rejected_bids_do_not_mutate_state() {
        let mut auction = Auction::new(Seat::West, 0);
        auction.bid(Seat::West, game(6, Suit::Hearts)).unwrap();
        let before = auction.clone();
        for _ in 0..2 {
            assert_eq!(
                auction.bid(Seat::East, Bid::MINIMUM),
                Err(BidError::BidTooLow(Bid::MINIMUM))
            );
            assert_eq!(auction, before);
        }
    }

    #[test]
    fn resolved_auction_rejects_further_actions() {
        let mut auction = Auction::new(Seat::West, 0);
        auction.bid(Seat::West, Bid::MINIMUM).unwrap();
        auction.pass(Seat::East).unwrap();
        auction.pass(Seat::South).unwrap();
        assert_eq!(auction.pass(Seat::West), Err(BidError::AuctionOver));
    }

    #[test]
    fn two_early_passes_leave_the_choice_to_the_last_seat() {
        let mut auction = Auction::new(Seat::West, 0);
        auction.pass(Seat::West).unwrap();
        auction.pass(Seat::East).unwrap();
        assert!(!auction.is_resolved());
        let resolution = auction.bid(Seat::South, Bid::MINIMUM).unwrap();
        match resolution {
            Some(AuctionResolution::Contract(contract)) => {
                assert_eq!(contract.declarer, Seat::South)
            }
            other => panic!("expected contract, got {other:?}"),
        }
    }
}
