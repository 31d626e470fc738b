use crate::model::card::Card;
use crate::model::seat::Seat;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: Seat,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrickError {
    #[error("trick already complete")]
    TrickComplete,
    #[error("expected {expected} to play next but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("{0} has already played this trick")]
    AlreadyPlayed(Seat),
}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(3),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 3
    }

    /// Suit of the first card played; fixed for the trick's duration.
    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn expected_seat(&self) -> Seat {
        self.plays
            .last()
            .map(|play| play.seat.next())
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.plays.iter().any(|play| play.seat == seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }

        let expected = self.expected_seat();
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        self.plays.push(Play { seat, card });
        Ok(())
    }

    /// The winner of a complete trick: the highest trump played if any,
    /// otherwise the highest card of the led suit.
    pub fn winner(&self, trump: Option<Suit>) -> Option<Seat> {
        if !self.is_complete() {
            return None;
        }
        let deciding_suit = match trump {
            Some(t) if self.plays.iter().any(|play| play.card.suit == t) => t,
            _ => self.lead_suit()?,
        };
        self.plays
            .iter()
            .filter(|play| play.card.suit == deciding_suit)
            .max_by(|a, b| a.card.rank.cmp(&b.card.rank))
            .map(|play| play.seat)
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::seat::Seat;
    use crate::model::suit::Suit;

    #[test]
    fn plays_follow_turn_order() {
        let mut trick = Trick::new(Seat::South);
        assert!(
            trick
                .play(Seat::South, Card::new(Rank::Seven, Suit::Clubs))
                .is_ok()
        );
        assert!(matches!(
            trick.play(Seat::East, Card::new(Rank::Eight, Suit::Clubs)),
            Err(TrickError::OutOfTurn { .. })
        ));
    }

    #[test]
    fn winner_is_highest_card_of_lead_suit_without_trump() {
        let mut trick = Trick::new(Seat::South);
        trick
            .play(Seat::South, Card::new(Rank::Ten, Suit::Clubs))
            .unwrap();
        trick
            .play(Seat::West, Card::new(Rank::Queen, Suit::Clubs))
            .unwrap();
        trick
            .play(Seat::East, Card::new(Rank::Ace, Suit::Diamonds))
            .unwrap();

        assert_eq!(trick.winner(None), Some(Seat::West));
    }

    #[test]
    fn any_trump_beats_the_led_suit() {
        let mut trick = Trick::new(Seat::South);
        trick
            .play(Seat::South, Card::new(Rank::Ace, Suit::Clubs))
            .unwrap();
        trick
            .play(Seat::West, Card::new(Rank::King, Suit::Clubs))
            .unwrap();
        trick
            .play(Seat::East, Card::new(Rank::Seven, Suit::Hearts))
            .unwrap();

        assert_eq!(trick.winner(Some(Suit::Hearts)), Some(Seat::East));
        assert_eq!(trick.winner(None), Some(Seat::South));
    }

    #[test]
    fn highest_trump_wins_among_several() {
        let mut trick = Trick::new(Seat::West);
        trick
            .play(Seat::West, Card::new(Rank::Nine, Suit::Spades))
            .unwrap();
        trick
            .play(Seat::East, Card::new(Rank::Jack, Suit::Spades))
            .unwrap();
        trick
            .play(Seat::South, Card::new(Rank::Ace, Suit::Diamonds))
            .unwrap();

        assert_eq!(trick.winner(Some(Suit::Spades)), Some(Seat::East));
    }

    #[test]
    fn incomplete_trick_has_no_winner() {
        let mut trick = Trick::new(Seat::South);
        trick
            .play(Seat::South, Card::new(Rank::Ten, Suit::Hearts))
            .unwrap();
        assert_eq!(trick.winner(None), None);
    }
}
