use crate::model::seat::Seat;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trump {
    Suit(Suit),
    NoTrump,
}

impl Trump {
    pub const fn suit(self) -> Option<Suit> {
        match self {
            Trump::Suit(suit) => Some(suit),
            Trump::NoTrump => None,
        }
    }

    const fn precedence(self) -> u8 {
        match self {
            Trump::Suit(suit) => suit as u8,
            Trump::NoTrump => 4,
        }
    }
}

impl fmt::Display for Trump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trump::Suit(suit) => write!(f, "{suit}"),
            Trump::NoTrump => f.write_str("NT"),
        }
    }
}

/// A declaration on the bidding ladder. Suit games ascend by level then
/// suit precedence with no-trump topping each level; misere sits between
/// the eight- and nine-level games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bid {
    Game { level: u8, trump: Trump },
    Misere,
}

impl Bid {
    pub const MINIMUM: Bid = Bid::Game {
        level: 6,
        trump: Trump::Suit(Suit::Spades),
    };

    pub const fn is_valid(self) -> bool {
        match self {
            Bid::Game { level, .. } => 6 <= level && level <= 10,
            Bid::Misere => true,
        }
    }

    /// Dense position on the bidding ladder; higher outranks lower.
    pub const fn ladder_rank(self) -> u8 {
        match self {
            Bid::Game { level, trump } => {
                let step = (level - 6) * 5 + trump.precedence();
                if level >= 9 { step + 1 } else { step }
            }
            Bid::Misere => 15,
        }
    }

    pub const fn level(self) -> Option<u8> {
        match self {
            Bid::Game { level, .. } => Some(level),
            Bid::Misere => None,
        }
    }

    pub const fn trump(self) -> Trump {
        match self {
            Bid::Game { trump, .. } => trump,
            Bid::Misere => Trump::NoTrump,
        }
    }
}

impl PartialOrd for Bid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ladder_rank().cmp(&other.ladder_rank())
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bid::Game { level, trump } => write!(f, "{level}{trump}"),
            Bid::Misere => f.write_str("misere"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub declarer: Seat,
    pub bid: Bid,
}
