use core::fmt;
use serde::{Deserialize, Serialize};

/// Table positions for the three players. South is the local player by
/// convention; play proceeds South -> West -> East.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    South = 0,
    West = 1,
    East = 2,
}

impl Seat {
    pub const LOOP: [Seat; 3] = [Seat::South, Seat::West, Seat::East];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::South),
            1 => Some(Seat::West),
            2 => Some(Seat::East),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> Seat {
        match self {
            Seat::South => Seat::West,
            Seat::West => Seat::East,
            Seat::East => Seat::South,
        }
    }

    pub const fn previous(self) -> Seat {
        match self {
            Seat::South => Seat::East,
            Seat::West => Seat::South,
            Seat::East => Seat::West,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::South => "South",
            Seat::West => "West",
            Seat::East => "East",
        };
        f.write_str(label)
    }
}
