use crate::game::match_state::FinishReason;
use crate::model::score::RoundScore;
use crate::model::seat::Seat;

/// Notifications for the presentation layer. Drained from the match
/// via [`crate::game::match_state::MatchState::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    HandChanged(Seat),
    TurnChanged(Seat),
    TrickCompleted { winner: Seat },
    RoundScored { score: RoundScore },
    MatchFinished { reason: FinishReason },
    InvalidMoveAttempted { seat: Seat, reason: String },
}
