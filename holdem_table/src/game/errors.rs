use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{ActionKind, Chips};

/// Errors returned to the requester of a table operation.
///
/// Every error leaves the table exactly as it was before the call.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error("not your turn")]
    OutOfTurn,
    #[error("can't {action} right now")]
    IllegalAction { action: ActionKind },
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("amount is not a valid number of chips")]
    InvalidAmount,
    #[error("must raise to at least ${min}")]
    BelowMinimumRaise { min: Chips },
    #[error("need 2+ players with chips")]
    InsufficientSeats,
    #[error("no seat available")]
    NoAvailableSeat,
    #[error("seat {0} is taken")]
    SeatOccupied(usize),
    #[error("seat {0} does not exist")]
    InvalidSeat(usize),
    #[error("player already seated")]
    DuplicateIdentity,
    #[error("player is not seated")]
    UnknownPlayer,
    #[error("buy-in must be ${required}")]
    InvalidBuyIn { required: Chips },
    #[error("hand already in progress")]
    HandInProgress,
    #[error("no hand in progress")]
    NoHandInProgress,
}
