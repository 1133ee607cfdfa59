//! Table actor message types.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    HandResult, TableError, TableView, TurnKey,
    entities::{Action, Chips, PlayerId, SeatIndex},
};

/// An action as a client sends it: a free-form kind and an optional
/// amount that hasn't been checked yet.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ActionIntent {
    pub kind: String,
    pub amount: Option<f64>,
}

impl ActionIntent {
    pub fn new(kind: impl Into<String>, amount: Option<f64>) -> Self {
        Self {
            kind: kind.into(),
            amount,
        }
    }

    /// Convert into an engine action. Amounts must be whole, non-negative
    /// chip counts.
    pub fn to_action(&self) -> Result<Action, TableError> {
        let action = match self.kind.trim().to_ascii_lowercase().as_str() {
            "check" => Action::Check,
            "call" => Action::Call,
            "fold" => Action::Fold,
            "bet" => Action::Bet(parse_amount(self.amount)?),
            "raise" => Action::Raise(parse_amount(self.amount)?),
            _ => return Err(TableError::UnknownAction(self.kind.clone())),
        };
        Ok(action)
    }
}

impl From<Action> for ActionIntent {
    fn from(action: Action) -> Self {
        let amount = match action {
            Action::Bet(amount) | Action::Raise(amount) => Some(f64::from(amount)),
            Action::Check | Action::Call | Action::Fold => None,
        };
        Self::new(action.kind().to_string(), amount)
    }
}

/// Chip amounts arrive as JSON numbers. Anything that isn't a whole,
/// non-negative, representable chip count is rejected.
pub fn parse_amount(amount: Option<f64>) -> Result<Chips, TableError> {
    let amount = amount.ok_or(TableError::InvalidAmount)?;
    if !amount.is_finite() || amount < 0.0 || amount.fract() != 0.0 {
        return Err(TableError::InvalidAmount);
    }
    if amount > f64::from(Chips::MAX) {
        return Err(TableError::InvalidAmount);
    }
    Ok(amount as Chips)
}

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    SitDown {
        player_id: PlayerId,
        buy_in: Chips,
        seat: Option<SeatIndex>,
        response: oneshot::Sender<TableResponse>,
    },

    StandUp {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Player action; answered once the action is applied or discarded
    TakeAction {
        player_id: PlayerId,
        intent: ActionIntent,
        response: oneshot::Sender<TableResponse>,
    },

    /// Point-in-time view. Only a seated requester gets a private part.
    GetView {
        player_id: Option<PlayerId>,
        response: oneshot::Sender<TableView>,
    },

    /// Deal a hand now (tables without auto-start)
    DealHand {
        response: oneshot::Sender<TableResponse>,
    },

    /// Subscribe to table notifications
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<TableNotification>,
    },

    Unsubscribe {
        player_id: PlayerId,
    },

    /// Replace the table with a fresh, empty one
    Restart {
        response: oneshot::Sender<TableResponse>,
    },

    Close {
        response: oneshot::Sender<TableResponse>,
    },

    /// Internal: a delayed action is due
    ApplyPending { ticket: u64 },

    /// Internal: the turn identified by `key` ran out of time
    TurnTimeout { key: TurnKey },

    /// Internal: the pause between hands is over
    NextHand,
}

/// Notification pushed to subscribers
#[derive(Debug, Clone)]
pub enum TableNotification {
    /// The table changed; each subscriber gets their own projection
    View(TableView),
    HandComplete(HandResult),
    PlayerLeft { player_id: PlayerId, cash_out: Chips },
}

/// Response from table operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResponse {
    Success,

    Seated { seat: SeatIndex },

    Left { cash_out: Chips },

    /// Folded out of the hand; leaves once it completes
    LeaveQueued,

    /// The turn moved on before a delayed action could be applied
    Stale,

    Error(TableError),
}

impl TableResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        !matches!(self, TableResponse::Stale | TableResponse::Error(_))
    }

    pub fn error(&self) -> Option<&TableError> {
        match self {
            TableResponse::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Result<(), TableError>> for TableResponse {
    fn from(value: Result<(), TableError>) -> Self {
        match value {
            Ok(()) => TableResponse::Success,
            Err(err) => TableResponse::Error(err),
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("table is closed")]
    Closed,
}
