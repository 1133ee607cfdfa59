//! Table-wide constants.

use super::entities::Chips;

/// Number of seats at a table.
pub const TABLE_CAPACITY: usize = 9;

/// Hole cards dealt to each player at the start of a hand.
pub const HOLE_CARDS: usize = 2;

/// Community cards on a complete board.
pub const BOARD_SIZE: usize = 5;

pub const DEFAULT_BUY_IN: Chips = 1000;
pub const DEFAULT_SMALL_BLIND: Chips = 5;
pub const DEFAULT_BIG_BLIND: Chips = 10;

/// Maximum length of a player identity. Longer identities are truncated.
pub const MAX_PLAYER_ID_LENGTH: usize = 32;
