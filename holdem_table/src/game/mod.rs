//! Poker table engine - betting rules, turn order and pot resolution.
//!
//! This module provides:
//! - Cards, players and pots ([`entities`])
//! - Hand evaluation ([`functional`])
//! - The table state and its betting mutators ([`table`])
//! - Legal-action and raise-bound queries ([`validator`])
//! - Turn order and street transitions ([`rounds`])
//! - Side pots and payouts ([`showdown`])
//! - Public and private projections ([`views`])

pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod rounds;
pub mod showdown;
pub mod table;
pub mod validator;
pub mod views;

pub use errors::TableError;
pub use rounds::TurnKey;
pub use showdown::{HandResult, Payout, Reveal};
pub use table::{StandUpOutcome, Table, TableEvent, TableSettings};
pub use validator::RaiseBounds;
pub use views::{PrivateView, PublicView, TableView, TableViews};
