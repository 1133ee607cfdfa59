//! Session layer: one async actor per table.
//!
//! This module implements:
//! - TableActor: owns a [`Table`](crate::game::Table) and applies every
//!   request to it one at a time
//! - Message-based communication with tokio channels
//! - Action pacing, per-turn timeouts and automatic hand starts
//! - Per-subscriber view fan-out
//!
//! ## Example
//!
//! ```no_run
//! use holdem_table::table::{TableActor, TableConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = TableActor::new(TableConfig::default());
//!     tokio::spawn(actor.run());
//!
//!     let seated = handle.sit_down("alice".into(), 1000, None).await;
//!     println!("{seated:?}");
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::{ConfigError, TableConfig, TableSpeed};
pub use messages::{
    ActionIntent, HandleError, TableMessage, TableNotification, TableResponse, parse_amount,
};
