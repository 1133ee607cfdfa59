//! # Holdem Table
//!
//! A single-table No-Limit Hold'em betting engine.
//!
//! The engine is a deterministic state machine over one [`Table`]: it
//! enforces turn order and minimum-raise rules, builds main and side pots,
//! and resolves showdowns. Every mutating call either succeeds or returns a
//! [`TableError`] and leaves the table untouched.
//!
//! ## Hand flow
//!
//! - **Deal**: the button moves, blinds are posted, hole cards are dealt
//! - **PreFlop/Flop/Turn/River**: betting rounds, each closed when the
//!   closing seat has acted or nobody is left to act
//! - **Showdown**: pots are compared and paid out, busted players leave
//!
//! ## Core Modules
//!
//! - [`game`]: Table state, betting rules, pots and hand evaluation
//! - [`table`]: Async actor that serialises requests into one table
//!
//! ## Example
//!
//! ```
//! use holdem_table::{Table, TableSettings, entities::Action};
//!
//! let mut table = Table::new(TableSettings::default().with_seed(7));
//! table.sit_down("alice".into(), 1000, None).unwrap();
//! table.sit_down("bob".into(), 1000, None).unwrap();
//! table.deal_cards().unwrap();
//!
//! let actor = table.current_actor().unwrap().id.clone();
//! table.act(&actor, Action::Call).unwrap();
//! ```

/// Core game logic, entities and rules.
pub mod game;
pub use game::{
    HandResult, StandUpOutcome, Table, TableError, TableEvent, TableSettings, TableView,
    constants, entities, functional,
};

/// Async table actor.
pub mod table;
