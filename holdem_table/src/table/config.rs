//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::game::{
    constants::{DEFAULT_BIG_BLIND, DEFAULT_BUY_IN, DEFAULT_SMALL_BLIND, TABLE_CAPACITY},
    entities::Chips,
    table::TableSettings,
};

/// Table speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSpeed {
    Normal,
    Turbo,
    Hyper,
}

impl std::fmt::Display for TableSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableSpeed::Normal => write!(f, "normal"),
            TableSpeed::Turbo => write!(f, "turbo"),
            TableSpeed::Hyper => write!(f, "hyper"),
        }
    }
}

impl std::str::FromStr for TableSpeed {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(TableSpeed::Normal),
            "turbo" => Ok(TableSpeed::Turbo),
            "hyper" => Ok(TableSpeed::Hyper),
            _ => Err(ConfigError::UnknownSpeed(s.to_string())),
        }
    }
}

impl TableSpeed {
    fn action_timeout_ms(self) -> u64 {
        match self {
            TableSpeed::Normal => 30_000,
            TableSpeed::Turbo => 15_000,
            TableSpeed::Hyper => 5_000,
        }
    }

    fn action_delay_ms(self) -> u64 {
        match self {
            TableSpeed::Normal => 500,
            TableSpeed::Turbo => 250,
            TableSpeed::Hyper => 0,
        }
    }

    fn next_hand_delay_ms(self) -> u64 {
        match self {
            TableSpeed::Normal => 3_000,
            TableSpeed::Turbo => 1_500,
            TableSpeed::Hyper => 500,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("table name must not be empty")]
    EmptyName,
    #[error("big blind must be positive")]
    ZeroBigBlind,
    #[error("small blind (${small}) must not exceed big blind (${big})")]
    BlindsOutOfOrder { small: Chips, big: Chips },
    #[error("buy-in (${buy_in}) must cover the big blind (${big_blind})")]
    BuyInBelowBigBlind { buy_in: Chips, big_blind: Chips },
    #[error("capacity must be between 2 and {max}, got {0}", max = TABLE_CAPACITY)]
    Capacity(usize),
    #[error("unknown table speed: {0}")]
    UnknownSpeed(String),
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Fixed buy-in every player sits down with
    pub buy_in: Chips,

    pub small_blind: Chips,

    pub big_blind: Chips,

    /// Number of seats (at most 9)
    pub capacity: usize,

    /// Timing preset; explicit millisecond values below take precedence
    pub speed: TableSpeed,

    /// Pause before an accepted action is applied
    pub action_delay_ms: Option<u64>,

    /// Time the current actor has before being folded. Zero disables it.
    pub action_timeout_ms: Option<u64>,

    /// Pause between the end of one hand and the next deal
    pub next_hand_delay_ms: Option<u64>,

    /// Deal automatically whenever two funded players are seated
    pub auto_start: bool,

    /// Fold the current actor instead of stalling on an invalid action
    pub fold_on_invalid_action: bool,

    /// Seed for deterministic shuffles
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Table 1".to_string(),
            buy_in: DEFAULT_BUY_IN,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            capacity: TABLE_CAPACITY,
            speed: TableSpeed::Normal,
            action_delay_ms: None,
            action_timeout_ms: None,
            next_hand_delay_ms: None,
            auto_start: true,
            fold_on_invalid_action: true,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.big_blind == 0 {
            return Err(ConfigError::ZeroBigBlind);
        }
        if self.small_blind > self.big_blind {
            return Err(ConfigError::BlindsOutOfOrder {
                small: self.small_blind,
                big: self.big_blind,
            });
        }
        if self.buy_in < self.big_blind {
            return Err(ConfigError::BuyInBelowBigBlind {
                buy_in: self.buy_in,
                big_blind: self.big_blind,
            });
        }
        if !(2..=TABLE_CAPACITY).contains(&self.capacity) {
            return Err(ConfigError::Capacity(self.capacity));
        }
        Ok(())
    }

    /// Engine settings derived from this configuration
    #[must_use]
    pub fn table_settings(&self) -> TableSettings {
        TableSettings {
            buy_in: self.buy_in,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            capacity: self.capacity,
            seed: self.seed,
        }
    }

    #[must_use]
    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(
            self.action_delay_ms
                .unwrap_or_else(|| self.speed.action_delay_ms()),
        )
    }

    /// Per-turn timeout, `None` when turns never time out
    #[must_use]
    pub fn action_timeout(&self) -> Option<Duration> {
        let ms = self
            .action_timeout_ms
            .unwrap_or_else(|| self.speed.action_timeout_ms());
        (ms > 0).then(|| Duration::from_millis(ms))
    }

    #[must_use]
    pub fn next_hand_delay(&self) -> Duration {
        Duration::from_millis(
            self.next_hand_delay_ms
                .unwrap_or_else(|| self.speed.next_hand_delay_ms()),
        )
    }
}
