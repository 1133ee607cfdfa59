//! Simulation configuration.
//!
//! Command-line flags take priority, then `HT_*` environment variables
//! (optionally loaded from a `.env` file), then the table defaults.

use holdem_table::{
    constants::{DEFAULT_BIG_BLIND, DEFAULT_BUY_IN, DEFAULT_SMALL_BLIND, TABLE_CAPACITY},
    table::{ConfigError as TableConfigError, TableConfig, TableSpeed},
};
use pico_args::Arguments;

pub const HELP: &str = "\
Play bots against each other at a single hold'em table

USAGE:
  ht_sim [OPTIONS]

OPTIONS:
  --players    N           Number of bots to seat           [default: 6]
  --hands      N           Hands to play before stopping    [default: 100]
  --seed       N           Seed for shuffles and bot choices
  --speed      SPEED       normal, turbo or hyper           [default: hyper]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  HT_BUY_IN                Fixed buy-in for every seat      [default: 1000]
  HT_SMALL_BLIND           Small blind                      [default: 5]
  HT_BIG_BLIND             Big blind                        [default: 10]
  RUST_LOG                 Log level                        [default: info]
";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {flag}: {reason}")]
    InvalidFlag { flag: &'static str, reason: String },

    #[error("need between 2 and {max} players, got {players}", max = TABLE_CAPACITY)]
    Players { players: usize },

    #[error("--hands must be at least 1")]
    NoHands,

    #[error(transparent)]
    Table(#[from] TableConfigError),
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub players: usize,
    pub hands: u64,
    pub seed: Option<u64>,
    pub table: TableConfig,
}

impl SimConfig {
    /// Read flags from `args` and stakes from the environment.
    pub fn from_args(mut args: Arguments) -> Result<Self, ConfigError> {
        let players = optional_flag(&mut args, "--players")?.unwrap_or(6);
        let hands = optional_flag(&mut args, "--hands")?.unwrap_or(100);
        let seed: Option<u64> = optional_flag(&mut args, "--seed")?;
        let speed: TableSpeed = optional_flag(&mut args, "--speed")?.unwrap_or(TableSpeed::Hyper);

        let table = TableConfig {
            name: "Simulation".to_string(),
            buy_in: parse_env_or("HT_BUY_IN", DEFAULT_BUY_IN),
            small_blind: parse_env_or("HT_SMALL_BLIND", DEFAULT_SMALL_BLIND),
            big_blind: parse_env_or("HT_BIG_BLIND", DEFAULT_BIG_BLIND),
            speed,
            seed,
            ..TableConfig::default()
        };

        let config = Self {
            players,
            hands,
            seed,
            table,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=TABLE_CAPACITY).contains(&self.players) {
            return Err(ConfigError::Players {
                players: self.players,
            });
        }
        if self.hands == 0 {
            return Err(ConfigError::NoHands);
        }
        self.table.validate()?;
        Ok(())
    }
}

fn optional_flag<T>(args: &mut Arguments, flag: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    args.opt_value_from_str(flag)
        .map_err(|err| ConfigError::InvalidFlag {
            flag,
            reason: err.to_string(),
        })
}

/// Parse an environment variable, falling back to `default` when it's
/// unset or malformed.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
