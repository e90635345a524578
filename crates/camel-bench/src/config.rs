//! Bench configuration: one YAML document describing the seats, how many races
//! to run, and where the results go.
//!
//! ```yaml
//! run_id: "nightly"
//! seed: 7
//! games: 200
//! rotations: 3
//! baseline: "roller"
//! output_dir: "bench/out/{run_id}"
//! players:
//!   - { name: "hint", kind: "hint", min_edge: 0.5 }
//!   - { name: "roller", kind: "roll" }
//! ```

use std::collections::HashSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use camel_core::model::marker::MarkerDirection;
use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_ROLLOUTS: u32 = 500;
pub const SEAT_RANGE: RangeInclusive<usize> = 2..=8;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkConfig {
    pub run_id: String,
    #[serde(default)]
    pub seed: u64,
    pub games: usize,
    /// Seat orders played per game seed; each is a cyclic shift of the player list.
    #[serde(default = "one")]
    pub rotations: usize,
    /// Rollouts for hint players that do not set their own.
    #[serde(default = "default_rollouts")]
    pub rollouts: u32,
    /// Player every other player's coins are compared against.
    pub baseline: String,
    pub players: Vec<PlayerConfig>,
    /// Directory for every output file; `{run_id}` is substituted.
    pub output_dir: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlayerConfig {
    pub name: String,
    #[serde(flatten)]
    pub strategy: Strategy,
}

/// How a seat picks its actions, tagged by `kind` in the YAML.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    Hint {
        #[serde(default)]
        rollouts: Option<u32>,
        #[serde(default)]
        marker_direction: Option<MarkerDirection>,
        /// Bets and markers below this value are skipped in favour of a roll.
        #[serde(default)]
        min_edge: Option<f64>,
    },
    Roll,
    Random {
        #[serde(default)]
        seed_offset: u64,
    },
}

impl Strategy {
    pub const fn kind(&self) -> &'static str {
        match self {
            Strategy::Hint { .. } => "hint",
            Strategy::Roll => "roll",
            Strategy::Random { .. } => "random",
        }
    }

    fn validate(&self, field: &str) -> Result<(), ValidationError> {
        if let Strategy::Hint {
            rollouts, min_edge, ..
        } = self
        {
            ensure(*rollouts != Some(0), field, "rollouts must be greater than zero")?;
            ensure(
                !min_edge.is_some_and(f64::is_nan),
                field,
                "min_edge must be a number",
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Writes `telemetry.jsonl` and its summary when set.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_level")]
    pub level: String,
    /// Adds the full action table to every hint decision event.
    #[serde(default)]
    pub hint_details: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_level(),
            hint_details: false,
        }
    }
}

impl TelemetryConfig {
    pub fn level(&self) -> Option<Level> {
        self.level.trim().parse().ok()
    }
}

/// Every file a run writes, resolved against the run id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub games_jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub telemetry_jsonl: PathBuf,
    pub telemetry_summary: PathBuf,
}

impl OutputPaths {
    fn new(dir: PathBuf) -> Self {
        Self {
            games_jsonl: dir.join("games.jsonl"),
            summary_md: dir.join("summary.md"),
            telemetry_jsonl: dir.join("telemetry.jsonl"),
            telemetry_summary: dir.join("telemetry_summary.json"),
            dir,
        }
    }
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config
            .validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Checks cross-field rules; the first violation wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure(is_plain_name(&self.run_id), "run_id", NAME_RULE)?;
        ensure(self.games > 0, "games", "at least one game is required")?;
        ensure(self.rollouts > 0, "rollouts", "rollouts must be greater than zero")?;
        ensure(
            !self.output_dir.trim().is_empty(),
            "output_dir",
            "output directory must not be empty",
        )?;

        let seats = self.players.len();
        ensure(
            SEAT_RANGE.contains(&seats),
            "players",
            &format!(
                "between {} and {} players are required, found {seats}",
                SEAT_RANGE.start(),
                SEAT_RANGE.end()
            ),
        )?;
        ensure(
            (1..=seats).contains(&self.rotations),
            "rotations",
            &format!("rotations must be between 1 and {seats}"),
        )?;

        let mut names = HashSet::new();
        for (index, player) in self.players.iter().enumerate() {
            let field = format!("players[{index}]");
            ensure(is_plain_name(&player.name), &field, NAME_RULE)?;
            ensure(
                names.insert(player.name.as_str()),
                &field,
                &format!("player name '{}' is used twice", player.name),
            )?;
            player.strategy.validate(&field)?;
        }
        ensure(
            names.contains(self.baseline.as_str()),
            "baseline",
            &format!("baseline '{}' is not one of the players", self.baseline),
        )?;

        ensure(
            self.telemetry.level().is_some(),
            "telemetry.level",
            &format!("unknown tracing level '{}'", self.telemetry.level),
        )
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::new(PathBuf::from(
            self.output_dir.replace("{run_id}", &self.run_id),
        ))
    }
}

const NAME_RULE: &str = "names may only use ASCII letters, digits, '.', '_' or '-'";

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn ensure(condition: bool, field: &str, message: &str) -> Result<(), ValidationError> {
    if condition {
        Ok(())
    } else {
        Err(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        })
    }
}

fn one() -> usize {
    1
}

fn default_rollouts() -> u32 {
    DEFAULT_ROLLOUTS
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}
