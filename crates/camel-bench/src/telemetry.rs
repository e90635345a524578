//! Reads back the JSON event log a bench run wrote and condenses it per policy.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DECISION_TARGET: &str = "camel_bot::decision";
const ESTIMATE_TARGET: &str = "camel_core::estimate";
const TURN_TARGET: &str = "camel_bench::turn";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode telemetry summary: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One line of the `tracing-subscriber` JSON format, keeping only what is summarised.
#[derive(Debug, Deserialize)]
struct LogLine {
    #[serde(default)]
    target: String,
    #[serde(default)]
    fields: LogFields,
}

#[derive(Debug, Default, Deserialize)]
struct LogFields {
    policy: Option<String>,
    kind: Option<String>,
    reason: Option<String>,
    expected_value: Option<f64>,
    requested: Option<String>,
    applied: Option<String>,
    best_action: Option<String>,
    rollouts: Option<u64>,
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub events: usize,
    pub policies: BTreeMap<String, PolicyTelemetry>,
    pub estimates: EstimateTelemetry,
}

#[derive(Debug, Default, Serialize)]
pub struct PolicyTelemetry {
    pub decisions: usize,
    /// Requested action kinds (`bet`, `marker`, `roll`).
    pub kinds: BTreeMap<String, usize>,
    pub reasons: BTreeMap<String, usize>,
    pub mean_expected_value: Option<f64>,
    pub turns: usize,
    /// Requested kinds the table turned into a roll.
    pub fallbacks: BTreeMap<String, usize>,
    #[serde(skip)]
    value: Average,
}

#[derive(Debug, Default, Serialize)]
pub struct EstimateTelemetry {
    pub count: usize,
    pub mean_rollouts: Option<f64>,
    pub best_actions: BTreeMap<String, usize>,
    #[serde(skip)]
    rollouts: Average,
}

#[derive(Debug, Default)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: Option<String>) {
    *counts
        .entry(key.unwrap_or_else(|| "unknown".to_string()))
        .or_insert(0) += 1;
}

impl TelemetrySummary {
    /// A missing log summarises to nothing.
    pub fn from_log(path: &Path) -> Result<Self, TelemetryError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path).map_err(|source| TelemetryError::Io {
            context: "opening telemetry log",
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, TelemetryError> {
        let mut summary = Self::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| TelemetryError::Io {
                context: "reading telemetry line",
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: LogLine = serde_json::from_str(&line).map_err(|source| {
                TelemetryError::Json {
                    line: index + 1,
                    source,
                }
            })?;
            summary.record(entry);
        }
        summary.finish();
        Ok(summary)
    }

    fn record(&mut self, entry: LogLine) {
        let fields = entry.fields;
        match entry.target.as_str() {
            DECISION_TARGET => {
                let policy = self.policy(fields.policy);
                policy.decisions += 1;
                bump(&mut policy.kinds, fields.kind);
                bump(&mut policy.reasons, fields.reason);
                if let Some(value) = fields.expected_value {
                    policy.value.add(value);
                }
            }
            TURN_TARGET => {
                let policy = self.policy(fields.policy);
                policy.turns += 1;
                if fields.requested != fields.applied {
                    bump(&mut policy.fallbacks, fields.requested);
                }
            }
            ESTIMATE_TARGET => {
                self.estimates.count += 1;
                bump(&mut self.estimates.best_actions, fields.best_action);
                if let Some(rollouts) = fields.rollouts {
                    self.estimates.rollouts.add(rollouts as f64);
                }
            }
            _ => return,
        }
        self.events += 1;
    }

    fn policy(&mut self, name: Option<String>) -> &mut PolicyTelemetry {
        self.policies
            .entry(name.unwrap_or_else(|| "unknown".to_string()))
            .or_default()
    }

    fn finish(&mut self) {
        for policy in self.policies.values_mut() {
            policy.mean_expected_value = policy.value.mean();
        }
        self.estimates.mean_rollouts = self.estimates.rollouts.mean();
    }

    pub fn write_json(&self, path: &Path) -> Result<(), TelemetryError> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json).map_err(|source| TelemetryError::Io {
            context: "writing telemetry summary",
            source,
        })
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::from("\n## Decision Log\n\n");
        if self.events == 0 {
            md.push_str("No decision events were captured.\n");
            return md;
        }

        md.push_str("| Policy | Decisions | Bets | Markers | Rolls | Mean chosen value | Fallbacks | Top reason |\n");
        md.push_str("|---|---:|---:|---:|---:|---:|---:|---|\n");
        for (name, policy) in &self.policies {
            let count = |kind: &str| policy.kinds.get(kind).copied().unwrap_or(0);
            let top_reason = policy
                .reasons
                .iter()
                .max_by_key(|(_, count)| **count)
                .map(|(reason, _)| reason.as_str())
                .unwrap_or("-");
            md.push_str(&format!(
                "| {name} | {} | {} | {} | {} | {} | {} | {top_reason} |\n",
                policy.decisions,
                count("bet"),
                count("marker"),
                count("roll"),
                policy
                    .mean_expected_value
                    .map(|value| format!("{value:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
                policy.fallbacks.values().sum::<usize>(),
            ));
        }

        if self.estimates.count > 0 {
            md.push_str(&format!(
                "\nEstimator calls: {} (mean rollouts {:.0}); best action {:?}\n",
                self.estimates.count,
                self.estimates.mean_rollouts.unwrap_or(0.0),
                self.estimates.best_actions,
            ));
        }
        md
    }

    pub fn append_markdown(&self, path: &Path) -> Result<(), TelemetryError> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| TelemetryError::Io {
                context: "opening summary markdown",
                source,
            })?;
        file.write_all(self.to_markdown().as_bytes())
            .map_err(|source| TelemetryError::Io {
                context: "appending decision log",
                source,
            })
    }
}
