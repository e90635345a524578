//! Per-player standings plus the camel-specific measures: how often bets land,
//! how often markers pay, and how well the estimator's bet values match payouts.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{Binomial, DiscreteCDF};
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::runner::{GameOutcome, SeatLedger};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("player '{0}' appears in results but not in the configuration")]
    UnknownPlayer(String),
    #[error("baseline '{0}' did not sit in a recorded game")]
    MissingBaseline(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    baseline: String,
    seats_per_game: usize,
    players: Vec<PlayerAccumulator>,
    index: HashMap<String, usize>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let players: Vec<_> = config
            .players
            .iter()
            .map(|player| PlayerAccumulator::new(&player.name, player.strategy.kind()))
            .collect();
        let index = players
            .iter()
            .enumerate()
            .map(|(i, player)| (player.name.clone(), i))
            .collect();
        Self {
            baseline: config.baseline.clone(),
            seats_per_game: config.players.len(),
            players,
            index,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        let baseline_coins = outcome
            .seat_results
            .iter()
            .find(|seat| seat.player_name == self.baseline)
            .map(|seat| seat.coins)
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        for seat in &outcome.seat_results {
            let slot = *self
                .index
                .get(&seat.player_name)
                .ok_or_else(|| AnalyticsError::UnknownPlayer(seat.player_name.clone()))?;
            self.players[slot].record(seat.coins, seat.coins - baseline_coins, seat.won, &seat.ledger);
        }
        Ok(())
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let fair_share = 1.0 / self.seats_per_game.max(1) as f64;
        let players = self
            .players
            .into_iter()
            .map(|player| player.into_report(fair_share))
            .collect();
        AnalyticsSummary {
            baseline: self.baseline,
            players,
        }
    }
}

#[derive(Default)]
struct PlayerAccumulator {
    name: String,
    kind: &'static str,
    games: u32,
    wins: u32,
    coins: i64,
    delta: i64,
    ledger: LedgerTotals,
}

/// Sums of [`SeatLedger`] over every game a player sat in.
#[derive(Debug, Clone, Copy, Default)]
struct LedgerTotals {
    bets: u64,
    markers: u64,
    fallbacks: u64,
    bets_first: u64,
    bets_second: u64,
    bet_income: i64,
    roll_income: i64,
    marker_income: i64,
    estimated_bets: u64,
    estimated_bet_value: f64,
    estimated_bet_payout: i64,
}

impl LedgerTotals {
    fn add(&mut self, ledger: &SeatLedger) {
        self.bets += u64::from(ledger.bets_settled());
        self.markers += u64::from(ledger.markers);
        self.fallbacks += u64::from(ledger.fallbacks);
        self.bets_first += u64::from(ledger.bets_first);
        self.bets_second += u64::from(ledger.bets_second);
        self.bet_income += i64::from(ledger.bet_income);
        self.roll_income += i64::from(ledger.roll_income);
        self.marker_income += i64::from(ledger.marker_income);
        self.estimated_bets += u64::from(ledger.estimated_bets);
        self.estimated_bet_value += ledger.estimated_bet_value;
        self.estimated_bet_payout += i64::from(ledger.estimated_bet_payout);
    }
}

impl PlayerAccumulator {
    fn new(name: &str, kind: &'static str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ..Self::default()
        }
    }

    fn record(&mut self, coins: i32, delta: i32, won: bool, ledger: &SeatLedger) {
        self.games += 1;
        self.wins += u32::from(won);
        self.coins += i64::from(coins);
        self.delta += i64::from(delta);
        self.ledger.add(ledger);
    }

    fn into_report(self, fair_share: f64) -> PlayerReport {
        let games = f64::from(self.games.max(1));
        let totals = self.ledger;
        let per_game = |value: i64| value as f64 / games;

        PlayerReport {
            win_share_p_value: win_share_p_value(self.wins, self.games, fair_share),
            mean_coins: per_game(self.coins),
            mean_delta: per_game(self.delta),
            bet_income: per_game(totals.bet_income),
            roll_income: per_game(totals.roll_income),
            marker_income: per_game(totals.marker_income),
            bets_per_game: totals.bets as f64 / games,
            bet_hit_rate: ratio(totals.bets_first, totals.bets),
            bet_second_rate: ratio(totals.bets_second, totals.bets),
            marker_payout_rate: ratio(totals.marker_income.max(0) as u64, totals.markers),
            fallback_rate: totals.fallbacks as f64 / games,
            estimate: (totals.estimated_bets > 0).then(|| Calibration {
                bets: totals.estimated_bets,
                mean_estimate: totals.estimated_bet_value / totals.estimated_bets as f64,
                mean_payout: totals.estimated_bet_payout as f64 / totals.estimated_bets as f64,
            }),
            name: self.name,
            kind: self.kind,
            games: self.games,
            wins: self.wins,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// One-sided chance of at least `wins` wins if every seat were equally strong.
/// Tied seats all count as winners, so the test leans toward significance.
fn win_share_p_value(wins: u32, games: u32, fair_share: f64) -> Option<f64> {
    if games == 0 {
        return None;
    }
    if wins == 0 {
        return Some(1.0);
    }
    let binomial = Binomial::new(fair_share, u64::from(games)).ok()?;
    Some((1.0 - binomial.cdf(u64::from(wins - 1))).clamp(0.0, 1.0))
}

/// Estimated against realized payout over bets placed with an estimate.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Calibration {
    pub bets: u64,
    pub mean_estimate: f64,
    pub mean_payout: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub name: String,
    pub kind: &'static str,
    pub games: u32,
    pub wins: u32,
    pub win_share_p_value: Option<f64>,
    pub mean_coins: f64,
    /// Mean coin difference to the baseline seat in the same game.
    pub mean_delta: f64,
    pub bet_income: f64,
    pub roll_income: f64,
    pub marker_income: f64,
    pub bets_per_game: f64,
    pub bet_hit_rate: Option<f64>,
    pub bet_second_rate: Option<f64>,
    /// Coins earned per marker placed.
    pub marker_payout_rate: Option<f64>,
    pub fallback_rate: f64,
    pub estimate: Option<Calibration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub players: Vec<PlayerReport>,
}

impl AnalyticsSummary {
    pub fn player(&self, name: &str) -> Option<&PlayerReport> {
        self.players.iter().find(|player| player.name == name)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# Bench Summary\n");
        let _ = writeln!(md, "Baseline: `{}`\n", self.baseline);

        let _ = writeln!(md, "## Standings\n");
        let _ = writeln!(
            md,
            "| Player | Kind | Games | Mean coins | Δ vs baseline | Wins | Win-share p |"
        );
        let _ = writeln!(md, "|---|---|---:|---:|---:|---:|---:|");
        for p in &self.players {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {:.2} | {:+.2} | {} | {} |",
                p.name,
                p.kind,
                p.games,
                p.mean_coins,
                p.mean_delta,
                p.wins,
                fmt_p(p.win_share_p_value),
            );
        }

        let _ = writeln!(md, "\n## Bets and markers\n");
        let _ = writeln!(
            md,
            "| Player | Bet / Roll / Marker income | Bets per game | Bet hit rate | Second place | Marker payout | Fallbacks per game | Bet estimate vs payout |"
        );
        let _ = writeln!(md, "|---|---|---:|---:|---:|---:|---:|---|");
        for p in &self.players {
            let calibration = p
                .estimate
                .map(|c| format!("{:+.2} vs {:+.2} over {}", c.mean_estimate, c.mean_payout, c.bets))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                md,
                "| {} | {:+.2} / {:+.2} / {:+.2} | {:.2} | {} | {} | {} | {:.2} | {} |",
                p.name,
                p.bet_income,
                p.roll_income,
                p.marker_income,
                p.bets_per_game,
                fmt_rate(p.bet_hit_rate),
                fmt_rate(p.bet_second_rate),
                p.marker_payout_rate
                    .map(|rate| format!("{rate:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
                p.fallback_rate,
                calibration,
            );
        }
        md
    }

    pub fn write_markdown(&self, path: &Path) -> Result<(), AnalyticsError> {
        fs::write(path, self.to_markdown()).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_p(p: Option<f64>) -> String {
    match p {
        Some(p) if p < 0.001 => "<0.001".to_string(),
        Some(p) => format!("{p:.3}"),
        None => "-".to_string(),
    }
}
