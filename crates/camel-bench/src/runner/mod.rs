mod players;
mod rotations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use camel_bot::{BotFeatures, Decision, Policy, PolicyContext};
use camel_core::estimate::Action;
use camel_core::game::race::{RaceError, RaceState};
use camel_core::model::color::Color;
use camel_core::model::marker::PlayerId;
use camel_core::model::ticket::BettingTicket;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, OutputPaths, ValidationError};
use crate::telemetry::{TelemetryError, TelemetrySummary};

use players::PlayerBlueprint;
pub use rotations::SeatRotations;

pub const STARTING_COINS: i32 = 3;
const MAX_TURNS: usize = 5_000;

/// Plays every configured game headlessly and writes the result files.
pub struct BenchRunner {
    config: BenchmarkConfig,
    outputs: OutputPaths,
    players: Vec<PlayerBlueprint>,
    rotations: SeatRotations,
    bot_features: BotFeatures,
}

pub struct RunSummary {
    pub games_played: usize,
    pub rotations: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl BenchRunner {
    pub fn new(config: BenchmarkConfig) -> Result<Self, RunnerError> {
        config.validate()?;
        let players = PlayerBlueprint::from_configs(&config.players, config.rollouts);
        let rotations = SeatRotations::new(players.len(), config.rotations);
        // CAMEL_HINT_DETAILS can switch details on for a run whose config leaves them off.
        let env_features = BotFeatures::from_env();
        let bot_features = env_features
            .with_hint_details(env_features.hint_details() || config.telemetry.hint_details);

        Ok(Self {
            outputs: config.output_paths(),
            config,
            players,
            rotations,
            bot_features,
        })
    }

    pub fn outputs(&self) -> &OutputPaths {
        &self.outputs
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        fs::create_dir_all(&self.outputs.dir)?;

        let mut writer = BufWriter::new(File::create(&self.outputs.games_jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for game_index in 0..self.config.games {
            let game_seed = rng.next_u64();

            for (rotation_index, rotation) in self.rotations.as_slice().iter().enumerate() {
                let outcome = self.play_game(game_index, rotation_index, game_seed, rotation)?;
                analytics.record_game(&outcome)?;
                rows_written += write_game_rows(
                    &mut writer,
                    &self.config.run_id,
                    game_index,
                    rotation_index,
                    game_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: self.config.games,
            rotations: self.rotations.len(),
            rows_written,
            jsonl_path: self.outputs.games_jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    /// Condenses `telemetry.jsonl` and appends it to the summary. Call once the
    /// log writer has been flushed.
    pub fn summarise_telemetry(&self) -> Result<Option<TelemetrySummary>, RunnerError> {
        if !self.config.telemetry.enabled {
            return Ok(None);
        }
        let telemetry = TelemetrySummary::from_log(&self.outputs.telemetry_jsonl)?;
        telemetry.write_json(&self.outputs.telemetry_summary)?;
        telemetry.append_markdown(&self.outputs.summary_md)?;
        Ok(Some(telemetry))
    }

    fn play_game(
        &self,
        game_index: usize,
        rotation_index: usize,
        game_seed: u64,
        rotation: &[usize],
    ) -> Result<GameOutcome, RunnerError> {
        let mut race = RaceState::with_seed(game_seed);
        let mut seats = build_seats(rotation, &self.players, game_seed)?;
        let mut turn = 0usize;

        while !race.is_race_over() {
            if turn >= MAX_TURNS {
                return Err(RunnerError::game(format!(
                    "game {game_index} rotation {rotation_index} did not finish in {MAX_TURNS} turns"
                )));
            }
            let seat_index = turn % seats.len();
            turn += 1;

            let decision = {
                let seat = &mut seats[seat_index];
                let ctx = PolicyContext {
                    seat: seat.id,
                    track: race.track(),
                    pool: race.pool(),
                    payouts: race.payouts(),
                    coins: seat.coins,
                    leg: race.leg(),
                    features: self.bot_features,
                };
                let start = Instant::now();
                let decision = seat.policy.choose(&ctx);
                seat.metrics.record(start.elapsed());
                decision
            };

            let applied = apply_action(&mut race, &mut seats, seat_index, &decision)?;

            if tracing::enabled!(target: "camel_bench::turn", Level::INFO) {
                event!(
                    target: "camel_bench::turn",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    game_index = game_index as u32,
                    rotation_index = rotation_index as u32,
                    leg = race.leg(),
                    seat = %seats[seat_index].id,
                    player = %seats[seat_index].name,
                    policy = seats[seat_index].policy.name(),
                    requested = decision.action.kind(),
                    applied = applied.kind(),
                );
            }

            if race.is_race_over() || race.is_leg_over() {
                settle_leg(&race, &mut seats);
                if !race.is_race_over() {
                    race.finish_leg();
                    for seat in &mut seats {
                        seat.marker = None;
                    }
                }
            }
        }

        let ranking = race.ranking();
        let best = seats.iter().map(|seat| seat.coins).max().unwrap_or(0);
        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat.id.to_string(),
                player: seat.name.clone(),
            })
            .collect();

        let seat_results = seats
            .into_iter()
            .map(|seat| SeatResult {
                won: seat.coins == best,
                player_name: seat.name,
                seat: seat.id,
                coins: seat.coins,
                ledger: seat.ledger,
                metrics: seat.metrics.finalize(),
            })
            .collect();

        Ok(GameOutcome {
            seating,
            seat_results,
            legs: race.leg(),
            winning_camel: ranking.first().copied(),
        })
    }
}

/// Applies the chosen action, falling back to a roll when it cannot be carried out.
fn apply_action(
    race: &mut RaceState,
    seats: &mut [SeatState],
    seat_index: usize,
    decision: &Decision,
) -> Result<Action, RunnerError> {
    match decision.action {
        Action::BetOn(color) => {
            if let Some(ticket) = race.take_ticket(color) {
                let seat = &mut seats[seat_index];
                seat.tickets.push(HeldTicket {
                    ticket,
                    estimate: decision.expected_value,
                });
                seat.ledger.bets += 1;
                return Ok(decision.action);
            }
        }
        // One marker per seat per leg.
        Action::PlaceMarker(tile) if seats[seat_index].marker.is_none() => {
            let seat = &mut seats[seat_index];
            if race.place_marker(tile, decision.direction, seat.id).is_ok() {
                seat.marker = Some(tile);
                seat.ledger.markers += 1;
                return Ok(decision.action);
            }
        }
        Action::PlaceMarker(_) => {}
        Action::Roll => {}
    }

    if decision.action != Action::Roll {
        seats[seat_index].ledger.fallbacks += 1;
    }
    roll(race, seats, seat_index)?;
    Ok(Action::Roll)
}

fn roll(race: &mut RaceState, seats: &mut [SeatState], seat_index: usize) -> Result<(), RunnerError> {
    let report = race.roll()?;
    let seat = &mut seats[seat_index];
    seat.ledger.rolls += 1;
    if report.roll.color.is_regular() {
        seat.coins += 1;
        seat.ledger.roll_income += 1;
    }
    if let Some(trigger) = report.outcome.trigger {
        if let Some(owner) = seats.iter_mut().find(|seat| seat.id == trigger.owner) {
            owner.coins += 1;
            owner.ledger.marker_income += 1;
        }
    }
    Ok(())
}

fn settle_leg(race: &RaceState, seats: &mut [SeatState]) {
    let ranking = race.ranking();
    for seat in seats {
        for held in seat.tickets.drain(..) {
            let payout = held.ticket.settle(&ranking);
            seat.coins += payout;
            seat.ledger.record_settlement(&held, &ranking, payout);
        }
    }
}

fn build_seats(
    rotation: &[usize],
    players: &[PlayerBlueprint],
    game_seed: u64,
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(rotation.len());
    for (seat_idx, player_idx) in rotation.iter().enumerate() {
        let player = players
            .get(*player_idx)
            .ok_or(RunnerError::InvalidRotation {
                index: seat_idx,
                player_index: *player_idx,
            })?;
        let id = u8::try_from(seat_idx)
            .map(PlayerId)
            .map_err(|_| RunnerError::game(format!("seat index {seat_idx} out of range")))?;
        // Seeded by player, not seat, so a rotation changes only the seating.
        let policy_seed = game_seed.wrapping_add((*player_idx as u64).wrapping_mul(0x9E37_79B9));
        seats.push(SeatState::new(id, player, policy_seed));
    }
    Ok(seats)
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    game_index: usize,
    rotation_index: usize,
    game_seed: u64,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = format!("G{game_index:05}_R{rotation_index:02}");

    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = GameLogRow {
            run_id,
            game_id: &game_id,
            game_index,
            rotation_index,
            game_seed,
            seat: seat_result.seat.to_string(),
            player: &seat_result.player_name,
            seating: &outcome.seating,
            coins: seat_result.coins,
            won: seat_result.won,
            legs: outcome.legs,
            winning_camel: outcome.winning_camel,
            ledger: seat_result.ledger,
            speed_ms_turn: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

struct SeatState {
    id: PlayerId,
    name: String,
    policy: Box<dyn Policy>,
    coins: i32,
    tickets: Vec<HeldTicket>,
    marker: Option<usize>,
    ledger: SeatLedger,
    metrics: DecisionMetrics,
}

impl SeatState {
    fn new(id: PlayerId, player: &PlayerBlueprint, seed: u64) -> Self {
        Self {
            id,
            name: player.name.clone(),
            policy: player.spawn_policy(seed),
            coins: STARTING_COINS,
            tickets: Vec::new(),
            marker: None,
            ledger: SeatLedger::default(),
            metrics: DecisionMetrics::default(),
        }
    }
}

/// A ticket in hand plus the value the policy expected from it, when it gave one.
struct HeldTicket {
    ticket: BettingTicket,
    estimate: Option<f64>,
}

/// Where a seat's coins came from over one race.
///
/// `coins == STARTING_COINS + bet_income + roll_income + marker_income` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeatLedger {
    pub bets: u32,
    pub markers: u32,
    pub rolls: u32,
    /// Requested bets or markers that turned into a roll.
    pub fallbacks: u32,
    pub bets_first: u32,
    pub bets_second: u32,
    pub bets_lost: u32,
    pub bet_income: i32,
    pub roll_income: i32,
    /// Coins from other camels landing on this seat's markers.
    pub marker_income: i32,
    /// Bets that carried an estimate, with the estimated and realized payout totals.
    pub estimated_bets: u32,
    pub estimated_bet_value: f64,
    pub estimated_bet_payout: i32,
}

impl SeatLedger {
    fn record_settlement(&mut self, held: &HeldTicket, ranking: &[Color], payout: i32) {
        match ranking.iter().position(|color| *color == held.ticket.color) {
            Some(0) => self.bets_first += 1,
            Some(1) => self.bets_second += 1,
            _ => self.bets_lost += 1,
        }
        self.bet_income += payout;
        if let Some(estimate) = held.estimate {
            self.estimated_bets += 1;
            self.estimated_bet_value += estimate;
            self.estimated_bet_payout += payout;
        }
    }

    pub fn bets_settled(&self) -> u32 {
        self.bets_first + self.bets_second + self.bets_lost
    }
}

pub struct GameOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub legs: u32,
    pub winning_camel: Option<Color>,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub player: String,
}

pub struct SeatResult {
    pub player_name: String,
    pub seat: PlayerId,
    pub coins: i32,
    pub won: bool,
    pub ledger: SeatLedger,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: &'a str,
    game_index: usize,
    rotation_index: usize,
    game_seed: u64,
    seat: String,
    player: &'a str,
    seating: &'a [SeatSnapshot],
    coins: i32,
    won: bool,
    legs: u32,
    winning_camel: Option<Color>,
    #[serde(flatten)]
    ledger: SeatLedger,
    speed_ms_turn: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("race engine failed: {0}")]
    Race(#[from] RaceError),
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("rotation seat {index} references invalid player index {player_index}")]
    InvalidRotation { index: usize, player_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}
