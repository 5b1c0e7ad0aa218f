mod rotation;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use kolkhoz_bot::{Agent, BotKind, UnknownBotKind};
use kolkhoz_core::game::assignment::Assignment;
use kolkhoz_core::game::decision::{DecisionContext, DecisionMaker};
use kolkhoz_core::game::error::GameError;
use kolkhoz_core::game::history::Event;
use kolkhoz_core::game::rules::GameOptions;
use kolkhoz_core::game::state::{GameState, Phase, PlayOutcome};
use kolkhoz_core::model::suit::Suit;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, BenchmarkConfig, ResolvedOutputs};

pub use rotation::SeatRotation;

const AGENT_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    rotation: SeatRotation,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        let seats = config.games.num_players;
        if agents.is_empty() || agents.len() > seats {
            return Err(RunnerError::SeatCount {
                agents: agents.len(),
                seats,
            });
        }

        let rotation = SeatRotation::new(agents.len(), seats);

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
            rotation,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let outcome = self.play_game(game_index, game_seed)?;
            analytics.record_game(&outcome)?;
            rows_written += write_game_rows(&mut writer, &self.config, game_index, &outcome)?;
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.summary_dir().join("telemetry.jsonl"));

        Ok(RunSummary {
            games_played: self.config.games.count,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(&self, game_index: usize, game_seed: u64) -> Result<GameOutcome, RunnerError> {
        let game_err = |source: GameError| RunnerError::Game { game_index, source };

        let mut rng = StdRng::seed_from_u64(game_seed);
        let games = &self.config.games;
        let options = GameOptions::all_ai(games.num_players).with_rules(games.rule_set());
        let mut state = GameState::with_options(options, &mut rng).map_err(game_err)?;
        let mut table = Table::seat(self.rotation.seating(game_index), &self.agents, game_seed)?;

        loop {
            match state.phase() {
                Phase::Planning => {
                    if state.trump().is_none() {
                        let lead = state.lead();
                        let choice = table.choose_trump(&DecisionContext::new(lead, &state));
                        state.set_trump(choice, &mut rng).map_err(game_err)?;
                    }
                    state.begin_year(&mut rng).map_err(game_err)?;
                }
                Phase::Trick => {
                    let seat = state.next_to_play();
                    let index = table.choose_play(&DecisionContext::new(seat, &state));
                    if !state.legal_plays(seat).contains(&index) {
                        return Err(RunnerError::IllegalPlay {
                            game_index,
                            seat,
                            agent: table.seats[seat].agent_name.clone(),
                            index,
                        });
                    }
                    let outcome = state.play_card(seat, index, &mut table).map_err(game_err)?;
                    if let PlayOutcome::TrickCompleted {
                        winner,
                        assignment: Some(result),
                        ..
                    } = outcome
                    {
                        table.seats[winner].jobs_won += result.claimed.len();
                    }
                }
                Phase::Requisition => state.next_year(&mut rng).map_err(game_err)?,
                Phase::Assignment => return Err(RunnerError::StalledAssignment { game_index }),
                Phase::GameOver => break,
            }
        }

        let outcome = GameOutcome::collect(game_seed, &state, table);
        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "kolkhoz_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                seed = game_seed,
                tricks = outcome.tricks as u32,
                final_scores = ?state.final_scores(),
                "game finished"
            );
        }
        Ok(outcome)
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    game_index: usize,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = format!("G{game_index:05}");

    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = GameLogRow {
            run_id: &config.run_id,
            game_id: &game_id,
            game_index,
            seed: outcome.seed,
            variant: config.games.variant.as_str(),
            seat: seat_result.seat,
            agent: &seat_result.agent_name,
            kind: seat_result.kind.as_str(),
            seating: &outcome.seating,
            score: seat_result.score,
            final_score: seat_result.final_score,
            exiled: seat_result.exiled,
            jobs_won: seat_result.jobs_won,
            decisions: seat_result.metrics.decisions,
            speed_ms_decision: seat_result.metrics.avg_ms_per_decision,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }
    Ok(rows_written)
}

/// Routes engine callbacks to the agent in the asking seat.
struct Table {
    seats: Vec<SeatState>,
}

impl Table {
    fn seat(
        arrangement: &[usize],
        agents: &[AgentBlueprint],
        game_seed: u64,
    ) -> Result<Self, RunnerError> {
        let mut seats = Vec::with_capacity(arrangement.len());
        for (seat, &agent_index) in arrangement.iter().enumerate() {
            let blueprint = agents
                .get(agent_index)
                .ok_or(RunnerError::InvalidArrangement { seat, agent_index })?;
            let agent_seed = game_seed ^ (seat as u64 + 1).wrapping_mul(AGENT_SEED_MIX);
            seats.push(SeatState::new(agent_index, blueprint, agent_seed));
        }
        Ok(Self { seats })
    }

    fn choose_trump(&mut self, ctx: &DecisionContext) -> Option<Suit> {
        let seat = &mut self.seats[ctx.seat];
        let start = Instant::now();
        let choice = seat.agent.choose_trump(ctx);
        seat.metrics.record(start.elapsed());
        choice
    }
}

impl DecisionMaker for Table {
    fn choose_play(&mut self, ctx: &DecisionContext) -> usize {
        let seat = &mut self.seats[ctx.seat];
        let start = Instant::now();
        let index = seat.agent.choose_play(ctx);
        seat.metrics.record(start.elapsed());
        index
    }

    fn choose_assignment(&mut self, ctx: &DecisionContext) -> Assignment {
        let seat = &mut self.seats[ctx.seat];
        let start = Instant::now();
        let assignment = seat.agent.choose_assignment(ctx);
        seat.metrics.record(start.elapsed());
        assignment
    }
}

struct SeatState {
    agent_index: usize,
    agent_name: String,
    agent: Agent,
    metrics: DecisionMetrics,
    jobs_won: usize,
}

impl SeatState {
    fn new(agent_index: usize, blueprint: &AgentBlueprint, seed: u64) -> Self {
        Self {
            agent_index,
            agent_name: blueprint.name.clone(),
            agent: Agent::new(blueprint.kind, seed),
            metrics: DecisionMetrics::default(),
            jobs_won: 0,
        }
    }
}

/// Per-game result handed to analytics and the JSONL writer.
pub struct GameOutcome {
    pub seed: u64,
    /// Agent name per seat.
    pub seating: Vec<String>,
    pub seat_results: Vec<SeatResult>,
    pub tricks: usize,
}

impl GameOutcome {
    fn collect(seed: u64, state: &GameState, table: Table) -> Self {
        let mut exiled = vec![0usize; state.num_players()];
        for event in state.trick_history().events() {
            if let Event::Requisition { actions, .. } = event {
                for player in actions.iter().filter_map(|action| action.player()) {
                    if let Some(count) = exiled.get_mut(player) {
                        *count += 1;
                    }
                }
            }
        }

        let scores = state.scores();
        let final_scores = state.final_scores();
        let seating = table
            .seats
            .iter()
            .map(|seat| seat.agent_name.clone())
            .collect();
        let seat_results = table
            .seats
            .into_iter()
            .enumerate()
            .map(|(seat, seat_state)| SeatResult {
                seat,
                agent_index: seat_state.agent_index,
                kind: seat_state.agent.kind(),
                agent_name: seat_state.agent_name,
                score: scores.get(seat).copied().unwrap_or(0),
                final_score: final_scores.get(seat).copied().unwrap_or(0),
                exiled: exiled.get(seat).copied().unwrap_or(0),
                jobs_won: seat_state.jobs_won,
                metrics: seat_state.metrics.finalize(),
            })
            .collect();

        Self {
            seed,
            seating,
            seat_results,
            tricks: state.trick_history().tricks().count(),
        }
    }
}

pub struct SeatResult {
    pub seat: usize,
    pub agent_index: usize,
    pub agent_name: String,
    pub kind: BotKind,
    /// Revealed plot total.
    pub score: u32,
    /// Hidden plus revealed plot total.
    pub final_score: u32,
    /// Cards this seat lost to requisition.
    pub exiled: usize,
    pub jobs_won: usize,
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
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: &'a str,
    game_index: usize,
    seed: u64,
    variant: &'static str,
    seat: usize,
    agent: &'a str,
    kind: &'static str,
    seating: &'a [String],
    score: u32,
    final_score: u32,
    exiled: usize,
    jobs_won: usize,
    decisions: u32,
    speed_ms_decision: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("agent '{name}': {source}")]
    Agent {
        name: String,
        #[source]
        source: UnknownBotKind,
    },
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
    #[error("game {game_index} failed: {source}")]
    Game {
        game_index: usize,
        #[source]
        source: GameError,
    },
    #[error("game {game_index}: agent '{agent}' in seat {seat} chose illegal hand index {index}")]
    IllegalPlay {
        game_index: usize,
        seat: usize,
        agent: String,
        index: usize,
    },
    #[error("game {game_index} stopped waiting for a human assignment")]
    StalledAssignment { game_index: usize },
    #[error("{agents} agents cannot be seated at a table of {seats}")]
    SeatCount { agents: usize, seats: usize },
    #[error("seat {seat} references invalid agent index {agent_index}")]
    InvalidArrangement { seat: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

struct AgentBlueprint {
    name: String,
    kind: BotKind,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, RunnerError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, RunnerError> {
        let kind = config.bot_kind().map_err(|source| RunnerError::Agent {
            name: config.name.clone(),
            source,
        })?;
        Ok(Self {
            name: config.name.clone(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprints() -> Vec<AgentBlueprint> {
        vec![
            AgentBlueprint {
                name: "planner".into(),
                kind: BotKind::Heuristic,
            },
            AgentBlueprint {
                name: "dice".into(),
                kind: BotKind::Random,
            },
        ]
    }

    #[test]
    fn table_follows_arrangement() {
        let table = Table::seat(&[1, 0, 1], &blueprints(), 7).expect("seated");
        let names: Vec<_> = table.seats.iter().map(|s| s.agent_name.as_str()).collect();
        assert_eq!(names, ["dice", "planner", "dice"]);
        assert_eq!(table.seats[1].agent.kind(), BotKind::Heuristic);
    }

    #[test]
    fn table_rejects_unknown_agent_index() {
        let err = Table::seat(&[0, 5], &blueprints(), 7).err().expect("bad index");
        assert!(matches!(
            err,
            RunnerError::InvalidArrangement {
                seat: 1,
                agent_index: 5
            }
        ));
    }

    #[test]
    fn decision_metrics_average_elapsed_time() {
        let mut metrics = DecisionMetrics::default();
        metrics.record(Duration::from_millis(2));
        metrics.record(Duration::from_millis(4));
        let summary = metrics.finalize();
        assert_eq!(summary.decisions, 2);
        assert!((summary.avg_ms_per_decision - 3.0).abs() < 1e-9);
        assert!((summary.total_ms - 6.0).abs() < 1e-9);
    }
}
