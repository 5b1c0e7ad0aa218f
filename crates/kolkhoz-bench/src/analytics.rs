use std::collections::HashMap;
use std::fs;
use std::path::Path;

use kolkhoz_bot::BotKind;
use kolkhoz_core::game::rules::RequisitionScope;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::tournament::GameOutcome;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulates per-agent results game by game.
pub struct AnalyticsCollector {
    run_id: String,
    variant: RequisitionScope,
    baseline: Option<String>,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, ComparisonAccumulator>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.bot_kind().ok()),
            );
            order.push(agent.name.clone());
        }

        Self {
            run_id: config.run_id.clone(),
            variant: config.games.variant,
            baseline: config.metrics.baseline.clone(),
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        let best = outcome
            .seat_results
            .iter()
            .map(|seat| seat.final_score)
            .max()
            .unwrap_or(0);

        let mut per_agent: HashMap<&str, (f64, usize)> = HashMap::new();
        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.record_seat(
                seat.final_score,
                seat.final_score == best,
                seat.exiled,
                seat.jobs_won,
                seat.metrics.total_ms,
                seat.metrics.decisions,
            );
            let entry = per_agent.entry(seat.agent_name.as_str()).or_insert((0.0, 0));
            entry.0 += f64::from(seat.final_score);
            entry.1 += 1;
        }

        // Agents sharing a table are compared on their mean seat score.
        let Some(baseline) = self.baseline.as_deref() else {
            return Ok(());
        };
        let Some(&(base_total, base_seats)) = per_agent.get(baseline) else {
            return Ok(());
        };
        let baseline_mean = base_total / base_seats as f64;
        for (name, (total, seats)) in per_agent {
            if name == baseline {
                continue;
            }
            self.comparisons
                .entry(name.to_string())
                .or_insert_with(ComparisonAccumulator::new)
                .record(total / seats as f64 - baseline_mean);
        }

        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let mut comparisons = Vec::new();
        if let Some(baseline) = self.baseline.as_ref() {
            for report in &reports {
                if &report.name == baseline {
                    continue;
                }
                let (p_value, sample_size) = self
                    .comparisons
                    .remove(&report.name)
                    .map(ComparisonAccumulator::wilcoxon_signed_rank)
                    .unwrap_or((1.0, 0));
                comparisons.push(ComparisonReport {
                    agent: report.name.clone(),
                    p_value,
                    sample_size,
                });
            }
        }

        AnalyticsSummary {
            run_id: self.run_id,
            variant: self.variant,
            baseline: self.baseline,
            agents: reports,
            comparisons,
        }
        .enrich()
    }
}

struct AgentAccumulator {
    name: String,
    kind: Option<BotKind>,
    total_points: f64,
    seats: u32,
    wins: u32,
    exiled: u64,
    jobs_won: u64,
    per_seat_points: Vec<f64>,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, kind: Option<BotKind>) -> Self {
        Self {
            name,
            kind,
            total_points: 0.0,
            seats: 0,
            wins: 0,
            exiled: 0,
            jobs_won: 0,
            per_seat_points: Vec::new(),
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_seat(
        &mut self,
        final_score: u32,
        is_winner: bool,
        exiled: usize,
        jobs_won: usize,
        latency_ms: f64,
        decisions: u32,
    ) {
        let points = f64::from(final_score);
        self.total_points += points;
        self.seats += 1;
        self.per_seat_points.push(points);
        if is_winner {
            self.wins += 1;
        }
        self.exiled += exiled as u64;
        self.jobs_won += jobs_won as u64;
        self.total_latency_ms += latency_ms;
        self.total_decisions += u64::from(decisions);
    }

    fn into_report(self) -> AgentReport {
        let seats = f64::from(self.seats.max(1));
        let avg_score = if self.seats == 0 {
            0.0
        } else {
            self.total_points / seats
        };
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            kind: self.kind.map_or("unknown", BotKind::as_str),
            seats: self.seats as usize,
            avg_score,
            ci95: confidence_interval(&self.per_seat_points),
            wins: self.wins as usize,
            avg_exiled: self.exiled as f64 / seats,
            avg_jobs_won: self.jobs_won as f64 / seats,
            average_ms_per_decision: avg_latency,
            delta_vs_baseline: None,
            name: self.name,
        }
    }
}

struct ComparisonAccumulator {
    diffs: Vec<f64>,
}

impl ComparisonAccumulator {
    fn new() -> Self {
        Self { diffs: Vec::new() }
    }

    fn record(&mut self, diff: f64) {
        self.diffs.push(diff);
    }

    /// Two-sided p-value from the normal approximation with tie correction,
    /// paired with the number of non-zero differences.
    fn wilcoxon_signed_rank(self) -> (f64, usize) {
        let diffs: Vec<f64> = self
            .diffs
            .into_iter()
            .filter(|d| d.abs() > f64::EPSILON)
            .collect();
        let n = diffs.len();
        if n == 0 {
            return (1.0, 0);
        }

        let mut paired: Vec<(f64, f64)> =
            diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut ranks = Vec::with_capacity(n);
        let mut tie_sizes = Vec::new();
        let mut i = 0;
        while i < paired.len() {
            let mut j = i;
            while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
                j += 1;
            }
            let rank = (i + j + 2) as f64 / 2.0;
            for &(_, sign) in &paired[i..=j] {
                ranks.push((rank, sign));
            }
            if j > i {
                tie_sizes.push(j - i + 1);
            }
            i = j + 1;
        }

        let w_plus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign > 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w_minus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(rank, _)| *rank)
            .sum();

        let w = w_plus.min(w_minus);
        let n_f = n as f64;
        let mean_w = n_f * (n_f + 1.0) / 4.0;

        let tie_adjustment: f64 = tie_sizes
            .into_iter()
            .map(|count| {
                let c = count as f64;
                (c.powi(3) - c) / 48.0
            })
            .sum();
        let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
        if variance_w <= 0.0 {
            return (1.0, n);
        }

        let Ok(normal) = Normal::new(0.0, 1.0) else {
            return (1.0, n);
        };
        let z = ((w - mean_w).abs() - 0.5).max(0.0) / variance_w.sqrt();
        let p = 2.0 * (1.0 - normal.cdf(z));
        (p.clamp(0.0, 1.0), n)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub variant: RequisitionScope,
    pub baseline: Option<String>,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    fn enrich(mut self) -> Self {
        let baseline_avg = self.baseline.as_ref().and_then(|baseline| {
            self.agents
                .iter()
                .find(|agent| &agent.name == baseline)
                .map(|agent| agent.avg_score)
        });

        if let Some(baseline_avg) = baseline_avg {
            for agent in &mut self.agents {
                agent.delta_vs_baseline = Some(agent.avg_score - baseline_avg);
            }
        }

        self
    }

    pub fn agent(&self, name: &str) -> Option<&AgentReport> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    pub fn render_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str(&format!(
            "Run `{}`, requisition visits `{}`\n\n",
            self.run_id, self.variant
        ));
        if let Some(baseline) = self.baseline.as_ref() {
            rows.push_str(&format!("Baseline: `{baseline}`\n\n"));
        }
        rows.push_str("| Agent | Kind | Seats | Avg score | Δ vs baseline | 95% CI | Win % | Avg exiled | Avg jobs | Avg ms/decision | p-value |\n");
        rows.push_str("|-------|------|-------|-----------|---------------|--------|-------|------------|----------|-----------------|---------|\n");

        for agent in &self.agents {
            let p_value = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| format!("{:.3}", c.p_value))
                .unwrap_or_else(|| "-".to_string());
            let delta = agent
                .delta_vs_baseline
                .map(|delta| format!("{delta:+.2}"))
                .unwrap_or_else(|| "-".to_string());
            let win_rate = if agent.seats == 0 {
                0.0
            } else {
                agent.wins as f64 / agent.seats as f64
            };

            rows.push_str(&format!(
                "| {name} | {kind} | {seats} | {avg:.2} | {delta} | [{ci_low:.2}, {ci_high:.2}] | {win:.1}% | {exiled:.2} | {jobs:.2} | {latency:.3} | {p_value} |\n",
                name = agent.name,
                kind = agent.kind,
                seats = agent.seats,
                avg = agent.avg_score,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                win = win_rate * 100.0,
                exiled = agent.avg_exiled,
                jobs = agent.avg_jobs_won,
                latency = agent.average_ms_per_decision,
            ));
        }

        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: &'static str,
    /// Seat-games played; an agent filling two seats counts twice per game.
    pub seats: usize,
    pub avg_score: f64,
    pub ci95: (f64, f64),
    pub wins: usize,
    pub avg_exiled: f64,
    pub avg_jobs_won: f64,
    pub average_ms_per_decision: f64,
    pub delta_vs_baseline: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}
