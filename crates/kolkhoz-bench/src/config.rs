//! Tournament configuration read from YAML.
//!
//! The `games` block picks the table: how many games, the master seed, the
//! seat count and the requisition `variant` (`completed_jobs` or
//! `failed_jobs`). Its optional `house_rules` map switches the table
//! variants on or off; anything left out plays by the standard rules.
//! Agents name a bot kind and must fit around one table. Output paths may
//! carry a `{run_id}` placeholder.

use kolkhoz_bot::BotKind;
use kolkhoz_core::game::rules::{MAX_PLAYERS, MIN_PLAYERS, RequisitionScope, RuleSet};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_NUM_PLAYERS: usize = MAX_PLAYERS;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub games: GamesConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Checks every block and trims agent names; touches no files.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.games.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_agents(&mut self.agents, self.games.num_players)?;
        self.metrics.validate(&self.agents)?;
        Ok(())
    }

    /// Output paths with `{run_id}` filled in.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// How many games to play, at how many seats, under which rules.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamesConfig {
    /// Master seed every game seed is drawn from; missing means 0.
    pub seed: Option<u64>,
    pub count: usize,
    #[serde(default = "default_num_players")]
    pub num_players: usize,
    /// Which jobs the end-of-year requisition visits.
    #[serde(default)]
    pub variant: RequisitionScope,
    #[serde(default)]
    pub house_rules: HouseRules,
}

/// Table variants layered over the requisition scope.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HouseRules {
    pub nomenclature: bool,
    pub hero_of_soviet_union: bool,
    pub mice_variant: bool,
    pub northern_style: bool,
}

impl Default for HouseRules {
    fn default() -> Self {
        let standard = RuleSet::STANDARD;
        Self {
            nomenclature: standard.nomenclature,
            hero_of_soviet_union: standard.hero_of_soviet_union,
            mice_variant: standard.mice_variant,
            northern_style: standard.northern_style,
        }
    }
}

impl GamesConfig {
    /// Engine rules every game of the run is played under.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            requisition_scope: self.variant,
            nomenclature: self.house_rules.nomenclature,
            hero_of_soviet_union: self.house_rules.hero_of_soviet_union,
            mice_variant: self.house_rules.mice_variant,
            northern_style: self.house_rules.northern_style,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::InvalidField {
                field: "games.count".to_string(),
                message: "number of games must be greater than zero".to_string(),
            });
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(ValidationError::InvalidField {
                field: "games.num_players".to_string(),
                message: format!("tables seat between {MIN_PLAYERS} and {MAX_PLAYERS} players"),
            });
        }

        Ok(())
    }
}

fn default_num_players() -> usize {
    DEFAULT_NUM_PLAYERS
}

/// Definition of a tournament participant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    /// `random` or `heuristic`; parsed through [`BotKind`].
    pub kind: String,
}

impl AgentConfig {
    pub fn bot_kind(&self) -> Result<BotKind, kolkhoz_bot::UnknownBotKind> {
        self.kind.parse()
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Metrics configuration block. Without a baseline the summary skips
/// paired comparisons.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub baseline: Option<String>,
}

impl MetricsConfig {
    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        let Some(baseline) = self.baseline.as_ref() else {
            return Ok(());
        };

        if !agents.iter().any(|a| &a.name == baseline) {
            return Err(ValidationError::InvalidField {
                field: "metrics.baseline".to_string(),
                message: format!("baseline agent '{baseline}' is not defined in agents list"),
            });
        }

        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig], seats: usize) -> Result<(), ValidationError> {
    if agents.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "agents".to_string(),
            message: "at least one agent must be specified".to_string(),
        });
    }

    if agents.len() > seats {
        return Err(ValidationError::InvalidField {
            field: "agents".to_string(),
            message: format!(
                "{} agents cannot share a table of {seats}",
                agents.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        agent.name = agent.name.trim().to_string();
        if agent.name.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "agents.name".to_string(),
                message: "agent name must not be empty".to_string(),
            });
        }

        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("agents[{}].name", agent.name),
                message: "agent name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "agents".to_string(),
                message: format!("agent name '{}' defined more than once", agent.name),
            });
        }

        if let Err(err) = agent.bot_kind() {
            return Err(ValidationError::InvalidField {
                field: format!("agents[{}].kind", agent.name),
                message: err.to_string(),
            });
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

impl ResolvedOutputs {
    /// Directory holding the summary; structured logs land beside it.
    pub fn summary_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
