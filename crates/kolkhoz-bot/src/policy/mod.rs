mod heuristic;
mod random;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;

use core::fmt;
use core::str::FromStr;
use kolkhoz_core::game::assignment::Assignment;
use kolkhoz_core::game::decision::{DecisionContext, DecisionMaker};
use kolkhoz_core::model::suit::Suit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotKind {
    Random,
    Heuristic,
}

impl BotKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            BotKind::Random => "random",
            BotKind::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBotKind(pub String);

impl fmt::Display for UnknownBotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown bot kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownBotKind {}

impl FromStr for BotKind {
    type Err = UnknownBotKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" | "easy" => Ok(BotKind::Random),
            "heuristic" | "normal" => Ok(BotKind::Heuristic),
            other => Err(UnknownBotKind(other.to_string())),
        }
    }
}

/// A seated bot of either kind.
pub enum Agent {
    Random(RandomPolicy),
    Heuristic(HeuristicPolicy),
}

impl Agent {
    pub fn new(kind: BotKind, seed: u64) -> Self {
        match kind {
            BotKind::Random => Agent::Random(RandomPolicy::new(seed)),
            BotKind::Heuristic => Agent::Heuristic(HeuristicPolicy::new(seed)),
        }
    }

    pub fn kind(&self) -> BotKind {
        match self {
            Agent::Random(_) => BotKind::Random,
            Agent::Heuristic(_) => BotKind::Heuristic,
        }
    }

    /// Trump preference while planning. `None` leaves the draw to the engine.
    pub fn choose_trump(&mut self, ctx: &DecisionContext) -> Option<Suit> {
        match self {
            Agent::Random(_) => None,
            Agent::Heuristic(policy) => Some(policy.choose_trump(ctx)),
        }
    }
}

impl DecisionMaker for Agent {
    fn choose_play(&mut self, ctx: &DecisionContext) -> usize {
        match self {
            Agent::Random(policy) => policy.choose_play(ctx),
            Agent::Heuristic(policy) => policy.choose_play(ctx),
        }
    }

    fn choose_assignment(&mut self, ctx: &DecisionContext) -> Assignment {
        match self {
            Agent::Random(policy) => policy.choose_assignment(ctx),
            Agent::Heuristic(policy) => policy.choose_assignment(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BotKind;

    #[test]
    fn bot_kind_parses_aliases() {
        assert_eq!("random".parse::<BotKind>(), Ok(BotKind::Random));
        assert_eq!(" Heuristic ".parse::<BotKind>(), Ok(BotKind::Heuristic));
        assert_eq!("normal".parse::<BotKind>(), Ok(BotKind::Heuristic));
        assert!("mcts".parse::<BotKind>().is_err());
    }
}
