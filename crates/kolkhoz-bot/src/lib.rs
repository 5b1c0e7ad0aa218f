pub mod bot;
pub mod policy;

pub use bot::{AssignPlanner, BotParams, PlayPlanner, TrumpPlanner};
pub use policy::{Agent, BotKind, HeuristicPolicy, RandomPolicy, UnknownBotKind};
