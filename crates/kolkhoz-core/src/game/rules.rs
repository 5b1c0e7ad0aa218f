use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Labor hours a job needs before its reward is claimed.
pub const THRESHOLD: u32 = 40;
/// Length of the plan; the final year is the famine year.
pub const MAX_YEARS: u32 = 5;
pub const HAND_SIZE: usize = 5;
pub const TRICKS_PER_YEAR: u32 = 4;
pub const FINAL_YEAR_TRICKS: u32 = 3;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Which jobs the end-of-year requisition visits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequisitionScope {
    /// Jobs whose hours reached the threshold this year.
    #[default]
    CompletedJobs,
    /// Jobs left short of the threshold (classic table rule).
    FailedJobs,
}

impl RequisitionScope {
    pub fn applies(self, work_hours: u32) -> bool {
        match self {
            RequisitionScope::CompletedJobs => work_hours >= THRESHOLD,
            RequisitionScope::FailedJobs => work_hours < THRESHOLD,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RequisitionScope::CompletedJobs => "completed_jobs",
            RequisitionScope::FailedJobs => "failed_jobs",
        }
    }
}

impl fmt::Display for RequisitionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequisitionScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "completed" | "completed_jobs" => Ok(RequisitionScope::CompletedJobs),
            "failed" | "failed_jobs" | "classic" => Ok(RequisitionScope::FailedJobs),
            other => Err(format!("unknown requisition scope '{other}'")),
        }
    }
}

/// Table rules. Every flag falls back to the standard game when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub requisition_scope: RequisitionScope,
    /// Trump J, Q and K act as drunkard, informant and party official.
    #[serde(default = "enabled")]
    pub nomenclature: bool,
    /// A seat that won every trick of the year is spared by requisition.
    #[serde(default)]
    pub hero_of_soviet_union: bool,
    /// Requisition pools the cards revealed at the table and exiles the
    /// highest of them instead of one card per seat.
    #[serde(default)]
    pub mice_variant: bool,
    /// Completed jobs pay no reward and every seat is vulnerable.
    #[serde(default)]
    pub northern_style: bool,
}

const fn enabled() -> bool {
    true
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl RuleSet {
    pub const STANDARD: RuleSet = RuleSet {
        requisition_scope: RequisitionScope::CompletedJobs,
        nomenclature: true,
        hero_of_soviet_union: false,
        mice_variant: false,
        northern_style: false,
    };

    pub const fn with_scope(mut self, scope: RequisitionScope) -> Self {
        self.requisition_scope = scope;
        self
    }

    /// Trump that gives face cards their roles, `None` without nomenclature.
    pub const fn role_trump(&self, trump: Option<Suit>) -> Option<Suit> {
        if self.nomenclature { trump } else { None }
    }

    pub const fn tricks_in_year(&self, year: u32) -> u32 {
        if year >= MAX_YEARS {
            FINAL_YEAR_TRICKS
        } else {
            TRICKS_PER_YEAR
        }
    }
}

/// Table setup for a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOptions {
    pub num_players: usize,
    /// Seat that waits for explicit assignments; `None` seats only AI.
    pub human_seat: Option<usize>,
    pub rules: RuleSet,
}

impl GameOptions {
    pub const fn new(num_players: usize) -> Self {
        Self {
            num_players,
            human_seat: Some(0),
            rules: RuleSet::STANDARD,
        }
    }

    pub const fn all_ai(num_players: usize) -> Self {
        Self {
            num_players,
            human_seat: None,
            rules: RuleSet::STANDARD,
        }
    }

    pub const fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }
}

impl Default for GameOptions {
    fn default() -> Self {
        Self::new(MAX_PLAYERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_year_is_shorter() {
        let rules = RuleSet::default();
        assert_eq!(rules.tricks_in_year(1), TRICKS_PER_YEAR);
        assert_eq!(rules.tricks_in_year(MAX_YEARS - 1), TRICKS_PER_YEAR);
        assert_eq!(rules.tricks_in_year(MAX_YEARS), FINAL_YEAR_TRICKS);
    }

    #[test]
    fn scope_selects_jobs_by_threshold() {
        assert!(RequisitionScope::CompletedJobs.applies(THRESHOLD));
        assert!(!RequisitionScope::CompletedJobs.applies(THRESHOLD - 1));
        assert!(RequisitionScope::FailedJobs.applies(0));
        assert!(!RequisitionScope::FailedJobs.applies(THRESHOLD + 3));
    }

    #[test]
    fn scope_parses_aliases() {
        assert_eq!(
            "classic".parse::<RequisitionScope>(),
            Ok(RequisitionScope::FailedJobs)
        );
        assert_eq!(
            " Completed ".parse::<RequisitionScope>(),
            Ok(RequisitionScope::CompletedJobs)
        );
        assert!("sometimes".parse::<RequisitionScope>().is_err());
    }

    #[test]
    fn missing_flags_fall_back_to_standard_rules() {
        let rules: RuleSet = serde_json::from_str("{}").unwrap();
        assert_eq!(rules, RuleSet::STANDARD);
        let rules: RuleSet =
            serde_json::from_str(r#"{"nomenclature": false, "mice_variant": true}"#).unwrap();
        assert!(!rules.nomenclature);
        assert!(rules.mice_variant);
        assert_eq!(rules.role_trump(Some(Suit::Clubs)), None);
        assert_eq!(
            RuleSet::STANDARD.role_trump(Some(Suit::Clubs)),
            Some(Suit::Clubs)
        );
    }

    #[test]
    fn default_options_seat_a_human_first() {
        let options = GameOptions::default();
        assert_eq!(options.num_players, 4);
        assert_eq!(options.human_seat, Some(0));
        assert_eq!(GameOptions::all_ai(3).human_seat, None);
    }
}
