use super::history::{Event, History};
use super::jobs::JobBoard;
use super::rules::{MAX_PLAYERS, MAX_YEARS, MIN_PLAYERS, RuleSet};
use super::state::{GameState, Phase};
use crate::model::card::Card;
use crate::model::deck::{Deck, JobPiles, WORKER_DECK_SIZE};
use crate::model::hand::Hand;
use crate::model::player::{Player, SeatKind};
use crate::model::plot::Plot;
use crate::model::suit::Suit;
use crate::model::suit_map::SuitMap;
use crate::model::trick::{Play, Trick};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub index: usize,
    pub kind: SeatKind,
    pub hand: Vec<Card>,
    pub hidden: Vec<Card>,
    pub revealed: Vec<Card>,
    #[serde(default)]
    pub brigade_leader: bool,
}

/// Complete, serializable copy of a [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(default)]
    pub rules: RuleSet,
    pub players: Vec<PlayerSnapshot>,
    pub lead: usize,
    pub year: u32,
    pub trump: Option<Suit>,
    pub job_piles: SuitMap<Vec<Card>>,
    pub revealed_jobs: SuitMap<Option<Card>>,
    pub claimed_jobs: BTreeSet<Suit>,
    pub work_hours: SuitMap<u32>,
    pub job_buckets: SuitMap<Vec<Card>>,
    pub current_trick: Vec<Play>,
    pub last_trick: Vec<Play>,
    pub last_winner: Option<usize>,
    #[serde(default)]
    pub trick_history: Vec<Event>,
    pub exiled: BTreeSet<Card>,
    pub phase: Phase,
    pub trick_count: u32,
    pub workers_deck: Vec<Card>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported player count {0}")]
    PlayerCount(usize),
    #[error("player at position {position} carries index {index}")]
    PlayerIndex { position: usize, index: usize },
    #[error("{field} refers to seat {seat} which does not exist")]
    SeatOutOfRange { field: &'static str, seat: usize },
    #[error("year {0} is outside the plan")]
    YearOutOfRange(u32),
    #[error("{card} cannot be held in {location}")]
    MisplacedCard { location: &'static str, card: Card },
    #[error("{0} appears more than once")]
    DuplicateCard(Card),
    #[error("{0} worker cards are unaccounted for")]
    MissingCards(usize),
    #[error("{suit} records {recorded} work hours but its bucket holds {expected}")]
    WorkHoursMismatch {
        suit: Suit,
        recorded: u32,
        expected: u32,
    },
    #[error("{0}")]
    Inconsistent(&'static str),
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        GameSnapshot {
            rules: state.rules,
            players: state
                .players
                .iter()
                .map(|player| PlayerSnapshot {
                    index: player.index(),
                    kind: player.kind(),
                    hand: player.hand().cards().to_vec(),
                    hidden: player.plot().hidden().to_vec(),
                    revealed: player.plot().revealed().to_vec(),
                    brigade_leader: player.is_brigade_leader(),
                })
                .collect(),
            lead: state.lead,
            year: state.year,
            trump: state.trump,
            job_piles: state.job_piles.piles().clone(),
            revealed_jobs: *state.jobs.revealed(),
            claimed_jobs: state.jobs.claimed().clone(),
            work_hours: *state.jobs.work_hours(),
            job_buckets: state.jobs.buckets().clone(),
            current_trick: state.current_trick.plays().to_vec(),
            last_trick: state.last_trick.plays().to_vec(),
            last_winner: state.last_winner,
            trick_history: state.history.events().to_vec(),
            exiled: state.exiled.clone(),
            phase: state.phase,
            trick_count: state.trick_count,
            workers_deck: state.workers_deck.cards().to_vec(),
        }
    }

    /// Rebuilds the game after checking the table invariants.
    pub fn restore(self) -> Result<GameState, SnapshotError> {
        self.validate()?;
        let players = self
            .players
            .into_iter()
            .map(|snapshot| Player {
                index: snapshot.index,
                kind: snapshot.kind,
                hand: Hand::with_cards(snapshot.hand),
                plot: Plot::from_parts(snapshot.hidden, snapshot.revealed),
                brigade_leader: snapshot.brigade_leader,
            })
            .collect();
        Ok(GameState {
            rules: self.rules,
            players,
            lead: self.lead,
            year: self.year,
            trump: self.trump,
            job_piles: JobPiles::from_piles(self.job_piles),
            jobs: JobBoard::from_parts(
                self.revealed_jobs,
                self.claimed_jobs,
                self.work_hours,
                self.job_buckets,
            ),
            current_trick: Trick::from_plays(self.current_trick),
            last_trick: Trick::from_plays(self.last_trick),
            last_winner: self.last_winner,
            history: History::from_events(self.trick_history),
            exiled: self.exiled,
            phase: self.phase,
            trick_count: self.trick_count,
            workers_deck: Deck::from_cards(self.workers_deck),
        })
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Decodes and restores in one step.
    pub fn load(json: &str) -> Result<GameState, SnapshotError> {
        Self::from_json(json)?.restore()
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let count = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(SnapshotError::PlayerCount(count));
        }
        if let Some((position, player)) = self
            .players
            .iter()
            .enumerate()
            .find(|(position, player)| player.index != *position)
        {
            return Err(SnapshotError::PlayerIndex {
                position,
                index: player.index,
            });
        }
        if !(1..=MAX_YEARS).contains(&self.year) {
            return Err(SnapshotError::YearOutOfRange(self.year));
        }

        let seat_in_range = |field: &'static str, seat: usize| {
            if seat < count {
                Ok(())
            } else {
                Err(SnapshotError::SeatOutOfRange { field, seat })
            }
        };
        seat_in_range("lead", self.lead)?;
        if let Some(winner) = self.last_winner {
            seat_in_range("last_winner", winner)?;
        }
        for play in self.current_trick.iter().chain(&self.last_trick) {
            seat_in_range("trick", play.player)?;
        }
        if self.current_trick.len() >= count || self.last_trick.len() > count {
            return Err(SnapshotError::Inconsistent("trick holds too many plays"));
        }
        if self.phase == Phase::Assignment
            && (self.last_winner.is_none() || self.last_trick.len() != count)
        {
            return Err(SnapshotError::Inconsistent(
                "assignment phase without a completed trick",
            ));
        }

        self.validate_cards()?;

        let trump = self.rules.role_trump(self.trump);
        let expected = self
            .job_buckets
            .map(|cards| cards.iter().map(|card| card.work_hours(trump)).sum::<u32>());
        for suit in Suit::ALL {
            if expected[suit] != self.work_hours[suit] {
                return Err(SnapshotError::WorkHoursMismatch {
                    suit,
                    recorded: self.work_hours[suit],
                    expected: expected[suit],
                });
            }
        }
        Ok(())
    }

    /// Worker cards must each sit in exactly one place and all 32 must be
    /// present. Job cards may only sit in the job piles, on the board, in a
    /// plot or in exile, and never twice.
    fn validate_cards(&self) -> Result<(), SnapshotError> {
        let mut workers = HashSet::with_capacity(WORKER_DECK_SIZE);
        let mut jobs = HashSet::new();
        let mut place = |location: &'static str, card: Card, holds_jobs: bool| {
            let fresh = if card.is_worker() {
                workers.insert(card)
            } else if holds_jobs {
                jobs.insert(card)
            } else {
                return Err(SnapshotError::MisplacedCard { location, card });
            };
            if fresh {
                Ok(())
            } else {
                Err(SnapshotError::DuplicateCard(card))
            }
        };

        for player in &self.players {
            for &card in &player.hand {
                place("a hand", card, false)?;
            }
            for &card in player.hidden.iter().chain(&player.revealed) {
                place("a plot", card, true)?;
            }
        }
        for &card in &self.exiled {
            place("exile", card, true)?;
        }
        for (_, bucket) in self.job_buckets.iter() {
            for &card in bucket {
                place("a job bucket", card, false)?;
            }
        }
        for &card in &self.workers_deck {
            place("the workers deck", card, false)?;
        }
        for play in self.current_trick.iter().chain(&self.last_trick) {
            place("a trick", play.card, false)?;
        }
        let job_cards = self
            .job_piles
            .iter()
            .flat_map(|(_, pile)| pile.iter().copied())
            .chain(self.revealed_jobs.iter().filter_map(|(_, job)| *job));
        for card in job_cards {
            if card.is_worker() {
                return Err(SnapshotError::MisplacedCard {
                    location: "the job piles",
                    card,
                });
            }
            place("the job piles", card, true)?;
        }

        let missing = WORKER_DECK_SIZE.saturating_sub(workers.len());
        if missing > 0 {
            return Err(SnapshotError::MissingCards(missing));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{GameSnapshot, SnapshotError};
    use crate::game::rules::GameOptions;
    use crate::game::state::GameState;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fresh(seed: u64) -> GameState {
        let mut rng = StdRng::seed_from_u64(seed);
        GameState::with_options(GameOptions::new(3), &mut rng).unwrap()
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let state = fresh(99);
        let json = GameSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"year\": 1"));
        assert!(json.contains("\"phase\": \"planning\""));
        assert!(json.contains("\"requisition_scope\": \"completed_jobs\""));
    }

    #[test]
    fn snapshot_roundtrip_restores_state() {
        let state = fresh(123);
        let json = GameSnapshot::to_json(&state).unwrap();
        let restored = GameSnapshot::load(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn duplicate_cards_are_rejected() {
        let mut snapshot = GameSnapshot::capture(&fresh(5));
        let copy = snapshot.players[0].hand[0];
        snapshot.workers_deck.push(copy);
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::DuplicateCard(card)) if card == copy
        ));
    }

    #[test]
    fn lost_cards_are_rejected() {
        let mut snapshot = GameSnapshot::capture(&fresh(6));
        snapshot.workers_deck.pop();
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::MissingCards(1))
        ));
    }

    #[test]
    fn work_hours_must_match_buckets() {
        let mut snapshot = GameSnapshot::capture(&fresh(8));
        snapshot.work_hours.spades = 9;
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::WorkHoursMismatch {
                suit: Suit::Spades,
                recorded: 9,
                expected: 0,
            })
        ));
    }

    #[test]
    fn hour_check_follows_nomenclature() {
        let mut snapshot = GameSnapshot::capture(&fresh(16));
        let jack = Card::new(Rank::Jack, Suit::Hearts);
        for player in &mut snapshot.players {
            player.hand.retain(|&card| card != jack);
        }
        snapshot.workers_deck.retain(|&card| card != jack);
        snapshot.trump = Some(Suit::Hearts);
        snapshot.job_buckets.hearts.push(jack);
        snapshot.work_hours.hearts = 11;
        assert!(matches!(
            snapshot.clone().restore(),
            Err(SnapshotError::WorkHoursMismatch {
                suit: Suit::Hearts,
                recorded: 11,
                expected: 0,
            })
        ));

        snapshot.rules.nomenclature = false;
        let state = snapshot.restore().unwrap();
        assert_eq!(state.work_hours()[Suit::Hearts], 11);
    }

    #[test]
    fn job_cards_stay_out_of_hands() {
        let mut snapshot = GameSnapshot::capture(&fresh(9));
        snapshot.players[1].hand.push(Card::new(Rank::Three, Suit::Clubs));
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::MisplacedCard { .. })
        ));
    }

    #[test]
    fn exiled_job_cards_survive_a_roundtrip() {
        let mut snapshot = GameSnapshot::capture(&fresh(14));
        let job = snapshot.revealed_jobs.hearts.take().unwrap();
        snapshot.exiled.insert(job);
        let state = snapshot.clone().restore().unwrap();
        assert!(state.exiled().contains(&job));

        let json = GameSnapshot::to_json(&state).unwrap();
        assert_eq!(GameSnapshot::load(&json).unwrap(), state);
        assert_eq!(GameSnapshot::capture(&state), snapshot);
    }

    #[test]
    fn job_cards_cannot_be_in_two_places() {
        let mut snapshot = GameSnapshot::capture(&fresh(15));
        let job = snapshot.revealed_jobs.diamonds.unwrap();
        snapshot.players[2].revealed.push(job);
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::DuplicateCard(card)) if card == job
        ));
    }

    #[test]
    fn bad_json_reports_decode_error() {
        assert!(matches!(
            GameSnapshot::load("{\"year\": 1"),
            Err(SnapshotError::Json(_))
        ));
    }
}
