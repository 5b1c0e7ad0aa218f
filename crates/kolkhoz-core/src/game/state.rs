use crate::game::assignment::Assignment;
use crate::game::decision::{DecisionContext, DecisionMaker};
use crate::game::error::GameError;
use crate::game::history::{Event, History};
use crate::game::jobs::JobBoard;
use crate::game::requisition;
use crate::game::rules::{GameOptions, HAND_SIZE, MAX_PLAYERS, MAX_YEARS, MIN_PLAYERS, RuleSet};
use crate::model::card::Card;
use crate::model::deck::{Deck, JobPiles};
use crate::model::player::{Player, SeatKind};
use crate::model::suit::Suit;
use crate::model::suit_map::SuitMap;
use crate::model::trick::Trick;
use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Trick,
    Assignment,
    Requisition,
    GameOver,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Planning => "planning",
            Phase::Trick => "trick",
            Phase::Assignment => "assignment",
            Phase::Requisition => "requisition",
            Phase::GameOver => "game_over",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted {
        winner: usize,
        card: Card,
        /// `None` while a human winner still has to assign the trick.
        assignment: Option<AssignmentOutcome>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    /// Jobs claimed by this assignment, in suit order.
    pub claimed: Vec<Suit>,
    /// The year's last trick was assigned and requisition has run.
    pub year_complete: bool,
}

/// Authoritative game aggregate. All mutation goes through its operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) rules: RuleSet,
    pub(crate) players: Vec<Player>,
    pub(crate) lead: usize,
    pub(crate) year: u32,
    pub(crate) trump: Option<Suit>,
    pub(crate) job_piles: JobPiles,
    pub(crate) jobs: JobBoard,
    pub(crate) current_trick: Trick,
    pub(crate) last_trick: Trick,
    pub(crate) last_winner: Option<usize>,
    pub(crate) history: History,
    pub(crate) exiled: BTreeSet<Card>,
    pub(crate) phase: Phase,
    pub(crate) trick_count: u32,
    pub(crate) workers_deck: Deck,
}

impl GameState {
    /// New game with a human at seat 0 and the default rules.
    pub fn new<R: Rng + ?Sized>(num_players: usize, rng: &mut R) -> Result<Self, GameError> {
        Self::with_options(GameOptions::new(num_players), rng)
    }

    pub fn with_options<R: Rng + ?Sized>(
        options: GameOptions,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let count = options.num_players;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::InvalidPlayerCount(count));
        }
        if let Some(seat) = options.human_seat.filter(|&seat| seat >= count) {
            return Err(GameError::InvalidPlayer(seat));
        }

        let players = (0..count)
            .map(|index| {
                let kind = if options.human_seat == Some(index) {
                    SeatKind::Human
                } else {
                    SeatKind::Ai
                };
                Player::new(index, kind)
            })
            .collect();
        let lead = rng.gen_range(0..count);
        let mut job_piles = JobPiles::shuffled(rng);
        let mut jobs = JobBoard::new();
        jobs.reset_for_year(&mut job_piles);

        let mut state = Self {
            rules: options.rules,
            players,
            lead,
            year: 1,
            trump: None,
            job_piles,
            jobs,
            current_trick: Trick::new(),
            last_trick: Trick::new(),
            last_winner: None,
            history: History::new(),
            exiled: BTreeSet::new(),
            phase: Phase::Planning,
            trick_count: 0,
            workers_deck: Deck::default(),
        };
        state.prepare_workers_deck(rng);
        state.deal_hands();
        info!(
            target: "kolkhoz_core::state",
            players = count,
            lead,
            scope = %state.rules.requisition_scope,
            "new game"
        );
        Ok(state)
    }

    /// Fixes the trump for the coming year, or draws one uniformly when
    /// `suit` is `None`. Only allowed while planning.
    pub fn set_trump<R: Rng + ?Sized>(
        &mut self,
        suit: Option<Suit>,
        rng: &mut R,
    ) -> Result<Suit, GameError> {
        self.ensure_phase(Phase::Planning)?;
        let trump = suit.unwrap_or_else(|| random_suit(rng));
        self.trump = Some(trump);
        debug!(target: "kolkhoz_core::state", year = self.year, %trump, "trump set");
        Ok(trump)
    }

    /// Leaves planning and opens the first trick of the year. A trump is
    /// drawn if none was set.
    pub fn begin_year<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.ensure_phase(Phase::Planning)?;
        if self.trump.is_none() {
            self.trump = Some(random_suit(rng));
        }
        self.phase = Phase::Trick;
        info!(
            target: "kolkhoz_core::state",
            year = self.year,
            trump = ?self.trump,
            lead = self.lead,
            "year started"
        );
        Ok(())
    }

    pub fn play_card(
        &mut self,
        player: usize,
        hand_index: usize,
        decider: &mut dyn DecisionMaker,
    ) -> Result<PlayOutcome, GameError> {
        self.ensure_phase(Phase::Trick)?;
        if player >= self.players.len() {
            return Err(GameError::InvalidPlayer(player));
        }
        let expected = self.next_to_play();
        if player != expected {
            return Err(GameError::OutOfTurn {
                expected,
                actual: player,
            });
        }
        let hand = &mut self.players[player].hand;
        let len = hand.len();
        let Some(card) = hand.remove_at(hand_index) else {
            return Err(GameError::HandIndexOutOfRange {
                player,
                index: hand_index,
                len,
            });
        };

        self.current_trick.push(player, card);
        debug!(target: "kolkhoz_core::state", player, %card, "card played");

        if self.current_trick.len() < self.players.len() {
            return Ok(PlayOutcome::Played);
        }
        Ok(self.resolve_trick(decider))
    }

    /// Applies a human winner's assignment of the last trick.
    pub fn apply_assignments(
        &mut self,
        assignment: &Assignment,
    ) -> Result<AssignmentOutcome, GameError> {
        self.ensure_phase(Phase::Assignment)?;
        assignment.check_covers(&self.last_trick)?;
        let winner = self.last_winner.unwrap_or(self.lead);
        Ok(self.record_assignment(winner, assignment))
    }

    /// Closes the year. After the final year the game is over; otherwise
    /// the next year is set up and dealt.
    pub fn next_year<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.ensure_phase(Phase::Requisition)?;
        if self.year >= MAX_YEARS {
            self.phase = Phase::GameOver;
            info!(
                target: "kolkhoz_core::state",
                final_scores = ?self.final_scores(),
                "game over"
            );
            return Ok(());
        }

        self.year += 1;
        self.trick_count = 0;
        self.jobs.reset_for_year(&mut self.job_piles);
        for player in &mut self.players {
            player.reset_for_year();
        }
        self.current_trick.clear();
        self.last_trick.clear();
        self.last_winner = None;
        self.prepare_workers_deck(rng);
        self.deal_hands();
        self.lead = rng.gen_range(0..self.players.len());
        self.trump = Some(random_suit(rng));
        self.phase = Phase::Planning;
        info!(
            target: "kolkhoz_core::state",
            year = self.year,
            lead = self.lead,
            trump = ?self.trump,
            "new year"
        );
        Ok(())
    }

    fn ensure_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase.is_terminal() {
            return Err(GameError::GameOver);
        }
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn resolve_trick(&mut self, decider: &mut dyn DecisionMaker) -> PlayOutcome {
        let trick = std::mem::take(&mut self.current_trick);
        let Some(best) = trick.winner(self.trump) else {
            return PlayOutcome::Played;
        };
        let winner = best.player;
        self.last_trick = trick;
        self.last_winner = Some(winner);
        self.trick_count += 1;
        self.lead = winner;
        self.players[winner].brigade_leader = true;
        debug!(
            target: "kolkhoz_core::state",
            year = self.year,
            trick = self.trick_count,
            winner,
            card = %best.card,
            "trick resolved"
        );

        if self.players[winner].is_human() {
            self.phase = Phase::Assignment;
            return PlayOutcome::TrickCompleted {
                winner,
                card: best.card,
                assignment: None,
            };
        }

        let proposed = decider.choose_assignment(&DecisionContext::new(winner, self));
        let assignment = match proposed.check_covers(&self.last_trick) {
            Ok(()) if proposed.respects_trump_rule(self.trump) => proposed,
            Ok(()) => {
                warn!(
                    target: "kolkhoz_core::state",
                    winner,
                    "assignment moves a non-trump card, using own suits"
                );
                Assignment::own_suits(&self.last_trick)
            }
            Err(err) => {
                warn!(target: "kolkhoz_core::state", winner, %err, "using own suits");
                Assignment::own_suits(&self.last_trick)
            }
        };
        let outcome = self.record_assignment(winner, &assignment);
        PlayOutcome::TrickCompleted {
            winner,
            card: best.card,
            assignment: Some(outcome),
        }
    }

    fn record_assignment(&mut self, winner: usize, assignment: &Assignment) -> AssignmentOutcome {
        let roles = self.role_trump();
        for &(card, suit) in assignment.entries() {
            self.jobs.record(card, suit, roles);
        }

        let mut claimed = Vec::new();
        for (suit, job) in self.jobs.claim_completed(!self.rules.northern_style) {
            if let Some(job) = job {
                self.players[winner].plot.add_revealed(job);
            }
            debug!(
                target: "kolkhoz_core::jobs",
                %suit,
                winner,
                hours = self.jobs.hours(suit),
                "job claimed"
            );
            claimed.push(suit);
        }

        self.history.push(Event::Trick {
            year: self.year,
            plays: self.last_trick.plays().to_vec(),
            winner,
        });
        self.last_trick.clear();
        self.last_winner = None;
        self.phase = Phase::Trick;

        let year_complete = self.trick_count >= self.tricks_per_year();
        if year_complete {
            for player in &mut self.players {
                player.contribute_first_card();
            }
            self.run_requisition();
            self.phase = Phase::Requisition;
        }
        AssignmentOutcome {
            claimed,
            year_complete,
        }
    }

    fn run_requisition(&mut self) {
        self.history.push(Event::Jobs {
            year: self.year,
            work_hours: *self.jobs.work_hours(),
        });
        let hero = self.year_hero();
        let actions = requisition::perform(
            &mut self.jobs,
            &mut self.players,
            &mut self.exiled,
            self.trump,
            &self.rules,
            hero,
        );
        info!(
            target: "kolkhoz_core::requisition",
            year = self.year,
            actions = actions.len(),
            exiled = self.exiled.len(),
            "requisition finished"
        );
        self.history.push(Event::Requisition {
            year: self.year,
            actions,
        });
    }

    /// Seat that won every trick of the current year, if the rule is on.
    fn year_hero(&self) -> Option<usize> {
        if !self.rules.hero_of_soviet_union {
            return None;
        }
        let needed = self.tricks_per_year() as usize;
        (0..self.players.len()).find(|&seat| {
            self.history
                .for_year(self.year)
                .filter(|event| matches!(event, Event::Trick { winner, .. } if *winner == seat))
                .count()
                == needed
        })
    }

    fn prepare_workers_deck<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let excluded = self
            .players
            .iter()
            .flat_map(|player| player.plot.iter())
            .chain(self.exiled.iter());
        self.workers_deck = Deck::shuffled_excluding(excluded, rng);
    }

    fn deal_hands(&mut self) {
        for _ in 0..HAND_SIZE {
            for player in &mut self.players {
                if let Some(card) = self.workers_deck.draw() {
                    player.hand.add(card);
                }
            }
        }
        debug!(
            target: "kolkhoz_core::state",
            year = self.year,
            remaining = self.workers_deck.len(),
            "hands dealt"
        );
    }

    /// Revealed plot totals per seat.
    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(Player::score).collect()
    }

    /// Hidden plus revealed plot totals per seat.
    pub fn final_scores(&self) -> Vec<u32> {
        self.players.iter().map(Player::final_score).collect()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    /// Trump as seen by the face-card roles; `None` without nomenclature.
    pub fn role_trump(&self) -> Option<Suit> {
        self.rules.role_trump(self.trump)
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn lead(&self) -> usize {
        self.lead
    }

    pub fn trick_count(&self) -> u32 {
        self.trick_count
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn last_trick(&self) -> &Trick {
        &self.last_trick
    }

    pub fn last_winner(&self) -> Option<usize> {
        self.last_winner
    }

    pub fn trick_history(&self) -> &History {
        &self.history
    }

    pub fn jobs(&self) -> &JobBoard {
        &self.jobs
    }

    pub fn work_hours(&self) -> &SuitMap<u32> {
        self.jobs.work_hours()
    }

    pub fn job_buckets(&self) -> &SuitMap<Vec<Card>> {
        self.jobs.buckets()
    }

    pub fn revealed_jobs(&self) -> &SuitMap<Option<Card>> {
        self.jobs.revealed()
    }

    pub fn claimed_jobs(&self) -> &BTreeSet<Suit> {
        self.jobs.claimed()
    }

    pub fn exiled(&self) -> &BTreeSet<Card> {
        &self.exiled
    }

    pub fn job_piles(&self) -> &JobPiles {
        &self.job_piles
    }

    pub fn workers_deck(&self) -> &Deck {
        &self.workers_deck
    }

    pub fn next_to_play(&self) -> usize {
        (self.lead + self.current_trick.len()) % self.players.len()
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.current_trick.lead_suit()
    }

    /// Hand indices `player` may play: cards of the lead suit when held,
    /// otherwise the whole hand.
    pub fn legal_plays(&self, player: usize) -> Vec<usize> {
        let Some(seat) = self.players.get(player) else {
            return Vec::new();
        };
        let hand = seat.hand();
        let follow = self.lead_suit().filter(|&suit| hand.has_suit(suit));
        hand.iter()
            .enumerate()
            .filter(|(_, card)| follow.is_none_or(|suit| card.suit == suit))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn tricks_per_year(&self) -> u32 {
        self.rules.tricks_in_year(self.year)
    }

    pub fn is_final_year(&self) -> bool {
        self.year >= MAX_YEARS
    }
}

fn random_suit<R: Rng + ?Sized>(rng: &mut R) -> Suit {
    Suit::ALL[rng.gen_range(0..Suit::ALL.len())]
}
