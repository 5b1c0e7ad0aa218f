use crate::game::error::GameError;
use crate::model::card::Card;
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

/// Target job for every card of a won trick, in application order.
///
/// Table rule (checked by callers, not by the engine): a trump card may
/// work any job, every other card works the job of its own suit. Use
/// [`Assignment::respects_trump_rule`] to check a mapping before sending it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    entries: Vec<(Card, Suit)>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(mut self, card: Card, suit: Suit) -> Self {
        self.insert(card, suit);
        self
    }

    /// Sets the target for `card`, replacing an earlier target.
    pub fn insert(&mut self, card: Card, suit: Suit) {
        match self.entries.iter_mut().find(|(c, _)| *c == card) {
            Some(entry) => entry.1 = suit,
            None => self.entries.push((card, suit)),
        }
    }

    /// Every card to the job of its own suit.
    pub fn own_suits(trick: &Trick) -> Self {
        trick.cards().map(|card| (card, card.suit)).collect()
    }

    /// Every card to the same job.
    pub fn uniform(trick: &Trick, suit: Suit) -> Self {
        trick.cards().map(|card| (card, suit)).collect()
    }

    /// A trick of a single suit has only one sensible assignment.
    pub fn single_suit(trick: &Trick) -> Option<Self> {
        let suit = trick.lead_suit()?;
        trick
            .cards()
            .all(|card| card.suit == suit)
            .then(|| Self::uniform(trick, suit))
    }

    pub fn entries(&self) -> &[(Card, Suit)] {
        &self.entries
    }

    pub fn target(&self, card: Card) -> Option<Suit> {
        self.entries
            .iter()
            .find(|(c, _)| *c == card)
            .map(|(_, suit)| *suit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn respects_trump_rule(&self, trump: Option<Suit>) -> bool {
        self.entries
            .iter()
            .all(|(card, suit)| card.is_trump(trump) || card.suit == *suit)
    }

    /// Requires exactly one entry per card of `trick` and nothing else.
    pub fn check_covers(&self, trick: &Trick) -> Result<(), GameError> {
        if self.entries.len() != trick.len() {
            return Err(GameError::MalformedAssignment(format!(
                "expected {} cards but got {}",
                trick.len(),
                self.entries.len()
            )));
        }
        if let Some((card, _)) = self.entries.iter().find(|(card, _)| !trick.contains(*card)) {
            return Err(GameError::MalformedAssignment(format!(
                "{card} was not part of the trick"
            )));
        }
        if let Some(card) = trick.cards().find(|card| self.target(*card).is_none()) {
            return Err(GameError::MalformedAssignment(format!(
                "{card} has no assigned job"
            )));
        }
        Ok(())
    }
}

impl FromIterator<(Card, Suit)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (Card, Suit)>>(iter: I) -> Self {
        let mut assignment = Assignment::new();
        for (card, suit) in iter {
            assignment.insert(card, suit);
        }
        assignment
    }
}
