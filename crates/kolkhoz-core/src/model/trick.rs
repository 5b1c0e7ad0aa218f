use crate::model::card::Card;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trick {
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub player: usize,
    pub card: Card,
}

impl Trick {
    pub fn new() -> Self {
        Self { plays: Vec::new() }
    }

    pub fn from_plays(plays: Vec<Play>) -> Self {
        Self { plays }
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn leader(&self) -> Option<usize> {
        self.plays.first().map(|play| play.player)
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }

    pub fn contains(&self, card: Card) -> bool {
        self.plays.iter().any(|play| play.card == card)
    }

    pub fn has_played(&self, player: usize) -> bool {
        self.plays.iter().any(|play| play.player == player)
    }

    pub(crate) fn push(&mut self, player: usize, card: Card) {
        self.plays.push(Play { player, card });
    }

    pub(crate) fn clear(&mut self) {
        self.plays.clear();
    }

    /// Highest trump if any trump was played, otherwise highest card of the lead suit.
    pub fn winner(&self, trump: Option<Suit>) -> Option<Play> {
        let lead_suit = self.lead_suit()?;
        let contested = match trump {
            Some(trump) if self.plays.iter().any(|play| play.card.suit == trump) => trump,
            _ => lead_suit,
        };
        self.plays
            .iter()
            .filter(|play| play.card.suit == contested)
            .max_by_key(|play| play.card.rank)
            .copied()
    }
}
