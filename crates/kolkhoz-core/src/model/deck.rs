use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use crate::model::suit_map::SuitMap;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of cards in the worker domain (4 suits x ranks 6..=13).
pub const WORKER_DECK_SIZE: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn workers() -> Self {
        let mut cards = Vec::with_capacity(WORKER_DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::WORKER.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// The worker domain minus every card in `excluded`, in suit/rank order.
    pub fn workers_excluding<'a, I>(excluded: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let used: HashSet<Card> = excluded.into_iter().copied().collect();
        let mut deck = Self::workers();
        deck.cards.retain(|card| !used.contains(card));
        deck
    }

    pub fn shuffled_excluding<'a, I, R>(excluded: I, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
        R: rand::Rng + ?Sized,
    {
        let mut deck = Self::workers_excluding(excluded);
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Takes the top card; the top of the deck is the end of the slice.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Per-suit stacks of job cards, one revealed per year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPiles {
    piles: SuitMap<Vec<Card>>,
}

impl JobPiles {
    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let piles = SuitMap::from_fn(|suit| {
            let mut pile: Vec<Card> = Rank::JOB.iter().map(|&rank| Card::new(rank, suit)).collect();
            pile.shuffle(rng);
            pile
        });
        Self { piles }
    }

    pub fn from_piles(piles: SuitMap<Vec<Card>>) -> Self {
        Self { piles }
    }

    /// Pops the top job card of every pile.
    pub fn reveal(&mut self) -> SuitMap<Option<Card>> {
        SuitMap::from_fn(|suit| self.piles[suit].pop())
    }

    pub fn pile(&self, suit: Suit) -> &[Card] {
        &self.piles[suit]
    }

    pub fn piles(&self) -> &SuitMap<Vec<Card>> {
        &self.piles
    }
}

#[cfg(test)]
mod tests {
    use super::{Deck, JobPiles, WORKER_DECK_SIZE};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn worker_deck_has_32_unique_cards() {
        let deck = Deck::workers();
        assert_eq!(deck.len(), WORKER_DECK_SIZE);
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), WORKER_DECK_SIZE);
        assert!(deck.cards().iter().all(|card| card.is_worker()));
    }

    #[test]
    fn excluded_cards_never_reach_the_deck() {
        let excluded = [
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::Six, Suit::Spades),
        ];
        let mut rng = StdRng::seed_from_u64(5);
        let deck = Deck::shuffled_excluding(excluded.iter(), &mut rng);
        assert_eq!(deck.len(), WORKER_DECK_SIZE - 2);
        assert!(excluded.iter().all(|card| !deck.cards().contains(card)));
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let deck_a = Deck::shuffled_excluding(std::iter::empty(), &mut rng_a);
        let deck_b = Deck::shuffled_excluding(std::iter::empty(), &mut rng_b);
        assert_eq!(deck_a, deck_b);
        assert_ne!(deck_a, Deck::workers());
    }

    #[test]
    fn job_piles_hold_one_card_per_year() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut piles = JobPiles::shuffled(&mut rng);
        for suit in Suit::ALL {
            let pile = piles.pile(suit);
            assert_eq!(pile.len(), Rank::JOB.len());
            assert!(pile.iter().all(|card| card.suit == suit && card.rank.is_job()));
        }

        let revealed = piles.reveal();
        for (suit, card) in revealed.iter() {
            let card = card.expect("pile not empty");
            assert_eq!(card.suit, suit);
            assert_eq!(piles.pile(suit).len(), Rank::JOB.len() - 1);
        }
    }
}
