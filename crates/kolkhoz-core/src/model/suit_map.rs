use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One value per suit, all four always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuitMap<T> {
    pub hearts: T,
    pub diamonds: T,
    pub clubs: T,
    pub spades: T,
}

impl<T> SuitMap<T> {
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Suit) -> T,
    {
        Self {
            hearts: f(Suit::Hearts),
            diamonds: f(Suit::Diamonds),
            clubs: f(Suit::Clubs),
            spades: f(Suit::Spades),
        }
    }

    pub fn get(&self, suit: Suit) -> &T {
        match suit {
            Suit::Hearts => &self.hearts,
            Suit::Diamonds => &self.diamonds,
            Suit::Clubs => &self.clubs,
            Suit::Spades => &self.spades,
        }
    }

    pub fn get_mut(&mut self, suit: Suit) -> &mut T {
        match suit {
            Suit::Hearts => &mut self.hearts,
            Suit::Diamonds => &mut self.diamonds,
            Suit::Clubs => &mut self.clubs,
            Suit::Spades => &mut self.spades,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Suit, &T)> {
        Suit::ALL.into_iter().map(move |suit| (suit, self.get(suit)))
    }

    pub fn map<U, F>(&self, mut f: F) -> SuitMap<U>
    where
        F: FnMut(&T) -> U,
    {
        SuitMap::from_fn(|suit| f(self.get(suit)))
    }
}

impl<T> Index<Suit> for SuitMap<T> {
    type Output = T;

    fn index(&self, suit: Suit) -> &T {
        self.get(suit)
    }
}

impl<T> IndexMut<Suit> for SuitMap<T> {
    fn index_mut(&mut self, suit: Suit) -> &mut T {
        self.get_mut(suit)
    }
}
