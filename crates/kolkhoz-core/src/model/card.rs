use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    pub const fn value(self) -> u8 {
        self.rank.value()
    }

    pub const fn is_worker(self) -> bool {
        self.rank.is_worker()
    }

    pub fn is_trump(self, trump: Option<Suit>) -> bool {
        trump == Some(self.suit)
    }

    pub fn is_drunkard(self, trump: Option<Suit>) -> bool {
        self.rank == Rank::DRUNKARD && self.is_trump(trump)
    }

    pub fn is_informant(self, trump: Option<Suit>) -> bool {
        self.rank == Rank::INFORMANT && self.is_trump(trump)
    }

    pub fn is_party_official(self, trump: Option<Suit>) -> bool {
        self.rank == Rank::PARTY_OFFICIAL && self.is_trump(trump)
    }

    /// Labor hours this card adds to the job it is assigned to.
    pub fn work_hours(self, trump: Option<Suit>) -> u32 {
        if self.is_drunkard(trump) {
            0
        } else {
            u32::from(self.value())
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn trump_jack_is_drunkard_and_idle() {
        let card = Card::new(Rank::Jack, Suit::Clubs);
        assert!(card.is_drunkard(Some(Suit::Clubs)));
        assert_eq!(card.work_hours(Some(Suit::Clubs)), 0);
        assert!(!card.is_drunkard(Some(Suit::Hearts)));
        assert_eq!(card.work_hours(Some(Suit::Hearts)), 11);
    }

    #[test]
    fn special_roles_require_trump() {
        let queen = Card::new(Rank::Queen, Suit::Spades);
        let king = Card::new(Rank::King, Suit::Spades);
        assert!(queen.is_informant(Some(Suit::Spades)));
        assert!(!queen.is_informant(None));
        assert!(king.is_party_official(Some(Suit::Spades)));
        assert!(!king.is_party_official(Some(Suit::Diamonds)));
    }

    #[test]
    fn display_combines_rank_and_suit() {
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).to_string(), "10H");
        assert_eq!(Card::new(Rank::Ace, Suit::Diamonds).to_string(), "AD");
    }
}
