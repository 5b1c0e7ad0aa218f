use crate::model::card::Card;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

/// A player's private plot: hidden cards are unscored until revealed,
/// revealed cards score and are exposed to requisition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    hidden: Vec<Card>,
    revealed: Vec<Card>,
}

impl Plot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(hidden: Vec<Card>, revealed: Vec<Card>) -> Self {
        Self { hidden, revealed }
    }

    pub fn hidden(&self) -> &[Card] {
        &self.hidden
    }

    pub fn revealed(&self) -> &[Card] {
        &self.revealed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.hidden.iter().chain(self.revealed.iter())
    }

    pub fn contains(&self, card: Card) -> bool {
        self.hidden.contains(&card) || self.revealed.contains(&card)
    }

    pub fn count_suit(&self, suit: Suit) -> usize {
        self.iter().filter(|card| card.suit == suit).count()
    }

    pub fn hide(&mut self, card: Card) {
        self.hidden.push(card);
    }

    pub fn add_revealed(&mut self, card: Card) {
        self.revealed.push(card);
    }

    /// Moves every hidden card of `suit` to the revealed side, keeping order.
    pub fn reveal_suit(&mut self, suit: Suit) -> usize {
        let (moving, staying): (Vec<Card>, Vec<Card>) =
            self.hidden.iter().copied().partition(|card| card.suit == suit);
        let moved = moving.len();
        self.hidden = staying;
        self.revealed.extend(moving);
        moved
    }

    /// Revealed cards of `suit`, highest rank first.
    pub fn revealed_of_suit_desc(&self, suit: Suit) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .revealed
            .iter()
            .copied()
            .filter(|card| card.suit == suit)
            .collect();
        cards.sort_by(|a, b| b.rank.cmp(&a.rank));
        cards
    }

    pub fn remove_revealed(&mut self, card: Card) -> bool {
        if let Some(index) = self.revealed.iter().position(|&c| c == card) {
            self.revealed.remove(index);
            true
        } else {
            false
        }
    }

    pub fn revealed_value(&self) -> u32 {
        self.revealed.iter().map(|card| u32::from(card.value())).sum()
    }

    pub fn hidden_value(&self) -> u32 {
        self.hidden.iter().map(|card| u32::from(card.value())).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::Plot;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn reveal_suit_moves_only_matching_cards_in_order() {
        let mut plot = Plot::from_parts(
            vec![
                Card::new(Rank::Seven, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Clubs),
                Card::new(Rank::King, Suit::Hearts),
            ],
            vec![Card::new(Rank::Two, Suit::Hearts)],
        );

        assert_eq!(plot.reveal_suit(Suit::Hearts), 2);
        assert_eq!(plot.hidden(), &[Card::new(Rank::Nine, Suit::Clubs)]);
        assert_eq!(
            plot.revealed(),
            &[
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::Seven, Suit::Hearts),
                Card::new(Rank::King, Suit::Hearts),
            ]
        );
    }

    #[test]
    fn revealed_of_suit_sorts_descending() {
        let plot = Plot::from_parts(
            Vec::new(),
            vec![
                Card::new(Rank::Eight, Suit::Spades),
                Card::new(Rank::Queen, Suit::Spades),
                Card::new(Rank::Ten, Suit::Diamonds),
            ],
        );
        assert_eq!(
            plot.revealed_of_suit_desc(Suit::Spades),
            vec![
                Card::new(Rank::Queen, Suit::Spades),
                Card::new(Rank::Eight, Suit::Spades),
            ]
        );
        assert!(plot.revealed_of_suit_desc(Suit::Clubs).is_empty());
    }

    #[test]
    fn values_split_by_visibility() {
        let mut plot = Plot::new();
        plot.hide(Card::new(Rank::Six, Suit::Clubs));
        plot.add_revealed(Card::new(Rank::Three, Suit::Clubs));
        assert_eq!(plot.hidden_value(), 6);
        assert_eq!(plot.revealed_value(), 3);
        assert!(plot.remove_revealed(Card::new(Rank::Three, Suit::Clubs)));
        assert!(!plot.remove_revealed(Card::new(Rank::Three, Suit::Clubs)));
        assert_eq!(plot.revealed_value(), 0);
    }
}
