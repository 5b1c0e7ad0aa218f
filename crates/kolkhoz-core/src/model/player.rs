use crate::model::hand::Hand;
use crate::model::plot::Plot;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Who makes decisions for a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatKind {
    Human,
    Ai,
}

impl SeatKind {
    pub const fn is_human(self) -> bool {
        matches!(self, SeatKind::Human)
    }
}

impl fmt::Display for SeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeatKind::Human => "human",
            SeatKind::Ai => "ai",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) index: usize,
    pub(crate) kind: SeatKind,
    pub(crate) hand: Hand,
    pub(crate) plot: Plot,
    pub(crate) brigade_leader: bool,
}

impl Player {
    pub fn new(index: usize, kind: SeatKind) -> Self {
        Self {
            index,
            kind,
            hand: Hand::new(),
            plot: Plot::new(),
            brigade_leader: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> SeatKind {
        self.kind
    }

    pub fn is_human(&self) -> bool {
        self.kind.is_human()
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn plot(&self) -> &Plot {
        &self.plot
    }

    /// Set once the player wins a trick; cleared at the start of each year.
    pub fn is_brigade_leader(&self) -> bool {
        self.brigade_leader
    }

    /// Sum of revealed plot ranks.
    pub fn score(&self) -> u32 {
        self.plot.revealed_value()
    }

    /// Sum of hidden and revealed plot ranks.
    pub fn final_score(&self) -> u32 {
        self.plot.revealed_value() + self.plot.hidden_value()
    }

    /// Moves the first hand card into the hidden plot.
    pub(crate) fn contribute_first_card(&mut self) -> Option<crate::model::card::Card> {
        let card = self.hand.remove_at(0)?;
        self.plot.hide(card);
        Some(card)
    }

    pub(crate) fn reset_for_year(&mut self) {
        self.hand.clear();
        self.brigade_leader = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{Player, SeatKind};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn contribution_moves_first_card_to_hidden_plot() {
        let mut player = Player::new(2, SeatKind::Ai);
        player.hand.add(Card::new(Rank::Ten, Suit::Clubs));
        player.hand.add(Card::new(Rank::Six, Suit::Hearts));

        assert_eq!(
            player.contribute_first_card(),
            Some(Card::new(Rank::Ten, Suit::Clubs))
        );
        assert_eq!(player.plot().hidden(), &[Card::new(Rank::Ten, Suit::Clubs)]);
        assert_eq!(player.hand().len(), 1);
        assert_eq!(player.score(), 0);
        assert_eq!(player.final_score(), 10);
    }

    #[test]
    fn contribution_from_empty_hand_is_a_no_op() {
        let mut player = Player::new(0, SeatKind::Human);
        assert_eq!(player.contribute_first_card(), None);
        assert!(player.plot().hidden().is_empty());
    }

    #[test]
    fn year_reset_clears_hand_and_flag_but_keeps_plot() {
        let mut player = Player::new(1, SeatKind::Ai);
        player.hand.add(Card::new(Rank::Eight, Suit::Spades));
        player.plot.add_revealed(Card::new(Rank::Three, Suit::Spades));
        player.brigade_leader = true;

        player.reset_for_year();
        assert!(player.hand().is_empty());
        assert!(!player.is_brigade_leader());
        assert_eq!(player.score(), 3);
    }
}
