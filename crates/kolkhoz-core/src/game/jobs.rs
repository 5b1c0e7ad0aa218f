use crate::game::rules::THRESHOLD;
use crate::model::card::Card;
use crate::model::deck::JobPiles;
use crate::model::suit::Suit;
use crate::model::suit_map::SuitMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Year-scoped job progress: face-up job cards, claims, buckets and hours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBoard {
    revealed: SuitMap<Option<Card>>,
    claimed: BTreeSet<Suit>,
    work_hours: SuitMap<u32>,
    buckets: SuitMap<Vec<Card>>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a board from stored parts. Hours are taken as given.
    pub fn from_parts(
        revealed: SuitMap<Option<Card>>,
        claimed: BTreeSet<Suit>,
        work_hours: SuitMap<u32>,
        buckets: SuitMap<Vec<Card>>,
    ) -> Self {
        Self {
            revealed,
            claimed,
            work_hours,
            buckets,
        }
    }

    /// Clears the year's progress and flips the next job card of every pile.
    pub fn reset_for_year(&mut self, piles: &mut JobPiles) {
        self.claimed.clear();
        self.work_hours = SuitMap::default();
        self.buckets = SuitMap::default();
        self.revealed = piles.reveal();
        debug!(target: "kolkhoz_core::jobs", revealed = ?self.revealed, "revealed jobs");
    }

    /// Puts `card` to work on `suit`. The trump drunkard adds no hours.
    pub fn record(&mut self, card: Card, suit: Suit, trump: Option<Suit>) {
        self.buckets[suit].push(card);
        self.work_hours[suit] += card.work_hours(trump);
    }

    /// Claims every unclaimed job at or over the threshold, in suit order.
    /// With `rewards` the face-up job card leaves the board and is returned
    /// next to its suit; without it the card stays where it is.
    pub fn claim_completed(&mut self, rewards: bool) -> Vec<(Suit, Option<Card>)> {
        let mut claimed = Vec::new();
        for suit in Suit::ALL {
            if self.claimed.contains(&suit) || self.work_hours[suit] < THRESHOLD {
                continue;
            }
            self.claimed.insert(suit);
            let reward = if rewards {
                self.revealed[suit].take()
            } else {
                None
            };
            claimed.push((suit, reward));
        }
        claimed
    }

    pub(crate) fn remove_from_bucket(&mut self, suit: Suit, card: Card) -> bool {
        let bucket = &mut self.buckets[suit];
        match bucket.iter().position(|&c| c == card) {
            Some(index) => {
                bucket.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn revealed(&self) -> &SuitMap<Option<Card>> {
        &self.revealed
    }

    pub fn claimed(&self) -> &BTreeSet<Suit> {
        &self.claimed
    }

    pub fn is_claimed(&self, suit: Suit) -> bool {
        self.claimed.contains(&suit)
    }

    pub fn work_hours(&self) -> &SuitMap<u32> {
        &self.work_hours
    }

    pub fn hours(&self, suit: Suit) -> u32 {
        self.work_hours[suit]
    }

    pub fn buckets(&self) -> &SuitMap<Vec<Card>> {
        &self.buckets
    }

    pub fn bucket(&self, suit: Suit) -> &[Card] {
        &self.buckets[suit]
    }

    /// Hours implied by the bucket contents under `trump`.
    pub fn recomputed_hours(&self, trump: Option<Suit>) -> SuitMap<u32> {
        self.buckets
            .map(|cards| cards.iter().map(|card| card.work_hours(trump)).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::JobBoard;
    use crate::model::card::Card;
    use crate::model::deck::JobPiles;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use crate::model::suit_map::SuitMap;

    fn piles() -> JobPiles {
        JobPiles::from_piles(SuitMap::from_fn(|suit| {
            vec![Card::new(Rank::Two, suit), Card::new(Rank::Four, suit)]
        }))
    }

    #[test]
    fn reset_reveals_top_of_each_pile() {
        let mut piles = piles();
        let mut board = JobBoard::new();
        board.reset_for_year(&mut piles);
        for suit in Suit::ALL {
            assert_eq!(board.revealed()[suit], Some(Card::new(Rank::Four, suit)));
            assert_eq!(piles.pile(suit).len(), 1);
        }
    }

    #[test]
    fn drunkard_adds_no_hours() {
        let mut board = JobBoard::new();
        let trump = Some(Suit::Clubs);
        board.record(Card::new(Rank::Jack, Suit::Clubs), Suit::Hearts, trump);
        board.record(Card::new(Rank::Jack, Suit::Hearts), Suit::Hearts, trump);
        assert_eq!(board.hours(Suit::Hearts), 11);
        assert_eq!(board.bucket(Suit::Hearts).len(), 2);
        assert_eq!(board.recomputed_hours(trump), *board.work_hours());
    }

    #[test]
    fn claims_happen_once_per_suit() {
        let mut piles = piles();
        let mut board = JobBoard::new();
        board.reset_for_year(&mut piles);
        for rank in [Rank::Ten, Rank::Ten, Rank::Ten, Rank::Ten] {
            board.record(Card::new(rank, Suit::Diamonds), Suit::Diamonds, None);
        }
        let first = board.claim_completed(true);
        assert_eq!(first, vec![(Suit::Diamonds, Some(Card::new(Rank::Four, Suit::Diamonds)))]);
        assert_eq!(board.revealed()[Suit::Diamonds], None);

        board.record(Card::new(Rank::Six, Suit::Diamonds), Suit::Diamonds, None);
        assert!(board.claim_completed(true).is_empty());
        assert!(board.is_claimed(Suit::Diamonds));
    }

    #[test]
    fn claims_without_rewards_leave_the_job_face_up() {
        let mut piles = piles();
        let mut board = JobBoard::new();
        board.reset_for_year(&mut piles);
        for _ in 0..4 {
            board.record(Card::new(Rank::Ten, Suit::Clubs), Suit::Clubs, None);
        }
        assert_eq!(board.claim_completed(false), vec![(Suit::Clubs, None)]);
        assert!(board.is_claimed(Suit::Clubs));
        assert_eq!(
            board.revealed()[Suit::Clubs],
            Some(Card::new(Rank::Four, Suit::Clubs))
        );
    }

    #[test]
    fn reset_clears_year_progress() {
        let mut piles = piles();
        let mut board = JobBoard::new();
        board.reset_for_year(&mut piles);
        board.record(Card::new(Rank::King, Suit::Spades), Suit::Spades, None);
        board.reset_for_year(&mut piles);
        assert_eq!(board.hours(Suit::Spades), 0);
        assert!(board.bucket(Suit::Spades).is_empty());
        assert!(board.claimed().is_empty());
    }
}
