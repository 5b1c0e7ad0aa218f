use kolkhoz_core::game::assignment::Assignment;
use kolkhoz_core::game::decision::{DecisionContext, DecisionMaker};
use kolkhoz_core::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Follows suit when it can, otherwise plays anything. Trump cards go to a
/// random job.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DecisionMaker for RandomPolicy {
    fn choose_play(&mut self, ctx: &DecisionContext) -> usize {
        ctx.legal_plays().choose(&mut self.rng).copied().unwrap_or(0)
    }

    fn choose_assignment(&mut self, ctx: &DecisionContext) -> Assignment {
        let trump = ctx.trump();
        ctx.won_trick()
            .cards()
            .map(|card| {
                let suit = if card.is_trump(trump) {
                    Suit::ALL.choose(&mut self.rng).copied().unwrap_or(card.suit)
                } else {
                    card.suit
                };
                (card, suit)
            })
            .collect()
    }
}
