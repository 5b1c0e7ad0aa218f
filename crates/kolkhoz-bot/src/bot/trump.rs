use super::{BotParams, plot_risk};
use kolkhoz_core::game::decision::DecisionContext;
use kolkhoz_core::model::rank::Rank;
use kolkhoz_core::model::suit::Suit;
use rand::Rng;

/// Picks a trump from the seat's hand: long suits and court cards are
/// wanted, suits already sitting in the plot are not.
pub struct TrumpPlanner;

impl TrumpPlanner {
    pub fn choose<R: Rng + ?Sized>(
        ctx: &DecisionContext<'_>,
        params: &BotParams,
        rng: &mut R,
    ) -> Suit {
        let mut best = (Suit::Hearts, f32::MIN);
        for suit in Suit::ALL {
            let mut score = Self::score(ctx, suit, params);
            if params.trump_jitter > 0.0 {
                score += rng.gen_range(0.0..params.trump_jitter);
            }
            if score > best.1 {
                best = (suit, score);
            }
        }
        best.0
    }

    pub fn score(ctx: &DecisionContext<'_>, suit: Suit, params: &BotParams) -> f32 {
        let hand = ctx.hand();
        let length = hand.iter().filter(|card| card.suit == suit).count();
        let court = hand
            .iter()
            .filter(|card| card.suit == suit && card.rank >= Rank::DRUNKARD)
            .count();
        let hours = ctx.state.work_hours()[suit];
        let mut score =
            court as f32 * params.trump_high_card_weight + length as f32 * params.trump_length_weight;
        if (20..40).contains(&hours) {
            score += 10.0;
        }
        if let Some(player) = ctx.state.player(ctx.seat) {
            score -= plot_risk(player, suit) as f32 * params.trump_plot_risk_penalty;
        }
        score
    }
}
