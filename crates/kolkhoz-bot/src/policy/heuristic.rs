use crate::bot::{AssignPlanner, BotParams, PlayPlanner, TrumpPlanner};
use kolkhoz_core::game::assignment::Assignment;
use kolkhoz_core::game::decision::{DecisionContext, DecisionMaker};
use kolkhoz_core::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

/// Adapter that drives the planners through [`DecisionMaker`].
pub struct HeuristicPolicy {
    params: BotParams,
    rng: StdRng,
}

impl HeuristicPolicy {
    pub fn new(seed: u64) -> Self {
        Self::with_params(BotParams::default(), seed)
    }

    pub fn with_params(params: BotParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn choose_trump(&mut self, ctx: &DecisionContext) -> Suit {
        let suit = TrumpPlanner::choose(ctx, &self.params, &mut self.rng);
        event!(
            target: "kolkhoz_bot::trump",
            Level::DEBUG,
            seat = ctx.seat,
            trump = %suit,
        );
        suit
    }
}

impl DecisionMaker for HeuristicPolicy {
    fn choose_play(&mut self, ctx: &DecisionContext) -> usize {
        let legal = ctx.legal_plays();
        let chosen = PlayPlanner::choose(ctx, &self.params, &mut self.rng)
            .or_else(|| legal.first().copied())
            .unwrap_or(0);
        if tracing::enabled!(Level::DEBUG) {
            let card = ctx
                .hand()
                .get(chosen)
                .map(|card| card.to_string())
                .unwrap_or_default();
            event!(
                target: "kolkhoz_bot::play",
                Level::DEBUG,
                seat = ctx.seat,
                legal_count = legal.len(),
                trick_cards = ctx.current_trick().len(),
                chosen = %card,
            );
        }
        chosen
    }

    fn choose_assignment(&mut self, ctx: &DecisionContext) -> Assignment {
        AssignPlanner::choose(ctx, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::HeuristicPolicy;
    use kolkhoz_core::game::decision::{DecisionContext, DecisionMaker};
    use kolkhoz_core::game::rules::GameOptions;
    use kolkhoz_core::game::state::GameState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn chooses_a_legal_card() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut state = GameState::with_options(GameOptions::all_ai(4), &mut rng).unwrap();
        state.begin_year(&mut rng).unwrap();
        let mut policy = HeuristicPolicy::new(3);
        for _ in 0..4 {
            let seat = state.next_to_play();
            let index = policy.choose_play(&DecisionContext::new(seat, &state));
            assert!(state.legal_plays(seat).contains(&index));
            state.play_card(seat, index, &mut policy).unwrap();
        }
        assert_eq!(state.trick_count(), 1);
    }

    #[test]
    fn trump_choice_is_seeded() {
        let mut rng = StdRng::seed_from_u64(2);
        let state = GameState::with_options(GameOptions::all_ai(3), &mut rng).unwrap();
        let ctx = DecisionContext::new(state.lead(), &state);
        let a = HeuristicPolicy::new(5).choose_trump(&ctx);
        let b = HeuristicPolicy::new(5).choose_trump(&ctx);
        assert_eq!(a, b);
    }
}
