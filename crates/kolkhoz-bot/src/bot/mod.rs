mod assign;
mod play;
mod trump;

pub use assign::AssignPlanner;
pub use play::PlayPlanner;
pub use trump::TrumpPlanner;

use kolkhoz_core::game::rules::THRESHOLD;
use kolkhoz_core::game::state::GameState;
use kolkhoz_core::model::player::Player;
use kolkhoz_core::model::suit::Suit;

/// Weights shared by the planners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    /// Per plot card of a suit, added to the urgency of finishing its job.
    pub job_risk_bonus: f32,
    /// Reluctance to take a first trick while holding plot cards.
    pub stay_hidden_penalty: f32,
    pub follow_win_weight: f32,
    pub follow_lose_weight: f32,
    pub lead_job_weight: f32,
    pub early_trump_lead_penalty: f32,
    pub dump_risk_weight: f32,
    /// Upper bound of the random tie-break added to play scores.
    pub play_jitter: f32,
    pub trump_high_card_weight: f32,
    pub trump_length_weight: f32,
    pub trump_plot_risk_penalty: f32,
    pub trump_jitter: f32,
    pub completion_bonus: f32,
    pub split_completion_bonus: f32,
    pub claimed_job_penalty: f32,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            job_risk_bonus: 15.0,
            stay_hidden_penalty: 30.0,
            follow_win_weight: 20.0,
            follow_lose_weight: 15.0,
            lead_job_weight: 0.3,
            early_trump_lead_penalty: 10.0,
            dump_risk_weight: 3.0,
            play_jitter: 2.0,
            trump_high_card_weight: 15.0,
            trump_length_weight: 5.0,
            trump_plot_risk_penalty: 8.0,
            trump_jitter: 5.0,
            completion_bonus: 200.0,
            split_completion_bonus: 150.0,
            claimed_job_penalty: -20.0,
        }
    }
}

/// Cards of `suit` a requisition could take from `player`.
pub(crate) fn plot_risk(player: &Player, suit: Suit) -> usize {
    player.plot().count_suit(suit)
}

/// How much `seat` wants the job of `suit` finished this year.
pub(crate) fn job_urgency(state: &GameState, seat: usize, suit: Suit, params: &BotParams) -> f32 {
    if state.claimed_jobs().contains(&suit) {
        return -10.0;
    }
    let remaining = THRESHOLD.saturating_sub(state.work_hours()[suit]);
    let closeness = if remaining < 20 {
        (20 - remaining) as f32 * 2.0
    } else {
        0.0
    };
    let risk = state
        .player(seat)
        .map(|player| plot_risk(player, suit))
        .unwrap_or(0);
    closeness + risk as f32 * params.job_risk_bonus
}

#[cfg(test)]
mod tests {
    use super::{BotParams, job_urgency};
    use kolkhoz_core::game::rules::GameOptions;
    use kolkhoz_core::game::serialization::GameSnapshot;
    use kolkhoz_core::game::state::GameState;
    use kolkhoz_core::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn urgency_grows_with_progress_and_risk() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = GameState::with_options(GameOptions::all_ai(4), &mut rng).unwrap();
        let params = BotParams::default();
        assert_eq!(job_urgency(&state, 0, Suit::Hearts, &params), 0.0);

        let mut snapshot = GameSnapshot::capture(&state);
        let card = snapshot.workers_deck.pop().unwrap();
        snapshot.players[0].hidden.push(card);
        let risky = snapshot.restore().unwrap();
        assert_eq!(
            job_urgency(&risky, 0, card.suit, &params),
            params.job_risk_bonus
        );
    }
}
