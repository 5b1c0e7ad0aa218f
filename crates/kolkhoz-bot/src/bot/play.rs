use super::{BotParams, job_urgency, plot_risk};
use kolkhoz_core::game::decision::DecisionContext;
use kolkhoz_core::model::card::Card;
use kolkhoz_core::model::suit::Suit;
use kolkhoz_core::model::trick::Trick;
use rand::Rng;
use std::collections::BTreeSet;

pub struct PlayPlanner;

impl PlayPlanner {
    /// Best-scoring legal hand index for the seat in `ctx`.
    pub fn choose<R: Rng + ?Sized>(
        ctx: &DecisionContext<'_>,
        params: &BotParams,
        rng: &mut R,
    ) -> Option<usize> {
        let hand = ctx.hand();
        let mut best: Option<(usize, f32)> = None;
        for index in ctx.legal_plays() {
            let Some(card) = hand.get(index) else {
                continue;
            };
            let mut score = Self::score(ctx, card, params);
            if params.play_jitter > 0.0 {
                score += rng.gen_range(0.0..params.play_jitter);
            }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }

    pub fn score(ctx: &DecisionContext<'_>, card: Card, params: &BotParams) -> f32 {
        let state = ctx.state;
        let trick = ctx.current_trick();
        let trump = ctx.trump();

        let Some(lead) = trick.lead_suit() else {
            let mut score = job_urgency(state, ctx.seat, card.suit, params) * params.lead_job_weight;
            if (8..=11).contains(&card.value()) {
                score += 5.0;
            }
            if card.is_trump(trump) && state.trick_count() < 2 {
                score -= params.early_trump_lead_penalty;
            }
            return score;
        };

        let mut score = 0.0;
        let win = win_chance(trick, card, trump);
        let desire = win_desire(ctx, params);
        if desire > 0.0 && win > 0.5 {
            score += desire * win * params.follow_win_weight;
        } else if desire < 0.0 && win < 0.5 {
            score += desire.abs() * (1.0 - win) * params.follow_lose_weight;
        }

        if card.suit != lead && !state.claimed_jobs().contains(&card.suit) {
            if let Some(player) = state.player(ctx.seat) {
                score += plot_risk(player, card.suit) as f32 * params.dump_risk_weight;
            }
        }
        score
    }
}

/// Rough odds that `card` takes the trick as it stands.
fn win_chance(trick: &Trick, card: Card, trump: Option<Suit>) -> f32 {
    let (Some(lead), Some(best)) = (trick.lead_suit(), trick.winner(trump)) else {
        return 0.5;
    };
    let best = best.card;
    if card.is_trump(trump) && !best.is_trump(trump) {
        0.8
    } else if card.suit == best.suit && card.rank > best.rank {
        0.7
    } else if card.suit != lead && !card.is_trump(trump) {
        0.1
    } else {
        0.3
    }
}

/// Positive when taking the current trick helps the seat.
fn win_desire(ctx: &DecisionContext<'_>, params: &BotParams) -> f32 {
    let state = ctx.state;
    let Some(player) = state.player(ctx.seat) else {
        return 0.0;
    };
    let mut desire = 0.0;
    if !player.is_brigade_leader() {
        if player.plot().iter().next().is_some() {
            desire -= params.stay_hidden_penalty;
        }
    } else {
        desire += 5.0;
    }

    let suits: BTreeSet<Suit> = ctx.current_trick().cards().map(|card| card.suit).collect();
    for suit in suits {
        desire += job_urgency(state, ctx.seat, suit, params) * 0.1;
    }
    if state.trick_count() >= 2 {
        desire += 3.0;
    }
    desire
}
