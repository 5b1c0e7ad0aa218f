use super::{BotParams, plot_risk};
use kolkhoz_core::game::assignment::Assignment;
use kolkhoz_core::game::decision::DecisionContext;
use kolkhoz_core::game::rules::THRESHOLD;
use kolkhoz_core::model::card::Card;
use kolkhoz_core::model::suit::Suit;
use kolkhoz_core::model::suit_map::SuitMap;
use std::collections::BTreeSet;
use tracing::{Level, event};

/// Places the won trick. Plain cards always work their own job; trump cards
/// are either pooled into one job or spread card by card, whichever scores
/// higher.
pub struct AssignPlanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Concentrate(Suit),
    Split,
}

impl AssignPlanner {
    pub fn choose(ctx: &DecisionContext<'_>, params: &BotParams) -> Assignment {
        let trick = ctx.won_trick();
        let trump = ctx.trump();
        let state = ctx.state;
        let roles = state.role_trump();

        let mut hours: SuitMap<u32> = *state.work_hours();
        let mut assignment = Assignment::new();
        let mut flexible: Vec<Card> = Vec::new();
        for card in trick.cards() {
            if card.is_trump(trump) {
                flexible.push(card);
            } else {
                hours[card.suit] += card.work_hours(roles);
                assignment.insert(card, card.suit);
            }
        }
        if flexible.is_empty() {
            return assignment;
        }

        let targets: BTreeSet<Suit> = trick.cards().map(|card| card.suit).collect();
        let risk = |suit: Suit| {
            state
                .player(ctx.seat)
                .map(|player| plot_risk(player, suit))
                .unwrap_or(0) as f32
        };
        let claimed = |suit: Suit| state.claimed_jobs().contains(&suit);

        let pooled: u32 = flexible.iter().map(|card| card.work_hours(roles)).sum();
        let mut concentrate: Option<(Suit, f32)> = None;
        for &suit in &targets {
            let score = if claimed(suit) {
                params.claimed_job_penalty
            } else {
                let after = hours[suit] + pooled;
                let progress = if after >= THRESHOLD {
                    params.completion_bonus - (after - THRESHOLD) as f32 * 2.0
                } else if after >= 30 {
                    after as f32 + 30.0
                } else if after >= 20 {
                    after as f32 + 15.0
                } else {
                    after as f32
                };
                progress + risk(suit) * 20.0
            };
            if concentrate.is_none_or(|(_, best)| score > best) {
                concentrate = Some((suit, score));
            }
        }

        let mut split_score = 0.0;
        let mut split = Vec::with_capacity(flexible.len());
        for &card in &flexible {
            let mut best: Option<(Suit, f32)> = None;
            for &suit in &targets {
                let score = if claimed(suit) {
                    params.claimed_job_penalty
                } else {
                    let after = hours[suit] + card.work_hours(roles);
                    let progress = if after >= THRESHOLD {
                        params.split_completion_bonus
                    } else if after >= 30 {
                        after as f32 * 0.5 + 15.0
                    } else {
                        after as f32 * 0.5
                    };
                    progress + risk(suit) * 10.0
                };
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((suit, score));
                }
            }
            let (suit, score) = best.unwrap_or((card.suit, 0.0));
            split.push((card, suit));
            split_score += score;
        }

        let strategy = match concentrate {
            Some((suit, score)) if score >= split_score => Strategy::Concentrate(suit),
            _ => Strategy::Split,
        };
        match strategy {
            Strategy::Concentrate(suit) => {
                for &card in &flexible {
                    assignment.insert(card, suit);
                }
            }
            Strategy::Split => {
                for (card, suit) in split {
                    assignment.insert(card, suit);
                }
            }
        }
        event!(
            target: "kolkhoz_bot::assign",
            Level::DEBUG,
            seat = ctx.seat,
            strategy = ?strategy,
            trump_cards = flexible.len(),
            split_score,
        );
        assignment
    }
}
