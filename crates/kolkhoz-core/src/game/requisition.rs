//! End-of-year requisition: confiscates plot cards for every job the
//! active [`RequisitionScope`](crate::game::rules::RequisitionScope) selects,
//! with drunkard, informant and party-official effects driven by the trump
//! cards in the job's bucket. Table variants in [`RuleSet`] change who is
//! exposed and how many cards are taken.

use crate::game::jobs::JobBoard;
use crate::game::rules::RuleSet;
use crate::model::card::Card;
use crate::model::player::Player;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequisitionAction {
    /// The trump drunkard was sent north; the job was spared.
    DrunkardExiled { suit: Suit, card: Card },
    Exiled { suit: Suit, player: usize, card: Card },
    /// Second card taken because the trump party official worked the job.
    OfficerExiled { suit: Suit, player: usize, card: Card },
}

impl RequisitionAction {
    pub fn card(&self) -> Card {
        match *self {
            RequisitionAction::DrunkardExiled { card, .. }
            | RequisitionAction::Exiled { card, .. }
            | RequisitionAction::OfficerExiled { card, .. } => card,
        }
    }

    pub fn suit(&self) -> Suit {
        match *self {
            RequisitionAction::DrunkardExiled { suit, .. }
            | RequisitionAction::Exiled { suit, .. }
            | RequisitionAction::OfficerExiled { suit, .. } => suit,
        }
    }

    /// Seat that lost a card, `None` for the drunkard.
    pub fn player(&self) -> Option<usize> {
        match *self {
            RequisitionAction::DrunkardExiled { .. } => None,
            RequisitionAction::Exiled { player, .. }
            | RequisitionAction::OfficerExiled { player, .. } => Some(player),
        }
    }
}

impl fmt::Display for RequisitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequisitionAction::DrunkardExiled { suit, card } => {
                write!(f, "{}: drunkard {card} sent north", suit.job_name())
            }
            RequisitionAction::Exiled { suit, player, card } => {
                write!(f, "{}: player {player} sent {card} north", suit.job_name())
            }
            RequisitionAction::OfficerExiled { suit, player, card } => write!(
                f,
                "{}: party official sent {card} of player {player} north",
                suit.job_name()
            ),
        }
    }
}

/// Runs requisition over every suit in fixed order and returns the actions
/// taken. Suits whose bucket stayed empty are never visited. `hero` is the
/// seat that won every trick of the year when that rule is on.
pub(crate) fn perform(
    jobs: &mut JobBoard,
    players: &mut [Player],
    exiled: &mut BTreeSet<Card>,
    trump: Option<Suit>,
    rules: &RuleSet,
    hero: Option<usize>,
) -> Vec<RequisitionAction> {
    let roles = rules.role_trump(trump);
    let mut actions = Vec::new();
    if let Some(hero) = hero {
        info!(target: "kolkhoz_core::requisition", hero, "hero of the soviet union spared");
    }

    for suit in Suit::ALL {
        let bucket = jobs.bucket(suit);
        if bucket.is_empty() || !rules.requisition_scope.applies(jobs.hours(suit)) {
            continue;
        }

        if let Some(drunkard) = bucket.iter().copied().find(|card| card.is_drunkard(roles)) {
            jobs.remove_from_bucket(suit, drunkard);
            exiled.insert(drunkard);
            let action = RequisitionAction::DrunkardExiled {
                suit,
                card: drunkard,
            };
            info!(target: "kolkhoz_core::requisition", %action);
            actions.push(action);
            continue;
        }

        let informant = bucket.iter().any(|card| card.is_informant(roles));
        let officer = bucket.iter().any(|card| card.is_party_official(roles));
        let exposed_to = |player: &Player| match hero {
            Some(hero) => player.index != hero,
            None => {
                informant || player.brigade_leader || rules.northern_style || rules.mice_variant
            }
        };

        if rules.mice_variant {
            let mut pool: Vec<(usize, Card)> = Vec::new();
            for player in players.iter_mut().filter(|player| exposed_to(player)) {
                player.plot.reveal_suit(suit);
                pool.extend(
                    player
                        .plot
                        .revealed_of_suit_desc(suit)
                        .into_iter()
                        .map(|card| (player.index, card)),
                );
            }
            pool.sort_by(|a, b| b.1.rank.cmp(&a.1.rank));
            let taken = if officer { 2 } else { 1 };
            for (position, &(seat, card)) in pool.iter().take(taken).enumerate() {
                players[seat].plot.remove_revealed(card);
                exiled.insert(card);
                let action = if position == 0 {
                    RequisitionAction::Exiled {
                        suit,
                        player: seat,
                        card,
                    }
                } else {
                    RequisitionAction::OfficerExiled {
                        suit,
                        player: seat,
                        card,
                    }
                };
                info!(target: "kolkhoz_core::requisition", %action);
                actions.push(action);
            }
            continue;
        }

        for player in players.iter_mut() {
            if !exposed_to(player) {
                continue;
            }
            player.plot.reveal_suit(suit);
            let exposed = player.plot.revealed_of_suit_desc(suit);
            let Some(&highest) = exposed.first() else {
                continue;
            };
            player.plot.remove_revealed(highest);
            exiled.insert(highest);
            let action = RequisitionAction::Exiled {
                suit,
                player: player.index,
                card: highest,
            };
            info!(target: "kolkhoz_core::requisition", %action);
            actions.push(action);

            if officer {
                if let Some(&second) = exposed.get(1) {
                    player.plot.remove_revealed(second);
                    exiled.insert(second);
                    let action = RequisitionAction::OfficerExiled {
                        suit,
                        player: player.index,
                        card: second,
                    };
                    info!(target: "kolkhoz_core::requisition", %action);
                    actions.push(action);
                }
            }
        }
    }

    actions
}
