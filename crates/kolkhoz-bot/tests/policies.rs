use kolkhoz_bot::{Agent, BotKind};
use kolkhoz_core::game::assignment::Assignment;
use kolkhoz_core::game::decision::{DecisionContext, DecisionMaker};
use kolkhoz_core::game::rules::GameOptions;
use kolkhoz_core::game::state::{GameState, Phase};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seats one agent per player and records every assignment it hands out.
struct Table {
    agents: Vec<Agent>,
    assignments: Vec<(Assignment, bool, bool)>,
}

impl DecisionMaker for Table {
    fn choose_play(&mut self, ctx: &DecisionContext) -> usize {
        self.agents[ctx.seat].choose_play(ctx)
    }

    fn choose_assignment(&mut self, ctx: &DecisionContext) -> Assignment {
        let assignment = self.agents[ctx.seat].choose_assignment(ctx);
        let covers = assignment.check_covers(ctx.won_trick()).is_ok();
        let legal = assignment.respects_trump_rule(ctx.trump());
        self.assignments.push((assignment.clone(), covers, legal));
        assignment
    }
}

fn play(kinds: &[BotKind], seed: u64) -> (GameState, Table) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = GameState::with_options(GameOptions::all_ai(kinds.len()), &mut rng).unwrap();
    let mut table = Table {
        agents: kinds
            .iter()
            .enumerate()
            .map(|(seat, &kind)| Agent::new(kind, seed + seat as u64))
            .collect(),
        assignments: Vec::new(),
    };

    while state.phase() != Phase::GameOver {
        match state.phase() {
            Phase::Planning => {
                if state.trump().is_none() {
                    let lead = state.lead();
                    let choice = table.agents[lead].choose_trump(&DecisionContext::new(lead, &state));
                    state.set_trump(choice, &mut rng).unwrap();
                }
                state.begin_year(&mut rng).unwrap();
            }
            Phase::Trick => {
                let seat = state.next_to_play();
                let index = table.choose_play(&DecisionContext::new(seat, &state));
                assert!(state.legal_plays(seat).contains(&index));
                state.play_card(seat, index, &mut table).unwrap();
            }
            Phase::Requisition => state.next_year(&mut rng).unwrap(),
            Phase::Assignment | Phase::GameOver => unreachable!("all seats are bots"),
        }
    }
    (state, table)
}

#[test]
fn mixed_table_finishes_with_well_formed_assignments() {
    let (state, table) = play(
        &[BotKind::Heuristic, BotKind::Random, BotKind::Heuristic, BotKind::Random],
        42,
    );
    assert_eq!(state.trick_history().tricks().count(), 19);
    assert_eq!(table.assignments.len(), 19);
    assert!(table.assignments.iter().all(|(_, covers, _)| *covers));
    for (assignment, _, legal) in &table.assignments {
        assert!(*legal, "assignment broke the trump rule: {assignment:?}");
    }
}

#[test]
fn heuristic_games_are_reproducible() {
    let kinds = [BotKind::Heuristic, BotKind::Heuristic, BotKind::Heuristic];
    let (first, _) = play(&kinds, 7);
    let (second, _) = play(&kinds, 7);
    assert_eq!(first, second);
    assert_eq!(first.final_scores(), second.final_scores());
}
