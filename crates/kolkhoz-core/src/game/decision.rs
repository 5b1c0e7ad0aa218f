use crate::game::assignment::Assignment;
use crate::game::state::GameState;
use crate::model::hand::Hand;
use crate::model::suit::Suit;
use crate::model::trick::Trick;

/// Read-only view of the table handed to a decision maker.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub seat: usize,
    pub state: &'a GameState,
}

impl<'a> DecisionContext<'a> {
    pub fn new(seat: usize, state: &'a GameState) -> Self {
        Self { seat, state }
    }

    pub fn hand(&self) -> &'a Hand {
        self.state.players()[self.seat].hand()
    }

    pub fn trump(&self) -> Option<Suit> {
        self.state.trump()
    }

    pub fn current_trick(&self) -> &'a Trick {
        self.state.current_trick()
    }

    /// The trick waiting for an assignment.
    pub fn won_trick(&self) -> &'a Trick {
        self.state.last_trick()
    }

    pub fn legal_plays(&self) -> Vec<usize> {
        self.state.legal_plays(self.seat)
    }
}

/// Opponent intelligence. The engine calls `choose_assignment` for AI
/// trick winners; hosts call `choose_play` to drive AI turns.
pub trait DecisionMaker: Send {
    /// Index into the seat's hand of the card to play.
    fn choose_play(&mut self, ctx: &DecisionContext) -> usize;

    /// Job for every card of [`DecisionContext::won_trick`].
    fn choose_assignment(&mut self, ctx: &DecisionContext) -> Assignment;
}

/// Plays the first legal card and sends every card to its own suit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveDecider;

impl DecisionMaker for PassiveDecider {
    fn choose_play(&mut self, ctx: &DecisionContext) -> usize {
        ctx.legal_plays().first().copied().unwrap_or(0)
    }

    fn choose_assignment(&mut self, ctx: &DecisionContext) -> Assignment {
        Assignment::own_suits(ctx.won_trick())
    }
}
