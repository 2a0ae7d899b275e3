//! Built-in agents for exercising a session from the command line.

use ale_interface::Action;
use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    /// Uniformly random over the minimal action set.
    Random,
    /// Always NOOP.
    Noop,
}

pub enum Agent {
    Random(StdRng),
    Noop,
}

impl Agent {
    /// The agent's RNG is separate from the session's sticky-action stream.
    pub fn new(kind: AgentKind, seed: u64) -> Self {
        match kind {
            AgentKind::Random => Agent::Random(StdRng::seed_from_u64(seed)),
            AgentKind::Noop => Agent::Noop,
        }
    }

    pub fn act(&mut self, actions: &[Action]) -> Action {
        match self {
            Agent::Random(rng) => actions.choose(rng).copied().unwrap_or(Action::Noop),
            Agent::Noop => Action::Noop,
        }
    }
}
