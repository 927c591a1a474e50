//! The plan artifact (spec.md §3, §4.3): the language-neutral output emitters
//! consume. A [`Plan`] is just an ordered list of [`Step`]s; everything about
//! *why* those steps are in that order (LCA walks, inheritance, condition
//! polarity) has already been baked in by the planner by the time an emitter
//! sees one.

use serde::{Deserialize, Serialize};

use crate::model::Condition;
use crate::pointer::Pointer;

/// One atomic unit of a transition plan (spec.md §3).
///
/// An empty `actions` list is still emitted rather than elided: it is an
/// observable state-change boundary marker, not dead weight (spec.md §9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Run this list of action callbacks, in order.
    RunActions(Vec<String>),
    /// Formally change the recorded state.
    SetState(StateRef),
}

/// The target of a `set-state` step: either a real state or the terminal
/// (exited-the-machine) pseudo-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateRef {
    State(Pointer),
    Terminal,
}

/// An ordered sequence of steps implementing one transition (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

/// One alternative in the list returned by `plan_transitions(event, src)`
/// (spec.md §4.3): the condition guarding it, and the steps to run if it
/// fires. [`Condition::Unconditional`] alternatives always truncate the list
/// they appear in (spec.md invariant 7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionAlternative {
    pub condition: Condition,
    pub plan: Plan,
}
