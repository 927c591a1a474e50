//! The compiler facade (spec.md §4.4): index, check, and plan a spec in one
//! pass, producing the language-neutral artifact emitters consume.
//!
//! Grounded on `state-machines-macro`'s `StateMachine::expand()`
//! (`codegen/mod.rs`), which runs the same validate-then-generate sequence
//! for the teacher's proc-macro, and on `build.py`'s `Builder.build()`.

use std::collections::BTreeMap;

use hfsmc_core::{CompileError, Plan, Pointer, SpecModel, TransitionAlternative};
use tracing::debug;

use crate::check::check;
use crate::index::StateIndex;
use crate::planner::{plan_initial, plan_transitions};

/// The complete, language-neutral result of compiling a spec (spec.md §6,
/// "Planner outputs"). Emitters consume only this, never the original
/// [`SpecModel`].
#[derive(Debug, Clone)]
pub struct CompiledFsm {
    /// Every state's absolute pointer, sorted.
    pub states: Vec<Pointer>,
    /// Every event name referenced by a transition, sorted and deduplicated.
    pub events: Vec<String>,
    /// Every condition name referenced by a transition, sorted and
    /// deduplicated.
    pub conditions: Vec<String>,
    /// Every action name referenced anywhere (enter, exit, or transition),
    /// sorted and deduplicated.
    pub actions: Vec<String>,
    /// The pointer to the FSM's true initial state, after descending
    /// through nested declared initials.
    pub initial: Pointer,
    /// The plan run once, before any event is handled.
    pub initial_plan: Plan,
    /// The alternatives for handling `event` while in `state`, in the
    /// order they must be tried. Absent keys mean the event is not handled
    /// anywhere on the ancestor chain from that state.
    pub transitions: BTreeMap<(String, Pointer), Vec<TransitionAlternative>>,
}

/// The stateless compiler entry point.
pub struct Builder;

impl Builder {
    /// Index, check, and plan `model` in one pass.
    ///
    /// Every error is fatal: there is no partial result and no retry (spec.md
    /// §7). Each call is independent, nothing here is cached or shared
    /// across compilations.
    pub fn compile(model: &dyn SpecModel) -> Result<CompiledFsm, CompileError> {
        let index = StateIndex::build(model)?;
        debug!(states = index.pointers().count(), "built state index");

        check(model, &index)?;
        debug!("integrity check passed");

        let initial = index.initial_of(&Pointer::from_path(&[model.initial().to_string()])?)?;
        let initial_plan = plan_initial(&index, model.initial())?;

        let mut transitions = BTreeMap::new();
        for pointer in index.pointers() {
            for event in index.events() {
                let alternatives = plan_transitions(&index, event, pointer)?;
                if !alternatives.is_empty() {
                    transitions.insert((event.clone(), pointer.clone()), alternatives);
                }
            }
        }
        debug!(handlers = transitions.len(), "planned transitions");

        Ok(CompiledFsm {
            states: index.pointers().cloned().collect(),
            events: index.events().iter().cloned().collect(),
            conditions: index.conditions().iter().cloned().collect(),
            actions: index.actions().iter().cloned().collect(),
            initial,
            initial_plan,
            transitions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Spec;
    use hfsmc_core::CompileError;

    #[test]
    fn compiles_a_well_formed_door() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: door
initial: closed
states:
  - state: closed
    transitions:
      - event: open
        next: open
  - state: open
    transitions:
      - event: close
        next: closed
"#,
        )
        .unwrap();
        let fsm = Builder::compile(&spec).unwrap();
        assert_eq!(fsm.initial, Pointer::parse("/closed").unwrap());
        assert_eq!(fsm.events, vec!["close".to_string(), "open".to_string()]);
        assert!(fsm
            .transitions
            .contains_key(&("open".to_string(), Pointer::parse("/closed").unwrap())));
    }

    #[test]
    fn propagates_integrity_errors() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: door
initial: nope
states:
  - state: closed
"#,
        )
        .unwrap();
        let err = Builder::compile(&spec).unwrap_err();
        assert!(matches!(err, CompileError::BadState { field: "initial state", .. }));
    }
}
