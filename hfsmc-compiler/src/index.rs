//! The state index: a flat map from absolute pointer to state, built by
//! walking the spec tree once (spec.md §4.2).
//!
//! Grounded on `state-machines-macro`'s `Hierarchy` registration pass
//! (`types.rs`) and on `build.py`'s `walk_push`/`walk_pop`, which this index
//! reproduces directly: push a name onto the path, record the pointer,
//! accumulate action/event/condition names, then pop on the way back out.

use std::collections::{BTreeMap, BTreeSet};

use hfsmc_core::{CompileError, Pointer, SpecModel, SpecState};

/// A flat view over every state in a spec, keyed by absolute pointer.
///
/// Built once per compilation and never mutated afterwards; the checker and
/// planner both borrow it immutably.
pub struct StateIndex<'a> {
    states: BTreeMap<Pointer, &'a dyn SpecState>,
    events: BTreeSet<String>,
    conditions: BTreeSet<String>,
    actions: BTreeSet<String>,
}

impl<'a> StateIndex<'a> {
    /// Walk `model`'s state tree and build the index.
    ///
    /// Fails with [`CompileError::DuplicateState`] if two states resolve to
    /// the same absolute pointer (only possible via same-named siblings).
    pub fn build(model: &'a dyn SpecModel) -> Result<Self, CompileError> {
        let mut index = StateIndex {
            states: BTreeMap::new(),
            events: BTreeSet::new(),
            conditions: BTreeSet::new(),
            actions: BTreeSet::new(),
        };
        let mut path = Vec::new();
        for state in model.root_states() {
            index.walk(state, &mut path)?;
        }
        Ok(index)
    }

    fn walk(&mut self, state: &'a dyn SpecState, path: &mut Vec<String>) -> Result<(), CompileError> {
        path.push(state.name().to_string());
        let pointer = Pointer::from_path(path)?;
        if self.states.insert(pointer.clone(), state).is_some() {
            return Err(CompileError::DuplicateState(pointer.to_string()));
        }
        for action in state.exit_actions() {
            self.actions.insert(action.clone());
        }
        for action in state.enter_actions() {
            self.actions.insert(action.clone());
        }
        for transition in state.transitions() {
            self.events.insert(transition.event().to_string());
            if let Some(name) = transition.condition().name() {
                self.conditions.insert(name.to_string());
            }
            for action in transition.actions() {
                self.actions.insert(action.clone());
            }
        }
        for child in state.children() {
            self.walk(child, path)?;
        }
        path.pop();
        Ok(())
    }

    /// Look up a state by its absolute pointer.
    pub fn get(&self, pointer: &Pointer) -> Option<&'a dyn SpecState> {
        self.states.get(pointer).copied()
    }

    /// `true` if `pointer` names a known state.
    pub fn contains(&self, pointer: &Pointer) -> bool {
        self.states.contains_key(pointer)
    }

    /// Every state pointer in the index, in sorted (depth-first declaration
    /// tiebroken lexically) order.
    pub fn pointers(&self) -> impl Iterator<Item = &Pointer> {
        self.states.keys()
    }

    /// The FSM's event names, sorted and deduplicated.
    pub fn events(&self) -> &BTreeSet<String> {
        &self.events
    }

    /// The FSM's condition names, sorted and deduplicated.
    pub fn conditions(&self) -> &BTreeSet<String> {
        &self.conditions
    }

    /// The FSM's action names, sorted and deduplicated.
    pub fn actions(&self) -> &BTreeSet<String> {
        &self.actions
    }

    /// Descend from `pointer` through nested declared initial states until
    /// reaching a state with none (`Builder.initial_state` in build.py).
    ///
    /// If the state at `pointer` has no initial child, `pointer` itself is
    /// returned unchanged.
    pub fn initial_of(&self, pointer: &Pointer) -> Result<Pointer, CompileError> {
        let mut current = pointer.clone();
        loop {
            let state = self.get(&current).ok_or_else(|| CompileError::BadPointer(current.to_string()))?;
            match state.initial() {
                None => return Ok(current),
                Some(child) => {
                    let mut path = current.path();
                    path.push(child);
                    let next = Pointer::from_path(&path)?;
                    if !self.contains(&next) {
                        return Err(CompileError::BadState {
                            field: "initial state",
                            name: child.to_string(),
                            state: format!("state \"{current}\""),
                        });
                    }
                    current = next;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Spec;

    fn index_of(yaml: &str) -> Result<(), CompileError> {
        let spec: Spec = serde_yaml::from_str(yaml).unwrap();
        StateIndex::build(&spec).map(|_| ())
    }

    #[test]
    fn builds_pointers_for_nested_states() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: door
initial: closed
states:
  - state: closed
  - state: open
    states:
      - state: ajar
"#,
        )
        .unwrap();
        let index = StateIndex::build(&spec).unwrap();
        assert!(index.contains(&Pointer::parse("/closed").unwrap()));
        assert!(index.contains(&Pointer::parse("/open").unwrap()));
        assert!(index.contains(&Pointer::parse("/open/ajar").unwrap()));
    }

    #[test]
    fn rejects_duplicate_sibling_names() {
        let err = index_of(
            r#"
name: d
initial: a
states:
  - state: a
  - state: a
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateState(_)));
    }

    #[test]
    fn collects_sorted_action_event_condition_sets() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: d
initial: a
states:
  - state: a
    enter: [lock]
    exit: [unlock]
    transitions:
      - event: go
        condition: ready
        actions: [notify]
        next: b
  - state: b
"#,
        )
        .unwrap();
        let index = StateIndex::build(&spec).unwrap();
        assert_eq!(
            index.actions().iter().cloned().collect::<Vec<_>>(),
            vec!["lock".to_string(), "notify".to_string(), "unlock".to_string()]
        );
        assert_eq!(index.events().iter().cloned().collect::<Vec<_>>(), vec!["go".to_string()]);
        assert_eq!(
            index.conditions().iter().cloned().collect::<Vec<_>>(),
            vec!["ready".to_string()]
        );
    }
}
