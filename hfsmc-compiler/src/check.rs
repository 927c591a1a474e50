//! The integrity checker (spec.md §4.2): everything a state index can say is
//! wrong about a spec before planning begins.
//!
//! Grounded on `validation.rs`'s superstate/initial-child checks and on
//! `build.py`'s `Builder._check_states` / `Builder._check_transitions`,
//! reproduced here against the general pointer/target model instead of the
//! teacher's closed set of leaf/superstate idents.

use hfsmc_core::{resolve, CompileError, NextRef, Pointer, SpecModel, Target};

use crate::index::StateIndex;

/// Run every integrity check against an already-built index.
///
/// Order matches `build.py`: states first (FSM initial, then each state's
/// declared initial child), then transitions (each `next` target must
/// resolve to a defined state).
pub fn check(model: &dyn SpecModel, index: &StateIndex<'_>) -> Result<(), CompileError> {
    check_initial(model, index)?;
    check_state_initials(index)?;
    check_transitions(index)?;
    Ok(())
}

fn check_initial(model: &dyn SpecModel, index: &StateIndex<'_>) -> Result<(), CompileError> {
    let pointer = Pointer::from_path(&[model.initial().to_string()])?;
    if !index.contains(&pointer) {
        return Err(CompileError::BadState {
            field: "initial state",
            name: model.initial().to_string(),
            state: "FSM".to_string(),
        });
    }
    Ok(())
}

fn check_state_initials(index: &StateIndex<'_>) -> Result<(), CompileError> {
    for pointer in index.pointers() {
        let state = index.get(pointer).expect("pointer came from the index itself");
        let Some(initial) = state.initial() else {
            continue;
        };
        let mut path = pointer.path();
        path.push(initial);
        let child = Pointer::from_path(&path)?;
        if !index.contains(&child) {
            return Err(CompileError::BadState {
                field: "initial state",
                name: initial.to_string(),
                state: format!("state \"{pointer}\""),
            });
        }
    }
    Ok(())
}

fn check_transitions(index: &StateIndex<'_>) -> Result<(), CompileError> {
    for pointer in index.pointers() {
        let state = index.get(pointer).expect("pointer came from the index itself");
        let path: Vec<String> = pointer.path().into_iter().map(str::to_string).collect();
        for transition in state.transitions() {
            let target = transition.target();
            if target == Target::Internal {
                continue;
            }
            resolve_checked(index, &target, &path).map_err(|_| CompileError::BadState {
                field: "next state",
                name: target_label(&target),
                state: format!("transition from state \"{pointer}\""),
            })?;
        }
    }
    Ok(())
}

/// Resolve `target` against `path` and confirm the result (if not terminal)
/// descends to a defined state, mirroring `_next_state`'s combination of
/// pointer resolution with `initial_state` descent.
fn resolve_checked(index: &StateIndex<'_>, target: &Target, path: &[String]) -> Result<(), CompileError> {
    let next_ref = match target {
        Target::Internal => return Ok(()),
        Target::Final => NextRef::Final,
        Target::Absolute(p) => NextRef::Absolute(p),
        Target::Relative(p) => NextRef::Relative(p),
        Target::Sibling(n) => NextRef::Sibling(n),
    };
    match resolve(&next_ref, path)? {
        hfsmc_core::Destination::Terminal => Ok(()),
        hfsmc_core::Destination::Absolute(pointer) => index.initial_of(&pointer).map(|_| ()),
    }
}

fn target_label(target: &Target) -> String {
    match target {
        Target::Internal => "<internal>".to_string(),
        Target::Final => "final".to_string(),
        Target::Absolute(p) | Target::Relative(p) | Target::Sibling(p) => p.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Spec;

    fn compile(yaml: &str) -> Result<(), CompileError> {
        let spec: Spec = serde_yaml::from_str(yaml).unwrap();
        let index = StateIndex::build(&spec)?;
        check(&spec, &index)
    }

    #[test]
    fn accepts_a_well_formed_spec() {
        compile(
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
    }

    #[test]
    fn rejects_undefined_fsm_initial() {
        let err = compile(
            r#"
name: d
initial: nope
states:
  - state: a
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::BadState { field: "initial state", .. }));
    }

    #[test]
    fn rejects_undefined_state_initial_child() {
        let err = compile(
            r#"
name: d
initial: a
states:
  - state: a
    initial: nope
    states:
      - state: b
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::BadState { field: "initial state", .. }));
    }

    #[test]
    fn rejects_transition_to_undefined_state() {
        let err = compile(
            r#"
name: d
initial: a
states:
  - state: a
    transitions:
      - event: go
        next: /nope
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::BadState { field: "next state", .. }));
    }

    #[test]
    fn accepts_final_transition_at_root_depth() {
        compile(
            r#"
name: d
initial: a
states:
  - state: a
    transitions:
      - event: done
        next: final
"#,
        )
        .unwrap();
    }
}
