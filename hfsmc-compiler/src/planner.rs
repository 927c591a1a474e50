//! The transition planner (spec.md §4.3): turns a `(event, source state)`
//! pair into an ordered list of [`TransitionAlternative`]s, and builds the
//! FSM's initial-transition plan.
//!
//! Grounded line-for-line on `build.py`'s `Builder._exit_steps`,
//! `_enter_steps`, `get_initial_transition`, `_next_state`, and
//! `get_transitions`, the direct original-language source this spec was
//! distilled from, and on `codegen/event.rs`'s ancestor-chain walk for the
//! inheritance-ordering half of the same algorithm.

use hfsmc_core::{
    resolve, Condition, CompileError, Destination, NextRef, Plan, Pointer, StateRef, Step,
    Target, TransitionAlternative,
};

use crate::index::StateIndex;

/// Build the plan for the FSM's initial transition (spec.md §4.4,
/// `get_initial_transition`): enter from nowhere down to the declared
/// initial state's nested initial descendant.
pub fn plan_initial(index: &StateIndex<'_>, initial_name: &str) -> Result<Plan, CompileError> {
    let pointer = Pointer::from_path(&[initial_name.to_string()])?;
    let dst = index.initial_of(&pointer)?;
    Ok(Plan::new(enter_steps(index, None, &dst)))
}

/// Build the list of transition alternatives for `event` fired while in
/// state `src` (`get_transitions`).
///
/// Walks the ancestor chain from `src` up to the root, nearest-ancestor
/// first, most-specific-transition first within a state (spec.md §4.3). The
/// first unconditional alternative encountered truncates the list (spec.md
/// invariant 7); ancestors are never consulted once it is reached.
pub fn plan_transitions(
    index: &StateIndex<'_>,
    event: &str,
    src: &Pointer,
) -> Result<Vec<TransitionAlternative>, CompileError> {
    let mut path: Vec<String> = src.path().into_iter().map(str::to_string).collect();
    let mut alternatives = Vec::new();
    while !path.is_empty() {
        let pointer = Pointer::from_path(&path)?;
        let state = index
            .get(&pointer)
            .ok_or_else(|| CompileError::BadPointer(pointer.to_string()))?;
        for transition in state.transitions() {
            if transition.event() != event {
                continue;
            }
            let target = transition.target();
            let steps = if target == Target::Internal {
                vec![Step::RunActions(transition.actions().to_vec())]
            } else {
                let dst = next_state(index, &target, &path)?;
                let mut steps = exit_steps(index, src, dst.as_ref());
                if dst.is_none() {
                    steps.push(Step::SetState(StateRef::Terminal));
                }
                steps.push(Step::RunActions(transition.actions().to_vec()));
                if let Some(dst) = &dst {
                    steps.extend(enter_steps(index, Some(src), dst));
                }
                steps
            };
            let condition = transition.condition();
            let unconditional = condition == Condition::Unconditional;
            alternatives.push(TransitionAlternative {
                condition,
                plan: Plan::new(steps),
            });
            if unconditional {
                // an unconditional transition always fires: nothing below it
                // in this state, and no ancestor, can ever be reached.
                return Ok(alternatives);
            }
        }
        path.pop();
    }
    Ok(alternatives)
}

/// Resolve a transition's declared target relative to the state that
/// declared it, descending into the destination's nested initial state.
/// `None` means the FSM's final pseudo-state (exited entirely).
fn next_state(
    index: &StateIndex<'_>,
    target: &Target,
    path: &[String],
) -> Result<Option<Pointer>, CompileError> {
    let next_ref = match target {
        Target::Internal => unreachable!("internal transitions never resolve a next state"),
        Target::Final => NextRef::Final,
        Target::Absolute(p) => NextRef::Absolute(p),
        Target::Relative(p) => NextRef::Relative(p),
        Target::Sibling(n) => NextRef::Sibling(n),
    };
    match resolve(&next_ref, path)? {
        Destination::Terminal => Ok(None),
        Destination::Absolute(pointer) => index.initial_of(&pointer).map(Some),
    }
}

/// The exit half of an external transition (`_exit_steps`): leave `src`,
/// climbing ancestors up to (but not through) the common ancestor of `src`
/// and `dst`. `dst = None` means the transition exits the FSM entirely.
fn exit_steps(index: &StateIndex<'_>, src: &Pointer, dst: Option<&Pointer>) -> Vec<Step> {
    if Some(src) == dst {
        let state = index.get(src).expect("src pointer came from the index");
        return vec![
            Step::RunActions(state.exit_actions().to_vec()),
            Step::SetState(StateRef::State(src.clone())),
        ];
    }
    let src_path: Vec<String> = src.path().into_iter().map(str::to_string).collect();
    let dst_path: Vec<String> = dst
        .map(|d| d.path().into_iter().map(str::to_string).collect())
        .unwrap_or_default();
    let mut steps = Vec::new();
    let mut path = src_path;
    while !is_ancestor_prefix(&path, &dst_path) {
        let pointer = Pointer::from_path(&path).expect("non-empty climbed path");
        path.pop();
        let state = index.get(&pointer).expect("pointer came from the index");
        steps.push(Step::RunActions(state.exit_actions().to_vec()));
        steps.push(Step::SetState(StateRef::State(pointer)));
    }
    steps
}

/// The enter half of an external transition (`_enter_steps`): from the
/// common ancestor of `src` and `dst`, descend down to `dst`. `src = None`
/// means this is the FSM's very first transition (spec.md §4.4).
fn enter_steps(index: &StateIndex<'_>, src: Option<&Pointer>, dst: &Pointer) -> Vec<Step> {
    if src == Some(dst) {
        let state = index.get(dst).expect("dst pointer came from the index");
        return vec![
            Step::SetState(StateRef::State(dst.clone())),
            Step::RunActions(state.enter_actions().to_vec()),
        ];
    }
    let src_path: Vec<String> = src
        .map(|s| s.path().into_iter().map(str::to_string).collect())
        .unwrap_or_default();
    let dst_path: Vec<String> = dst.path().into_iter().map(str::to_string).collect();
    let mut path = src_path;
    while !is_ancestor_prefix(&path, &dst_path) {
        path.pop();
    }
    let mut steps = Vec::new();
    if path == dst_path {
        // the common ancestor is the destination itself: it was never
        // exited, so only the position marker is emitted, not enter actions.
        let pointer = Pointer::from_path(&path).expect("non-empty shared ancestor");
        steps.push(Step::SetState(StateRef::State(pointer)));
    } else {
        while path != dst_path {
            path.push(dst_path[path.len()].clone());
            let pointer = Pointer::from_path(&path).expect("path grown from dst_path");
            let state = index.get(&pointer).expect("pointer came from the index");
            steps.push(Step::SetState(StateRef::State(pointer)));
            steps.push(Step::RunActions(state.enter_actions().to_vec()));
        }
    }
    steps
}

/// `path == dst_path[..path.len()]`, with Python's slice-never-errors
/// semantics: if `dst_path` is shorter than `path`, they can never match.
fn is_ancestor_prefix(path: &[String], dst_path: &[String]) -> bool {
    dst_path.len() >= path.len() && path == &dst_path[..path.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Spec;

    fn set_state(pointer: &str) -> Step {
        Step::SetState(StateRef::State(Pointer::parse(pointer).unwrap()))
    }

    fn run(actions: &[&str]) -> Step {
        Step::RunActions(actions.iter().map(|s| s.to_string()).collect())
    }

    // Full end-to-end scenarios S1-S6 of spec.md §8 live in
    // `tests/scenarios.rs`, driven through the public `Builder`. These tests
    // cover the lower-level step-construction mechanics `exit_steps` and
    // `enter_steps` implement, which the scenarios exercise only indirectly.

    #[test]
    fn exit_steps_climbs_to_the_lca_innermost_first() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: t
initial: A
states:
  - state: A
    initial: B
    states:
      - state: B
        exit: [leave_b]
  - state: C
"#,
        )
        .unwrap();
        let index = StateIndex::build(&spec).unwrap();
        let steps = exit_steps(&index, &Pointer::parse("/A/B").unwrap(), Some(&Pointer::parse("/C").unwrap()));
        assert_eq!(
            steps,
            vec![run(&["leave_b"]), set_state("/A/B"), run(&[]), set_state("/A")]
        );
    }

    #[test]
    fn exit_steps_to_terminal_climbs_all_the_way_out() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: t
initial: A
states:
  - state: A
    exit: [leave_a]
"#,
        )
        .unwrap();
        let index = StateIndex::build(&spec).unwrap();
        let steps = exit_steps(&index, &Pointer::parse("/A").unwrap(), None);
        assert_eq!(steps, vec![run(&["leave_a"]), set_state("/A")]);
    }

    #[test]
    fn exit_steps_self_transition_emits_a_visible_exit() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: t
initial: A
states:
  - state: A
    exit: [leave_a]
"#,
        )
        .unwrap();
        let index = StateIndex::build(&spec).unwrap();
        let a = Pointer::parse("/A").unwrap();
        let steps = exit_steps(&index, &a, Some(&a));
        assert_eq!(steps, vec![run(&["leave_a"]), set_state("/A")]);
    }

    #[test]
    fn enter_steps_does_not_reenter_the_shared_ancestor() {
        let spec: Spec = serde_yaml::from_str(
            r#"
name: t
initial: A
states:
  - state: A
    enter: [enter_a]
    states:
      - state: B
        enter: [enter_b]
      - state: C
        enter: [enter_c]
"#,
        )
        .unwrap();
        let index = StateIndex::build(&spec).unwrap();
        let steps = enter_steps(&index, Some(&Pointer::parse("/A/B").unwrap()), &Pointer::parse("/A/C").unwrap());
        assert_eq!(steps, vec![set_state("/A/C"), run(&["enter_c"])]);
    }

    #[test]
    fn is_ancestor_prefix_handles_empty_and_mismatched_paths() {
        let empty: Vec<String> = vec![];
        assert!(is_ancestor_prefix(&empty, &["A".to_string()]));
        assert!(is_ancestor_prefix(&["A".to_string()], &["A".to_string(), "B".to_string()]));
        assert!(!is_ancestor_prefix(&["A".to_string()], &["B".to_string()]));
        assert!(!is_ancestor_prefix(&["A".to_string(), "B".to_string()], &["A".to_string()]));
    }
}
