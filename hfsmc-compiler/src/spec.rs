//! The concrete, `serde`-deserializable spec shape (spec.md §6) and its
//! [`SpecModel`] implementation.
//!
//! This is the only place in the workspace that knows specs arrive as YAML
//! or JSON. Everything downstream (`index`, `check`, `planner`) talks to the
//! [`hfsmc_core::SpecModel`] trait, never to these structs directly.

use serde::Deserialize;

use hfsmc_core::{Condition, SpecModel, SpecState, SpecTransition, Target};

/// A full FSM specification, as deserialized from a spec file.
#[derive(Debug, Clone, Deserialize)]
pub struct Spec {
    pub name: Option<String>,
    pub initial: String,
    #[serde(default)]
    pub states: Vec<StateSpec>,
}

/// A single state, possibly with nested children.
#[derive(Debug, Clone, Deserialize)]
pub struct StateSpec {
    pub state: String,
    pub initial: Option<String>,
    #[serde(default)]
    pub enter: Vec<String>,
    #[serde(default)]
    pub exit: Vec<String>,
    #[serde(default)]
    pub states: Vec<StateSpec>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

/// A single outgoing transition.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionSpec {
    pub event: String,
    pub condition: Option<ConditionSpec>,
    #[serde(default)]
    pub actions: Vec<String>,
    /// Absent means internal (never leaves the current state). Present but
    /// equal to the literal `"final"` means the FSM's final pseudo-state,
    /// relative to the state the transition is declared on.
    pub next: Option<String>,
}

/// A transition condition: either a bare condition name (truthy guard) or
/// `{not: name}` (falsy guard). Untagged so both shapes deserialize from the
/// same `condition:` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConditionSpec {
    Truthy(String),
    Falsy { not: String },
}

impl SpecModel for Spec {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn initial(&self) -> &str {
        &self.initial
    }

    fn root_states(&self) -> Vec<&dyn SpecState> {
        self.states.iter().map(|s| s as &dyn SpecState).collect()
    }
}

impl SpecState for StateSpec {
    fn name(&self) -> &str {
        &self.state
    }

    fn initial(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    fn enter_actions(&self) -> &[String] {
        &self.enter
    }

    fn exit_actions(&self) -> &[String] {
        &self.exit
    }

    fn children(&self) -> Vec<&dyn SpecState> {
        self.states.iter().map(|s| s as &dyn SpecState).collect()
    }

    fn transitions(&self) -> Vec<&dyn SpecTransition> {
        self.transitions
            .iter()
            .map(|t| t as &dyn SpecTransition)
            .collect()
    }
}

impl SpecTransition for TransitionSpec {
    fn event(&self) -> &str {
        &self.event
    }

    fn condition(&self) -> Condition {
        match &self.condition {
            None => Condition::Unconditional,
            Some(ConditionSpec::Truthy(name)) => Condition::WhenTruthy(name.clone()),
            Some(ConditionSpec::Falsy { not }) => Condition::WhenFalsy(not.clone()),
        }
    }

    fn actions(&self) -> &[String] {
        &self.actions
    }

    fn target(&self) -> Target {
        match &self.next {
            None => Target::Internal,
            Some(next) if next == "final" => Target::Final,
            Some(next) if next.starts_with('/') => Target::Absolute(next.clone()),
            Some(next) if next.starts_with('.') => Target::Relative(next.clone()),
            Some(next) => Target::Sibling(next.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nested_states_and_transitions() {
        let yaml = r#"
name: door
initial: closed
states:
  - state: closed
    enter: [lock]
    transitions:
      - event: open
        next: open
  - state: open
    states:
      - state: ajar
        initial: true_ajar
"#;
        let spec: Spec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.name.as_deref(), Some("door"));
        assert_eq!(spec.initial, "closed");
        assert_eq!(spec.states.len(), 2);
        assert_eq!(spec.states[0].transitions[0].event, "open");
    }

    #[test]
    fn condition_untagged_shapes_parse() {
        let truthy: TransitionSpec = serde_yaml::from_str(
            "event: go\ncondition: ready\n",
        )
        .unwrap();
        assert!(matches!(truthy.condition(), Condition::WhenTruthy(ref n) if n == "ready"));

        let falsy: TransitionSpec = serde_yaml::from_str(
            "event: go\ncondition:\n  not: ready\n",
        )
        .unwrap();
        assert!(matches!(falsy.condition(), Condition::WhenFalsy(ref n) if n == "ready"));
    }

    #[test]
    fn next_field_classifies_target_variant() {
        let internal: TransitionSpec = serde_yaml::from_str("event: go\n").unwrap();
        assert_eq!(internal.target(), Target::Internal);

        let finalized: TransitionSpec =
            serde_yaml::from_str("event: go\nnext: final\n").unwrap();
        assert_eq!(finalized.target(), Target::Final);

        let absolute: TransitionSpec =
            serde_yaml::from_str("event: go\nnext: /a/b\n").unwrap();
        assert_eq!(absolute.target(), Target::Absolute("/a/b".to_string()));

        let relative: TransitionSpec =
            serde_yaml::from_str("event: go\nnext: ../b\n").unwrap();
        assert_eq!(relative.target(), Target::Relative("../b".to_string()));

        let sibling: TransitionSpec = serde_yaml::from_str("event: go\nnext: b\n").unwrap();
        assert_eq!(sibling.target(), Target::Sibling("b".to_string()));
    }
}
