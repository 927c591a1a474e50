//! A dynamic-language (Python-flavored) emitter.
//!
//! Grounded on `original_source/src/rsk_fsm/target/python.py`'s
//! `Implementation`/`Builder` pair, and the Rust-side analog of the
//! teacher's `codegen/dynamic.rs` dynamic-dispatch path: same "look up the
//! right callable at runtime by state and event" shape, rendered as text
//! instead of `TokenStream2`.

use std::fmt::Write as _;

use hfsmc_core::{Plan, Pointer, Step, StateRef, TransitionAlternative};
use hfsmc_compiler::CompiledFsm;

const INDENT: &str = "    ";

fn indent_block(text: &str) -> String {
    text.lines()
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn state_label(pointer: &Pointer) -> String {
    super::naming::state_label(pointer)
}

fn state_constant(pointer: &Pointer) -> String {
    format!("STATE_{}", super::naming::state_constant(pointer))
}

fn steps_to_statements(steps: &[Step]) -> Vec<String> {
    let mut statements = Vec::new();
    for step in steps {
        match step {
            Step::RunActions(actions) => {
                for action in actions {
                    statements.push(format!("fsm.callbacks.action_{action}(fsm, arg)"));
                }
            }
            Step::SetState(StateRef::State(pointer)) => {
                statements.push(format!("fsm.state = {}", state_constant(pointer)));
            }
            Step::SetState(StateRef::Terminal) => {
                statements.push("fsm.state = None".to_string());
            }
        }
    }
    statements
}

/// Render one alternative's contribution to a handler function's body.
fn alternative_block(alt: &TransitionAlternative) -> String {
    let mut statements = steps_to_statements(&alt.plan.steps);
    match alt.condition.name() {
        None => statements.join("\n"),
        Some(name) => {
            let polarity = match alt.condition.polarity() {
                Some(true) => "",
                Some(false) => "not ",
                None => unreachable!("named condition always has a polarity"),
            };
            statements.push("return".to_string());
            let body = indent_block(&statements.join("\n"));
            format!("if {polarity}fsm.callbacks.condition_{name}(fsm, arg):\n{body}")
        }
    }
}

fn transition_function(name: &str, doc: &str, alternatives: &[TransitionAlternative]) -> String {
    let body = if alternatives.is_empty() {
        INDENT.to_string() + "pass"
    } else {
        indent_block(
            &alternatives
                .iter()
                .map(alternative_block)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    };
    format!("def {name}(fsm, arg):\n{INDENT}\"\"\"{doc}\"\"\"\n{body}")
}

fn plan_as_alternative(plan: &Plan) -> TransitionAlternative {
    TransitionAlternative {
        condition: hfsmc_core::Condition::Unconditional,
        plan: plan.clone(),
    }
}

/// Render the full module source for `fsm`.
pub fn render(prefix: &str, fsm: &CompiledFsm) -> String {
    let mut out = String::new();

    writeln!(out, "\"\"\"A Python implementation of {prefix} FSM\"\"\"").unwrap();
    writeln!(out, "# pylint: disable=invalid-name\n").unwrap();

    for (idx, pointer) in fsm.states.iter().enumerate() {
        writeln!(out, "{} = {idx}", state_constant(pointer)).unwrap();
    }
    writeln!(out).unwrap();

    writeln!(
        out,
        "{}\n",
        transition_function(
            "initial_transition",
            "Transition into the initial state",
            &[plan_as_alternative(&fsm.initial_plan)],
        )
    )
    .unwrap();

    for event in &fsm.events {
        let mut handlers = Vec::new();
        for pointer in &fsm.states {
            let Some(alternatives) = fsm.transitions.get(&(event.clone(), pointer.clone())) else {
                continue;
            };
            let name = format!("handle_{event}_in_{}", state_label(pointer));
            let doc = format!("Handle event {event} in state {pointer}");
            writeln!(out, "{}\n", transition_function(&name, &doc, alternatives)).unwrap();
            handlers.push(format!("{}: {name},", state_constant(pointer)));
        }
        if !handlers.is_empty() {
            writeln!(out, "TRANSITION_ON_EVENT_{event} = {{").unwrap();
            for handler in &handlers {
                writeln!(out, "{INDENT}{handler}").unwrap();
            }
            writeln!(out, "}}\n").unwrap();
        }
    }

    writeln!(out, "class Callbacks:").unwrap();
    writeln!(
        out,
        "{INDENT}\"\"\"Interface for {prefix} FSM condition and action callbacks\"\"\""
    )
    .unwrap();
    for condition in &fsm.conditions {
        writeln!(out, "{INDENT}@staticmethod").unwrap();
        writeln!(out, "{INDENT}def condition_{condition}(fsm, arg):").unwrap();
        writeln!(
            out,
            "{INDENT}{INDENT}\"\"\"Callback for {prefix} FSM condition {condition}\"\"\""
        )
        .unwrap();
        writeln!(out, "{INDENT}{INDENT}raise NotImplementedError\n").unwrap();
    }
    for action in &fsm.actions {
        writeln!(out, "{INDENT}@staticmethod").unwrap();
        writeln!(out, "{INDENT}def action_{action}(fsm, arg):").unwrap();
        writeln!(
            out,
            "{INDENT}{INDENT}\"\"\"Callback for {prefix} FSM action {action}\"\"\""
        )
        .unwrap();
        writeln!(out, "{INDENT}{INDENT}raise NotImplementedError\n").unwrap();
    }

    writeln!(out, "class Fsm:").unwrap();
    writeln!(out, "{INDENT}\"\"\"A class for {prefix} FSM instances\"\"\"").unwrap();
    writeln!(out, "{INDENT}def __init__(self, callbacks=None, data=None, arg=None):").unwrap();
    writeln!(out, "{INDENT}{INDENT}self.state = None").unwrap();
    writeln!(out, "{INDENT}{INDENT}self.callbacks = self if callbacks is None else callbacks").unwrap();
    writeln!(out, "{INDENT}{INDENT}self.data = self if data is None else data").unwrap();
    writeln!(out, "{INDENT}{INDENT}initial_transition(self, arg)\n").unwrap();
    for event in &fsm.events {
        writeln!(out, "{INDENT}def inject_{event}(self, arg=None):").unwrap();
        writeln!(
            out,
            "{INDENT}{INDENT}\"\"\"Inject event {event} with event `arg`\"\"\""
        )
        .unwrap();
        writeln!(out, "{INDENT}{INDENT}try:").unwrap();
        writeln!(
            out,
            "{INDENT}{INDENT}{INDENT}TRANSITION_ON_EVENT_{event}[self.state](self, arg)"
        )
        .unwrap();
        writeln!(out, "{INDENT}{INDENT}except KeyError:").unwrap();
        writeln!(out, "{INDENT}{INDENT}{INDENT}pass\n").unwrap();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfsmc_compiler::{Builder, Spec};

    #[test]
    fn renders_a_door_module_with_expected_handlers() {
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
        let source = render("door", &fsm);
        assert!(source.contains("STATE_CLOSED = 0"));
        assert!(source.contains("def handle_open_in_closed(fsm, arg):"));
        assert!(source.contains("TRANSITION_ON_EVENT_open = {"));
        assert!(source.contains("class Callbacks:"));
        assert!(source.contains("class Fsm:"));
    }
}
