//! A C emitter: typedefs, enums, a callback-pointer struct, one static
//! handler function per non-empty `(event, state)`, a dispatch-table array
//! per event, and an init function.
//!
//! Grounded on `original_source/src/rsk_fsm/target/c.py` (`Enum`, `Struct`,
//! `FunctionType`, `Function`, `Array`, `Implementation`) and the spiritual
//! Rust-side analog of the teacher's `codegen/typestate.rs`: same "fully
//! static, one concrete artifact per state" shape, rendered as C text
//! instead of `TokenStream2`.

use std::fmt::Write as _;

use hfsmc_core::{Pointer, Step, StateRef, TransitionAlternative};
use hfsmc_compiler::CompiledFsm;

const INDENT: &str = "\t";

fn state_enum_label(prefix: &str, pointer: &Pointer) -> String {
    format!("{}_{}", prefix.to_uppercase(), super::naming::state_constant(pointer))
}

fn invalid_state_label(prefix: &str) -> String {
    format!("INVALID_{}", prefix.to_uppercase())
}

fn steps_to_statements(prefix: &str, steps: &[Step]) -> Vec<String> {
    let mut statements = Vec::new();
    for step in steps {
        match step {
            Step::RunActions(actions) => {
                for action in actions {
                    statements.push(format!("callbacks->action_{action}(fsm, arg);"));
                }
            }
            Step::SetState(StateRef::State(pointer)) => {
                statements.push(format!("fsm->state = {};", state_enum_label(prefix, pointer)));
            }
            Step::SetState(StateRef::Terminal) => {
                statements.push(format!("fsm->state = {};", invalid_state_label(prefix)));
            }
        }
    }
    statements
}

fn alternative_block(prefix: &str, alt: &TransitionAlternative) -> String {
    let statements = steps_to_statements(prefix, &alt.plan.steps);
    let body = statements.join("\n");
    match alt.condition.name() {
        None => body,
        Some(name) => {
            let polarity = match alt.condition.polarity() {
                Some(true) => "",
                Some(false) => "!",
                None => unreachable!("named condition always has a polarity"),
            };
            let indented: String = body
                .lines()
                .map(|l| format!("{INDENT}{l}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "if ({polarity}callbacks->condition_{name}(fsm, arg)) {{\n{indented}\n{INDENT}return;\n}}"
            )
        }
    }
}

fn function_body(prefix: &str, alternatives: &[TransitionAlternative]) -> String {
    let body = alternatives
        .iter()
        .map(|alt| alternative_block(prefix, alt))
        .collect::<Vec<_>>()
        .join("\n");
    body.lines().map(|l| format!("{INDENT}{l}")).collect::<Vec<_>>().join("\n")
}

fn handler_function(prefix: &str, name: &str, alternatives: &[TransitionAlternative]) -> String {
    let indented = function_body(prefix, alternatives);
    format!(
        "static void {name}({prefix}_t *fsm, const {prefix}_callbacks_t *callbacks, void *arg)\n{{\n{indented}\n}}"
    )
}

fn init_function(prefix: &str, alternatives: &[TransitionAlternative]) -> String {
    let indented = function_body(prefix, alternatives);
    format!(
        "void {prefix}_init({prefix}_t *fsm, const {prefix}_callbacks_t *callbacks, void *arg)\n{{\n{indented}\n}}"
    )
}

/// Render a C header (typedefs and declarations) and source (definitions)
/// pair for `fsm`.
pub fn render(prefix: &str, fsm: &CompiledFsm) -> (String, String) {
    (render_header(prefix, fsm), render_source(prefix, fsm))
}

fn render_header(prefix: &str, fsm: &CompiledFsm) -> String {
    let mut out = String::new();
    let guard = format!("{}_H", prefix.to_uppercase());
    writeln!(out, "/* {prefix} FSM - generated header. */").unwrap();
    writeln!(out, "#ifndef {guard}").unwrap();
    writeln!(out, "#define {guard}\n").unwrap();

    writeln!(out, "typedef enum {{").unwrap();
    for pointer in &fsm.states {
        writeln!(out, "{INDENT}{},", state_enum_label(prefix, pointer)).unwrap();
    }
    writeln!(out, "{INDENT}{}", invalid_state_label(prefix)).unwrap();
    writeln!(out, "}} {prefix}_state_e;\n").unwrap();

    writeln!(out, "typedef struct {prefix}_s {prefix}_t;\n").unwrap();

    writeln!(out, "typedef struct {{").unwrap();
    writeln!(out, "{INDENT}{prefix}_state_e state;").unwrap();
    writeln!(out, "}} {prefix}_s;\n").unwrap();

    writeln!(out, "typedef struct {{").unwrap();
    for condition in &fsm.conditions {
        writeln!(
            out,
            "{INDENT}int (*condition_{condition})({prefix}_t *fsm, void *arg);"
        )
        .unwrap();
    }
    for action in &fsm.actions {
        writeln!(out, "{INDENT}void (*action_{action})({prefix}_t *fsm, void *arg);").unwrap();
    }
    writeln!(out, "}} {prefix}_callbacks_t;\n").unwrap();

    writeln!(
        out,
        "void {prefix}_init({prefix}_t *fsm, const {prefix}_callbacks_t *callbacks, void *arg);"
    )
    .unwrap();
    for event in &fsm.events {
        writeln!(
            out,
            "void {prefix}_inject_{event}({prefix}_t *fsm, const {prefix}_callbacks_t *callbacks, void *arg);"
        )
        .unwrap();
    }
    writeln!(out, "\n#endif /* {guard} */").unwrap();
    out
}

fn render_source(prefix: &str, fsm: &CompiledFsm) -> String {
    let mut out = String::new();
    writeln!(out, "/* {prefix} FSM - generated source. */").unwrap();
    writeln!(out, "#include \"{prefix}.h\"\n").unwrap();

    writeln!(
        out,
        "{}\n",
        init_function(
            prefix,
            &[TransitionAlternative {
                condition: hfsmc_core::Condition::Unconditional,
                plan: fsm.initial_plan.clone(),
            }],
        )
    )
    .unwrap();

    for event in &fsm.events {
        let mut entries = Vec::new();
        for pointer in &fsm.states {
            let Some(alternatives) = fsm.transitions.get(&(event.clone(), pointer.clone())) else {
                continue;
            };
            let name = format!(
                "handle_{event}_in_{}",
                super::naming::state_label(pointer)
            );
            writeln!(out, "{}\n", handler_function(prefix, &name, alternatives)).unwrap();
            entries.push((state_enum_label(prefix, pointer), name));
        }
        if entries.is_empty() {
            continue;
        }
        let table_type = format!(
            "void (*)({prefix}_t *, const {prefix}_callbacks_t *, void *)"
        );
        writeln!(
            out,
            "static const struct {{ {prefix}_state_e state; {table_type} handler; }} dispatch_{event}[] = {{"
        )
        .unwrap();
        for (state, handler) in &entries {
            writeln!(out, "{INDENT}{{ {state}, {handler} }},").unwrap();
        }
        writeln!(out, "}};\n").unwrap();

        writeln!(
            out,
            "void {prefix}_inject_{event}({prefix}_t *fsm, const {prefix}_callbacks_t *callbacks, void *arg)\n{{"
        )
        .unwrap();
        writeln!(
            out,
            "{INDENT}for (size_t i = 0; i < sizeof(dispatch_{event}) / sizeof(dispatch_{event}[0]); i++) {{"
        )
        .unwrap();
        writeln!(out, "{INDENT}{INDENT}if (dispatch_{event}[i].state == fsm->state) {{").unwrap();
        writeln!(out, "{INDENT}{INDENT}{INDENT}dispatch_{event}[i].handler(fsm, callbacks, arg);").unwrap();
        writeln!(out, "{INDENT}{INDENT}{INDENT}return;").unwrap();
        writeln!(out, "{INDENT}{INDENT}}}").unwrap();
        writeln!(out, "{INDENT}}}").unwrap();
        writeln!(out, "}}\n").unwrap();
    }
    out
}
