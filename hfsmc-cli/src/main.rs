//! Command-line entry point for the HFSM compiler.

use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hfsmc_compiler::{Builder, Spec};

mod emit;

#[derive(Parser)]
#[command(name = "hfsmc")]
#[command(about = "Compile hierarchical finite-state machine specs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a spec file into a target language implementation.
    Compile {
        /// Path to the spec file, or "-" to read from standard input.
        fsm: String,

        /// Target emitter: "c" or "dynamic".
        target: String,

        /// Path to a JSON Schema document to validate the spec against
        /// before compiling. Without this, only structural deserialization
        /// validates the input.
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Override the emitted identifier prefix. Defaults to the spec's
        /// own `name`; required if the spec has none.
        #[arg(long)]
        prefix: Option<String>,

        /// Override the absolute-state-pointer format.
        #[arg(long = "absolute-state-pointer")]
        absolute_state_pointer: Option<String>,

        /// Override the relative-state-pointer format.
        #[arg(long = "relative-state-pointer")]
        relative_state_pointer: Option<String>,

        /// Override the state-name format.
        #[arg(long = "state-name")]
        state_name: Option<String>,

        /// Override the event-name format.
        #[arg(long = "event-name")]
        event_name: Option<String>,

        /// Override the condition-name format.
        #[arg(long = "condition-name")]
        condition_name: Option<String>,

        /// Override the action-name format.
        #[arg(long = "action-name")]
        action_name: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hfsmc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            fsm,
            target,
            schema,
            prefix,
            absolute_state_pointer,
            relative_state_pointer,
            state_name,
            event_name,
            condition_name,
            action_name,
        } => compile(
            &fsm,
            &target,
            schema.as_deref(),
            prefix.as_deref(),
            FormatOverrides {
                absolute_state_pointer,
                relative_state_pointer,
                state_name,
                event_name,
                condition_name,
                action_name,
            },
        ),
    }
}

/// Per-format regular expression overrides (spec.md §6); default to
/// spec.md's own grammar when absent.
struct FormatOverrides {
    absolute_state_pointer: Option<String>,
    relative_state_pointer: Option<String>,
    state_name: Option<String>,
    event_name: Option<String>,
    condition_name: Option<String>,
    action_name: Option<String>,
}

fn compile(
    fsm_path: &str,
    target: &str,
    schema: Option<&std::path::Path>,
    prefix: Option<&str>,
    formats: FormatOverrides,
) -> Result<()> {
    let target: emit::Target = target.parse()?;

    let raw = read_input(fsm_path)?;
    let json_value: serde_json::Value = if fsm_path.ends_with(".json") {
        serde_json::from_str(&raw).context("parsing spec as JSON")?
    } else {
        serde_yaml::from_str(&raw).context("parsing spec as YAML")?
    };

    if let Some(schema_path) = schema {
        validate_against_schema(&json_value, schema_path)?;
    }

    validate_formats(&json_value, &formats)?;

    let spec: Spec = serde_json::from_value(json_value).context("deserializing spec")?;

    let resolved_prefix = match (prefix, spec.name.as_deref()) {
        (Some(p), _) => p.to_string(),
        (None, Some(name)) => name.to_string(),
        (None, None) => {
            error!("FSM has no name and no --prefix was given");
            bail!(hfsmc_core::CompileError::MissingPrefix);
        }
    };

    let compiled = match Builder::compile(&spec) {
        Ok(compiled) => compiled,
        Err(err) => {
            error!(%err, "compilation failed");
            return Err(err.into());
        }
    };
    info!(
        states = compiled.states.len(),
        events = compiled.events.len(),
        actions = compiled.actions.len(),
        "compiled successfully"
    );

    match target {
        emit::Target::C => {
            let (header, source) = emit::c::render(&resolved_prefix, &compiled);
            println!("{header}\n");
            println!("{source}");
        }
        emit::Target::Dynamic => {
            println!("{}", emit::dynamic::render(&resolved_prefix, &compiled));
        }
    }
    Ok(())
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading spec from standard input")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading spec file {path}"))
    }
}

fn validate_against_schema(value: &serde_json::Value, schema_path: &std::path::Path) -> Result<()> {
    let schema_text = std::fs::read_to_string(schema_path)
        .with_context(|| format!("reading schema file {}", schema_path.display()))?;
    let schema_value: serde_json::Value =
        serde_json::from_str(&schema_text).context("parsing schema as JSON")?;
    let validator = jsonschema::validator_for(&schema_value).context("compiling schema")?;
    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("spec failed schema validation:\n{}", errors.join("\n"));
    }
    Ok(())
}

/// Apply per-format regex overrides as an extra pass over the spec's
/// string fields before planning (spec.md §6), matching the original's
/// `--absolute-state-pointer` etc. CLI arguments in `compile.py`.
fn validate_formats(value: &serde_json::Value, formats: &FormatOverrides) -> Result<()> {
    use regex::Regex;

    let absolute = compile_regex(formats.absolute_state_pointer.as_deref(), r"^(/[A-Za-z][A-Za-z_-]*)+$")?;
    let relative = compile_regex(
        formats.relative_state_pointer.as_deref(),
        r"^(\.{1,2})(/\.{1,2})*(/[A-Za-z][A-Za-z_-]*)*$",
    )?;
    let name = compile_regex(formats.state_name.as_deref(), r"^[A-Za-z][A-Za-z_-]*$")?;
    let event = compile_regex(formats.event_name.as_deref(), r"^[A-Za-z][A-Za-z_-]*$")?;
    let condition = compile_regex(formats.condition_name.as_deref(), r"^[A-Za-z][A-Za-z_-]*$")?;
    let action = compile_regex(formats.action_name.as_deref(), r"^[A-Za-z][A-Za-z_-]*$")?;

    walk_formats(value, &absolute, &relative, &name, &event, &condition, &action)
}

fn compile_regex(pattern: Option<&str>, default: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern.unwrap_or(default)).context("compiling format override regex")
}

fn walk_formats(
    value: &serde_json::Value,
    absolute: &regex::Regex,
    relative: &regex::Regex,
    name: &regex::Regex,
    event: &regex::Regex,
    condition: &regex::Regex,
    action: &regex::Regex,
) -> Result<()> {
    let serde_json::Value::Object(root) = value else {
        bail!("spec must be a JSON/YAML object");
    };
    if let Some(states) = root.get("states") {
        walk_states(states, name, event, condition, action, absolute, relative)?;
    }
    Ok(())
}

fn walk_states(
    states: &serde_json::Value,
    name_re: &regex::Regex,
    event_re: &regex::Regex,
    condition_re: &regex::Regex,
    action_re: &regex::Regex,
    absolute_re: &regex::Regex,
    relative_re: &regex::Regex,
) -> Result<()> {
    let Some(states) = states.as_array() else {
        return Ok(());
    };
    for state in states {
        if let Some(state_name) = state.get("state").and_then(|v| v.as_str()) {
            check_format(name_re, state_name, "state-name")?;
        }
        for list_field in ["enter", "exit"] {
            if let Some(list) = state.get(list_field).and_then(|v| v.as_array()) {
                for action in list {
                    if let Some(action) = action.as_str() {
                        check_format(action_re, action, "action-name")?;
                    }
                }
            }
        }
        if let Some(transitions) = state.get("transitions").and_then(|v| v.as_array()) {
            for transition in transitions {
                if let Some(event) = transition.get("event").and_then(|v| v.as_str()) {
                    check_format(event_re, event, "event-name")?;
                }
                if let Some(condition) = transition.get("condition") {
                    let name = condition
                        .as_str()
                        .or_else(|| condition.get("not").and_then(|v| v.as_str()));
                    if let Some(name) = name {
                        check_format(condition_re, name, "condition-name")?;
                    }
                }
                if let Some(actions) = transition.get("actions").and_then(|v| v.as_array()) {
                    for action in actions {
                        if let Some(action) = action.as_str() {
                            check_format(action_re, action, "action-name")?;
                        }
                    }
                }
                if let Some(next) = transition.get("next").and_then(|v| v.as_str()) {
                    if next != "final" {
                        if next.starts_with('/') {
                            check_format(absolute_re, next, "absolute-state-pointer")?;
                        } else if next.starts_with('.') {
                            check_format(relative_re, next, "relative-state-pointer")?;
                        } else {
                            check_format(name_re, next, "state-name")?;
                        }
                    }
                }
            }
        }
        walk_states(
            state.get("states").unwrap_or(&serde_json::Value::Null),
            name_re,
            event_re,
            condition_re,
            action_re,
            absolute_re,
            relative_re,
        )?;
    }
    Ok(())
}

fn check_format(re: &regex::Regex, value: &str, format: &str) -> Result<()> {
    if re.is_match(value) {
        Ok(())
    } else {
        bail!("{value:?} does not match the {format} format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOOR_YAML: &str = r#"
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
"#;

    #[test]
    fn compiles_a_spec_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("door.yaml");
        std::fs::write(&path, DOOR_YAML).unwrap();

        compile(
            path.to_str().unwrap(),
            "dynamic",
            None,
            None,
            FormatOverrides {
                absolute_state_pointer: None,
                relative_state_pointer: None,
                state_name: None,
                event_name: None,
                condition_name: None,
                action_name: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn missing_prefix_without_spec_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nameless.yaml");
        std::fs::write(&path, "initial: a\nstates:\n  - state: a\n").unwrap();

        let err = compile(
            path.to_str().unwrap(),
            "dynamic",
            None,
            None,
            FormatOverrides {
                absolute_state_pointer: None,
                relative_state_pointer: None,
                state_name: None,
                event_name: None,
                condition_name: None,
                action_name: None,
            },
        )
        .unwrap_err();
        assert!(err
            .downcast_ref::<hfsmc_core::CompileError>()
            .is_some_and(|e| matches!(e, hfsmc_core::CompileError::MissingPrefix)));
    }

    #[test]
    fn rejects_a_state_name_that_fails_the_override_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("door.yaml");
        std::fs::write(&path, DOOR_YAML).unwrap();

        let err = compile(
            path.to_str().unwrap(),
            "dynamic",
            None,
            None,
            FormatOverrides {
                absolute_state_pointer: None,
                relative_state_pointer: None,
                state_name: Some(r"^nomatch$".to_string()),
                event_name: None,
                condition_name: None,
                action_name: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("state-name"));
    }

    #[test]
    fn unknown_target_is_rejected_before_reading_the_spec() {
        let err = compile("-", "rust", None, None, FormatOverrides {
            absolute_state_pointer: None,
            relative_state_pointer: None,
            state_name: None,
            event_name: None,
            condition_name: None,
            action_name: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("unknown target"));
    }
}
