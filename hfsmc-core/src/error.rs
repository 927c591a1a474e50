//! Compiler error kinds.
//!
//! All variants are fatal: the compiler is a one-shot pipeline with no
//! retries. Every variant names the offending pointer, path, or state so the
//! CLI can surface a precise diagnostic.

use thiserror::Error;

/// Everything that can go wrong while indexing, checking, or planning a spec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A pointer string did not match the required grammar, or resolution
    /// produced a pointer that is not in the state index.
    #[error("not a valid state pointer: {0:?}")]
    BadPointer(String),

    /// A path could not be rendered as an absolute pointer (empty, or a
    /// segment starting with `.`).
    #[error("cannot form an absolute pointer from path {0:?}")]
    BadPath(Vec<String>),

    /// A referenced state does not exist: the FSM's declared initial state,
    /// a state's nested initial, or a transition's target.
    #[error("{field} \"{name}\" of {state} is not a defined state")]
    BadState {
        /// What was being resolved, e.g. `"initial state"` or `"next state"`.
        field: &'static str,
        /// The unresolved name or pointer.
        name: String,
        /// A description of the state or FSM the field was declared on.
        state: String,
    },

    /// Two sibling states share a name.
    #[error("duplicate state {0}")]
    DuplicateState(String),

    /// The spec has no `name` and the caller supplied no `--prefix` override.
    #[error("FSM has no name: must supply a prefix")]
    MissingPrefix,
}
