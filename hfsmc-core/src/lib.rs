//! Language-neutral types for the HFSM compiler.
//!
//! This crate holds everything an emitter or the planner needs that does not
//! depend on how a spec was parsed: the absolute/relative state pointer
//! algebra, the read-only [`SpecModel`] view a concrete spec implements, the
//! condition/target/step data model, and the compiler's error type.
//!
//! Nothing here reads a file, runs a state machine, or knows about a target
//! language. Those concerns live in `hfsmc-compiler` and `hfsmc-cli`.

mod error;
mod model;
mod plan;
mod pointer;

pub use error::CompileError;
pub use model::{Condition, ConditionName, SpecModel, SpecState, SpecTransition, Target};
pub use plan::{Plan, StateRef, Step, TransitionAlternative};
pub use pointer::{resolve, Destination, NextRef, Pointer};
