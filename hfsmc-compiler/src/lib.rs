//! The HFSM compiler: state index, integrity checker, transition planner,
//! and the [`Builder`] facade that runs them in one pass.
//!
//! Everything here operates on [`hfsmc_core::SpecModel`] and produces a
//! [`CompiledFsm`]: emitters and other consumers never see the concrete
//! [`Spec`] type or the state index directly.

mod builder;
mod check;
mod index;
mod planner;
mod spec;

pub use builder::{Builder, CompiledFsm};
pub use index::StateIndex;
pub use spec::{ConditionSpec, Spec, StateSpec, TransitionSpec};
