//! Target emitters: external collaborators that consume only a
//! [`hfsmc_compiler::CompiledFsm`] (spec.md §1), never the original spec.

pub mod c;
pub mod dynamic;
pub mod naming;

/// The set of target names `hfsmc compile` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    C,
    Dynamic,
}

impl std::str::FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" => Ok(Target::C),
            "dynamic" => Ok(Target::Dynamic),
            other => Err(UnknownTarget(other.to_string())),
        }
    }
}

/// An unregistered `--target` name. This is an emitter-registration
/// concern, not a [`hfsmc_core::CompileError`] (spec.md §7).
#[derive(Debug, thiserror::Error)]
#[error("unknown target {0:?}: expected \"c\" or \"dynamic\"")]
pub struct UnknownTarget(pub String);
