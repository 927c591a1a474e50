//! Absolute/relative state pointer algebra (spec §4.1).
//!
//! An absolute pointer is the canonical address of a state: a non-empty
//! sequence of names written `/n1/n2/...`. Structural validation here only
//! checks the shape the grammar requires (leading `/`, no empty or
//! dot-prefixed segments); character-set enforcement of individual names is
//! a CLI-level format check (spec.md §6), not this crate's concern.

use crate::error::CompileError;

/// A validated absolute state pointer, stored in its canonical `/a/b/c` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer(String);

impl Pointer {
    /// Parse an absolute pointer string (`path_of` in spec.md §4.1).
    ///
    /// Requires a leading empty segment, i.e. the string begins with `/`.
    /// Fails with [`CompileError::BadPointer`] for anything else, including
    /// relative pointers, bare names, or an empty string.
    pub fn parse(pointer: &str) -> Result<Self, CompileError> {
        let mut segments = pointer.split('/');
        match segments.next() {
            Some("") => {}
            _ => return Err(CompileError::BadPointer(pointer.to_string())),
        }
        let rest: Vec<&str> = segments.collect();
        if rest.is_empty() || rest.iter().any(|s| s.is_empty()) {
            return Err(CompileError::BadPointer(pointer.to_string()));
        }
        Ok(Self(pointer.to_string()))
    }

    /// Build an absolute pointer from a path of state names (`pointer_of`).
    ///
    /// Fails with [`CompileError::BadPath`] if `path` is empty or any
    /// segment begins with `.`.
    pub fn from_path<S: AsRef<str>>(path: &[S]) -> Result<Self, CompileError> {
        if path.is_empty() || path[0].as_ref().starts_with('.') {
            return Err(CompileError::BadPath(
                path.iter().map(|s| s.as_ref().to_string()).collect(),
            ));
        }
        let mut pointer = String::new();
        for segment in path {
            pointer.push('/');
            pointer.push_str(segment.as_ref());
        }
        Ok(Self(pointer))
    }

    /// Split this pointer back into its sequence of state names.
    pub fn path(&self) -> Vec<&str> {
        self.0.split('/').skip(1).collect()
    }
}

impl std::fmt::Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Pointer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Pointer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Pointer::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Where a `next` transition target resolves to, before diving into initial
/// substates. `Terminal` means the FSM has been exited entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Terminal,
    Absolute(Pointer),
}

/// Resolve a transition's `next` specifier against a context path.
///
/// `context` is the absolute path of the state the transition was declared
/// on (or discovered via inheritance on, per spec.md §4.3: the source
/// state, not necessarily the declaring state, is what matters for exit/enter
/// step generation, but `resolve` itself only needs the declaring state's
/// path to anchor relative pointers and sibling names).
pub fn resolve(next: &NextRef<'_>, context: &[String]) -> Result<Destination, CompileError> {
    match next {
        NextRef::Final => {
            let mut path = context.to_vec();
            path.pop();
            if path.is_empty() {
                Ok(Destination::Terminal)
            } else {
                Ok(Destination::Absolute(Pointer::from_path(&path)?))
            }
        }
        NextRef::Absolute(pointer) => Ok(Destination::Absolute(Pointer::parse(pointer)?)),
        NextRef::Relative(relative) => {
            let mut path = context.to_vec();
            for elem in relative.split('/') {
                match elem {
                    "." => {}
                    ".." => {
                        // underflow past the root is silently absorbed (spec.md §9)
                        path.pop();
                    }
                    name => path.push(name.to_string()),
                }
            }
            Ok(Destination::Absolute(Pointer::from_path(&path)?))
        }
        NextRef::Sibling(name) => {
            let mut path = context.to_vec();
            if let Some(last) = path.last_mut() {
                *last = name.to_string();
            }
            Ok(Destination::Absolute(Pointer::from_path(&path)?))
        }
    }
}

/// The shape of a transition's `next` field, borrowed from the spec model.
///
/// `Internal` is deliberately absent: internal transitions never call
/// `resolve`, since the planner short-circuits on them before reaching this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRef<'a> {
    Final,
    Absolute(&'a str),
    Relative(&'a str),
    Sibling(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_indexed_pointer() {
        let p = Pointer::parse("/a/b/c").unwrap();
        let rebuilt = Pointer::from_path(&p.path()).unwrap();
        assert_eq!(p, rebuilt);
    }

    #[test]
    fn parse_rejects_non_absolute_input() {
        assert!(Pointer::parse("a/b").is_err());
        assert!(Pointer::parse(".").is_err());
        assert!(Pointer::parse("").is_err());
        assert!(Pointer::parse("/").is_err());
    }

    #[test]
    fn from_path_rejects_empty_or_dot_prefixed() {
        let empty: Vec<String> = vec![];
        assert!(Pointer::from_path(&empty).is_err());
        assert!(Pointer::from_path(&[".".to_string()]).is_err());
    }

    #[test]
    fn resolve_final_pops_one_segment() {
        let ctx = vec!["A".to_string(), "B".to_string()];
        let dst = resolve(&NextRef::Final, &ctx).unwrap();
        assert_eq!(dst, Destination::Absolute(Pointer::parse("/A").unwrap()));
    }

    #[test]
    fn resolve_final_at_depth_one_is_terminal() {
        let ctx = vec!["A".to_string()];
        let dst = resolve(&NextRef::Final, &ctx).unwrap();
        assert_eq!(dst, Destination::Terminal);
    }

    #[test]
    fn resolve_relative_underflow_is_absorbed() {
        let ctx = vec!["A".to_string()];
        let dst = resolve(&NextRef::Relative("../../B"), &ctx).unwrap();
        assert_eq!(dst, Destination::Absolute(Pointer::parse("/B").unwrap()));
    }

    #[test]
    fn resolve_sibling_replaces_last_segment() {
        let ctx = vec!["A".to_string(), "B".to_string()];
        let dst = resolve(&NextRef::Sibling("C"), &ctx).unwrap();
        assert_eq!(dst, Destination::Absolute(Pointer::parse("/A/C").unwrap()));
    }
}
