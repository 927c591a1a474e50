//! The read-only view the planner needs over a parsed spec (spec.md §9,
//! "Polymorphism over spec"). Keeping this a trait instead of baking in a
//! concrete struct means `hfsmc-compiler`'s index/checker/planner never see
//! how the spec was parsed: only `hfsmc-compiler::spec` (or any future
//! front end) needs to know about `serde`.

/// Top-level view of an FSM specification.
pub trait SpecModel {
    /// The FSM's declared name, if any (spec.md §7, `MissingPrefix`).
    fn name(&self) -> Option<&str>;

    /// The name of the root's declared initial child state.
    fn initial(&self) -> &str;

    /// The FSM's top-level states, in declaration order.
    fn root_states(&self) -> Vec<&dyn SpecState>;
}

/// A single state in the tree, named and addressed relative to its parent.
pub trait SpecState {
    /// This state's name, unique among its siblings.
    fn name(&self) -> &str;

    /// The name of this state's declared initial child, if it has one.
    fn initial(&self) -> Option<&str>;

    /// Actions run on entry to this state, in declared order.
    fn enter_actions(&self) -> &[String];

    /// Actions run on exit from this state, in declared order.
    fn exit_actions(&self) -> &[String];

    /// This state's child states, in declaration order.
    fn children(&self) -> Vec<&dyn SpecState>;

    /// This state's outgoing transitions, in declaration order.
    fn transitions(&self) -> Vec<&dyn SpecTransition>;
}

/// A single outgoing transition declared on a state.
pub trait SpecTransition {
    /// The event name this transition fires on.
    fn event(&self) -> &str;

    /// The condition guarding this transition, or [`Condition::Unconditional`].
    fn condition(&self) -> Condition;

    /// Actions run as part of this transition, in declared order.
    fn actions(&self) -> &[String];

    /// Where this transition goes.
    fn target(&self) -> Target;
}

/// A convenience alias: condition names are plain state-machine identifiers,
/// never pointers, so they carry no pointer algebra of their own.
pub type ConditionName = String;

/// The tri-state polarity of a transition's guard (spec.md §9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// No condition: the transition always fires.
    Unconditional,
    /// Fires only if the named condition evaluates truthy.
    WhenTruthy(ConditionName),
    /// Fires only if the named condition evaluates falsy.
    WhenFalsy(ConditionName),
}

impl Condition {
    /// The condition's name, if this is not [`Condition::Unconditional`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Condition::Unconditional => None,
            Condition::WhenTruthy(name) | Condition::WhenFalsy(name) => Some(name),
        }
    }

    /// `true` if the guard requires a truthy result, `false` if falsy, `None`
    /// if unconditional.
    pub fn polarity(&self) -> Option<bool> {
        match self {
            Condition::Unconditional => None,
            Condition::WhenTruthy(_) => Some(true),
            Condition::WhenFalsy(_) => Some(false),
        }
    }
}

/// A transition's `next` specifier, exactly as declared (spec.md §9,
/// "Transition target as variant"), not yet resolved against a context
/// path. `Internal` means "no exit/enter, run actions in place".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Internal,
    Final,
    Absolute(String),
    Relative(String),
    Sibling(String),
}
