//! The [`Action`] trait, [`ActionKind`], and the [`ActionRegistry`].
//!
//! Actions are the atomic units of update logic executed once per tick in
//! schedule order. Their read/write footprints are supplied separately by
//! a [`FootprintOracle`](crate::FootprintOracle) so the scheduler never
//! has to inspect action bodies.

use std::fmt;

use ripple_core::{ActionError, ActionId};

use crate::context::{ActionContext, GuardContext};

/// How an action's writes become visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    /// Writes land in the live store immediately and are visible to every
    /// later action in the same tick.
    Combinational,

    /// Edge-triggered: writes are staged and committed at the tick
    /// boundary, so readers in the same tick still see the old value.
    Sequential,

    /// A guarded method. Invoked at most once per tick, only if its guard
    /// holds at its scheduled position. Writes are immediate.
    MethodCall,
}

impl ActionKind {
    /// Whether writes by this kind of action are visible within the tick.
    pub fn writes_immediately(self) -> bool {
        !matches!(self, Self::Sequential)
    }

    /// Stable one-byte tag, used in structural fingerprints.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Combinational => 0,
            Self::Sequential => 1,
            Self::MethodCall => 2,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combinational => write!(f, "comb"),
            Self::Sequential => write!(f, "seq"),
            Self::MethodCall => write!(f, "method"),
        }
    }
}

/// A unit of update logic in the per-tick schedule.
///
/// # Contract
///
/// - `execute()` MUST only read and write nets in the action's footprint;
///   the context rejects anything else with an [`ActionError`].
/// - `name()` and `kind()` are queried once at registration, not per-tick.
/// - `guard()` is only consulted for [`ActionKind::MethodCall`] actions.
///
/// # Examples
///
/// A combinational inverter:
///
/// ```
/// use ripple_core::{ActionError, NetId};
/// use ripple_sched::{Action, ActionContext, ActionKind};
///
/// struct Not { input: NetId, output: NetId }
///
/// impl Action for Not {
///     fn name(&self) -> &str { "not" }
///     fn kind(&self) -> ActionKind { ActionKind::Combinational }
///     fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
///         let v = ctx.read(self.input)?;
///         ctx.write(self.output, !v)
///     }
/// }
///
/// let a = Not { input: NetId(0), output: NetId(1) };
/// assert_eq!(a.kind(), ActionKind::Combinational);
/// ```
pub trait Action: Send + 'static {
    /// Hierarchical name for error reporting and tracing.
    fn name(&self) -> &str;

    /// Visibility semantics of this action's writes.
    fn kind(&self) -> ActionKind;

    /// Readiness predicate for method-call actions.
    ///
    /// Evaluated synchronously immediately before invocation. Default:
    /// always ready.
    fn guard(&self, ctx: &GuardContext<'_>) -> Result<bool, ActionError> {
        let _ = ctx;
        Ok(true)
    }

    /// Run the action for one tick.
    fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError>;

    /// Optional per-action debugging text appended to the line trace.
    fn line_trace(&self) -> Option<String> {
        None
    }
}

/// Name and kind of a registered action: everything the scheduler needs
/// besides the footprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDecl {
    /// Hierarchical name.
    pub name: String,
    /// Visibility semantics.
    pub kind: ActionKind,
}

impl ActionDecl {
    /// Declare an action with an explicit kind.
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Declare a combinational action.
    pub fn comb(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Combinational)
    }

    /// Declare a sequential action.
    pub fn seq(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Sequential)
    }

    /// Declare a method-call action.
    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::MethodCall)
    }
}

/// The full set of actions of an elaborated design, in declaration order.
///
/// The declaration index of each action is its [`ActionId`].
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<Box<dyn Action>>,
    decls: Vec<ActionDecl>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action and return its id.
    pub fn register(&mut self, action: Box<dyn Action>) -> ActionId {
        let id = ActionId(self.actions.len() as u32);
        self.decls
            .push(ActionDecl::new(action.name().to_string(), action.kind()));
        self.actions.push(action);
        id
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Declarations in id order.
    pub fn decls(&self) -> &[ActionDecl] {
        &self.decls
    }

    /// Id of the first action called `name`.
    pub fn lookup(&self, name: &str) -> Option<ActionId> {
        self.decls
            .iter()
            .position(|d| d.name == name)
            .map(|i| ActionId(i as u32))
    }

    /// Borrow an action.
    pub fn get(&self, id: ActionId) -> Option<&dyn Action> {
        self.actions.get(id.index()).map(|a| a.as_ref())
    }

    /// Mutable access to every action, indexed by [`ActionId`].
    pub fn actions_mut(&mut self) -> &mut [Box<dyn Action>] {
        &mut self.actions
    }

    /// Shared access to every action, indexed by [`ActionId`].
    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("decls", &self.decls)
            .finish()
    }
}

impl FromIterator<Box<dyn Action>> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = Box<dyn Action>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for action in iter {
            registry.register(action);
        }
        registry
    }
}
