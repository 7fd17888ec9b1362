//! The spec tree: suites, specs, their hooks and their scopes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use itertools::Itertools;

use crate::error::Error;
use crate::events::EventBus;
use crate::results::{SpecResult, capture_failure};
use crate::scope::Scope;
use crate::trace_categories;

/// The two variants of a spec node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::Display)]
pub enum NodeKind {
    /// A node that groups children; its definition runs while the tree is built.
    #[strum(serialize = "suite")]
    Suite,
    /// A leaf whose definition is the test body, run later by the runner.
    #[strum(serialize = "spec")]
    Spec,
}

/// Pending state of a node.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum_macros::Display)]
pub enum Pending {
    /// Not set; the nearest ancestor's resolved state applies.
    #[default]
    #[strum(serialize = "inherit")]
    Inherit,
    /// Explicitly skipped.
    #[strum(serialize = "skipped")]
    Skipped,
    /// Explicitly forced to run, overriding a skipped ancestor.
    #[strum(serialize = "forced")]
    Forced,
}

impl Pending {
    /// Resolves this state against the resolved state of the parent.
    ///
    /// # Arguments
    ///
    /// * `inherited` - Whether the parent resolved to pending.
    pub const fn resolve(self, inherited: bool) -> bool {
        match self {
            Self::Inherit => inherited,
            Self::Skipped => true,
            Self::Forced => false,
        }
    }
}

/// Signature of hooks and spec bodies; they receive the scope they are bound to.
pub type HookFn = dyn Fn(&Scope) -> SpecResult;

/// A hook or body paired with the scope of the node that registered it.
#[derive(Clone)]
pub struct BoundHook {
    scope: Rc<Scope>,
    function: Rc<HookFn>,
}

impl BoundHook {
    fn bind<F>(scope: &Rc<Scope>, function: F) -> Self
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        Self {
            scope: scope.clone(),
            function: Rc::new(function),
        }
    }

    /// Returns the scope this hook is bound to.
    pub const fn scope(&self) -> &Rc<Scope> {
        &self.scope
    }

    /// Invokes the hook against its bound scope. Panics raised by the hook are
    /// converted into a failed result.
    pub fn invoke(&self) -> SpecResult {
        capture_failure(|| (self.function)(&self.scope))
    }
}

impl fmt::Debug for BoundHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHook")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A node in the spec tree.
///
/// Nodes are shared through [`Rc`]: suites own their children, and every child keeps
/// only a weak reference back to its parent.
pub struct SpecNode {
    description: String,
    kind: NodeKind,
    /// Test body of a spec; suites consume their definition while being built.
    body: Option<BoundHook>,
    parent: RefCell<Weak<SpecNode>>,
    children: RefCell<Vec<Rc<SpecNode>>>,
    pending: Cell<Pending>,
    set_up_fns: RefCell<Vec<BoundHook>>,
    tear_down_fns: RefCell<Vec<BoundHook>>,
    scope: Rc<Scope>,
    event_emitter: RefCell<Option<EventBus>>,
}

impl SpecNode {
    fn new(description: String, kind: NodeKind, scope: Rc<Scope>, body: Option<BoundHook>) -> Self {
        Self {
            description,
            kind,
            body,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(vec![]),
            pending: Cell::new(Pending::Inherit),
            set_up_fns: RefCell::new(vec![]),
            tear_down_fns: RefCell::new(vec![]),
            scope,
            event_emitter: RefCell::new(None),
        }
    }

    /// Creates a suite and immediately invokes its definition, which is expected to
    /// register the suite's children and hooks.
    ///
    /// # Arguments
    ///
    /// * `description` - The suite's description.
    /// * `definition` - Builds the suite's contents.
    pub fn suite<F>(description: impl Into<String>, definition: F) -> Rc<Self>
    where
        F: FnOnce(&Rc<Self>),
    {
        let node = Rc::new(Self::new(
            description.into(),
            NodeKind::Suite,
            Rc::new(Scope::new()),
            None,
        ));

        tracing::debug!(target: trace_categories::TREE, "defining suite '{}'", node.description);
        definition(&node);

        node
    }

    /// Creates a spec. The body is bound to the spec's scope but is not invoked here.
    ///
    /// # Arguments
    ///
    /// * `description` - The spec's description.
    /// * `body` - The test body.
    pub fn spec<F>(description: impl Into<String>, body: F) -> Rc<Self>
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        let scope = Rc::new(Scope::new());
        let body = BoundHook::bind(&scope, body);
        Rc::new(Self::new(description.into(), NodeKind::Spec, scope, Some(body)))
    }

    /// Returns the node's description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns which variant this node is.
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns whether this node is a suite.
    pub const fn is_suite(&self) -> bool {
        matches!(self.kind, NodeKind::Suite)
    }

    /// Returns the spec body bound to this node's scope; suites have none.
    pub const fn definition(&self) -> Option<&BoundHook> {
        self.body.as_ref()
    }

    /// Registers a child under this suite and makes this suite its parent.
    ///
    /// # Arguments
    ///
    /// * `child` - The node to adopt.
    pub fn add_child(self: &Rc<Self>, child: Rc<Self>) -> Result<(), Error> {
        if !self.is_suite() {
            return Err(Error::NotASuite {
                parent: self.title(),
                child: child.description.clone(),
            });
        }

        self.push_child(child);
        Ok(())
    }

    pub(crate) fn push_child(self: &Rc<Self>, child: Rc<Self>) {
        tracing::debug!(
            target: trace_categories::TREE,
            "registering {} '{}' under '{}'",
            child.kind,
            child.description,
            self.description
        );

        child.set_parent(self);
        self.children.borrow_mut().push(child);
    }

    /// Returns this suite's children in registration order.
    pub fn children(&self) -> Vec<Rc<Self>> {
        self.children.borrow().clone()
    }

    /// Sets the parent of this node. No cycle check is performed.
    pub fn set_parent(&self, parent: &Rc<Self>) {
        *self.parent.borrow_mut() = Rc::downgrade(parent);
    }

    /// Returns the parent of this node, if it has one.
    pub fn parent(&self) -> Option<Rc<Self>> {
        self.parent.borrow().upgrade()
    }

    /// Returns the descriptions of the path from the root to this node, joined by
    /// single spaces. Always recomputed from the current parent chain.
    pub fn title(&self) -> String {
        let mut parts = vec![self.description.clone()];
        let mut current = self.parent();
        while let Some(node) = current {
            parts.push(node.description.clone());
            current = node.parent();
        }

        parts.iter().rev().join(" ")
    }

    /// Returns the number of ancestors above this node.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(node) = current {
            depth += 1;
            current = node.parent();
        }
        depth
    }

    /// Returns the chain of nodes from the root down to (and including) this node.
    pub fn ancestors(self: &Rc<Self>) -> Vec<Rc<Self>> {
        let mut chain = vec![self.clone()];
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            chain.push(node);
        }

        chain.reverse();
        chain
    }

    /// Marks this node as explicitly skipped (`true`) or explicitly forced (`false`).
    pub fn set_pending(&self, pending: bool) {
        self.pending.set(if pending {
            Pending::Skipped
        } else {
            Pending::Forced
        });
    }

    /// Returns this node's own pending state.
    pub fn pending(&self) -> Pending {
        self.pending.get()
    }

    /// Resolves whether this node is pending, given its parent's resolved state.
    pub fn resolve_pending(&self, inherited: bool) -> bool {
        self.pending.get().resolve(inherited)
    }

    /// Registers a function to run before each spec at or below this node.
    ///
    /// # Arguments
    ///
    /// * `set_up` - The hook; it receives this node's scope.
    pub fn add_set_up_function<F>(&self, set_up: F)
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        self.set_up_fns
            .borrow_mut()
            .push(BoundHook::bind(&self.scope, set_up));
    }

    /// Registers a function to run after each spec at or below this node.
    ///
    /// # Arguments
    ///
    /// * `tear_down` - The hook; it receives this node's scope.
    pub fn add_tear_down_function<F>(&self, tear_down: F)
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        self.tear_down_fns
            .borrow_mut()
            .push(BoundHook::bind(&self.scope, tear_down));
    }

    /// Returns the setUp hooks in registration order.
    pub fn set_up_functions(&self) -> Vec<BoundHook> {
        self.set_up_fns.borrow().clone()
    }

    /// Returns the tearDown hooks in registration order.
    pub fn tear_down_functions(&self) -> Vec<BoundHook> {
        self.tear_down_fns.borrow().clone()
    }

    /// Returns this node's scope.
    pub const fn scope(&self) -> &Rc<Scope> {
        &self.scope
    }

    /// Assigns the shared event bus to this node.
    pub fn set_event_emitter(&self, event_emitter: EventBus) {
        *self.event_emitter.borrow_mut() = Some(event_emitter);
    }

    /// Returns the event bus assigned to this node, if any.
    pub fn event_emitter(&self) -> Option<EventBus> {
        self.event_emitter.borrow().clone()
    }
}

impl fmt::Debug for SpecNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecNode")
            .field("description", &self.description)
            .field("kind", &self.kind)
            .field("pending", &self.pending.get())
            .field("children", &self.children.borrow().len())
            .finish_non_exhaustive()
    }
}
