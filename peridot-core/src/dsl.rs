//! Declarative construction of spec trees.
//!
//! ```
//! use peridot_core::Context;
//!
//! let mut context = Context::new();
//! context.describe("Calculator", |suite| {
//!     suite.before_each(|scope| {
//!         scope.set("operands", (1, 2));
//!         Ok(())
//!     });
//!
//!     suite.it("adds two numbers", |_| {
//!         assert_eq!(1 + 2, 3);
//!         Ok(())
//!     });
//! });
//!
//! assert_eq!(context.roots().len(), 1);
//! ```

use std::rc::Rc;

use crate::node::SpecNode;
use crate::results::SpecResult;
use crate::scope::Scope;

/// Owns the top-level nodes declared for a run.
#[derive(Debug, Default)]
pub struct Context {
    roots: Vec<Rc<SpecNode>>,
}

impl Context {
    /// Returns a new, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a top-level suite; `definition` runs immediately.
    pub fn describe<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        let node = build_suite(description, definition);
        self.roots.push(node.clone());
        node
    }

    /// Alias of [`Context::describe`].
    pub fn context<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        self.describe(description, definition)
    }

    /// Declares a top-level suite whose specs are pending unless forced.
    pub fn xdescribe<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        let node = self.describe(description, definition);
        node.set_pending(true);
        node
    }

    /// Alias of [`Context::xdescribe`].
    pub fn xcontext<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        self.xdescribe(description, definition)
    }

    /// Declares a top-level suite that runs even when an enclosing suite is pending.
    pub fn force_describe<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        let node = self.describe(description, definition);
        node.set_pending(false);
        node
    }

    /// Declares a top-level spec.
    pub fn it<F>(&mut self, description: &str, body: F) -> Rc<SpecNode>
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        let node = SpecNode::spec(description, body);
        self.roots.push(node.clone());
        node
    }

    /// Declares a pending top-level spec.
    pub fn xit<F>(&mut self, description: &str, body: F) -> Rc<SpecNode>
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        let node = self.it(description, body);
        node.set_pending(true);
        node
    }

    /// Declares a top-level spec that is never pending.
    pub fn force_it<F>(&mut self, description: &str, body: F) -> Rc<SpecNode>
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        let node = self.it(description, body);
        node.set_pending(false);
        node
    }

    /// Returns the declared top-level nodes in declaration order.
    pub fn roots(&self) -> &[Rc<SpecNode>] {
        &self.roots
    }
}

/// Handed to every suite definition to declare the suite's contents.
pub struct SuiteBuilder<'a> {
    suite: &'a Rc<SpecNode>,
}

impl SuiteBuilder<'_> {
    /// Returns the suite being defined.
    pub const fn node(&self) -> &Rc<SpecNode> {
        self.suite
    }

    /// Declares a nested suite; `definition` runs immediately.
    pub fn describe<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        let node = build_suite(description, definition);
        self.suite.push_child(node.clone());
        node
    }

    /// Alias of [`SuiteBuilder::describe`].
    pub fn context<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        self.describe(description, definition)
    }

    /// Declares a nested suite whose specs are pending unless forced.
    pub fn xdescribe<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        let node = self.describe(description, definition);
        node.set_pending(true);
        node
    }

    /// Alias of [`SuiteBuilder::xdescribe`].
    pub fn xcontext<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        self.xdescribe(description, definition)
    }

    /// Declares a nested suite that runs even when an enclosing suite is pending.
    pub fn force_describe<F>(&mut self, description: &str, definition: F) -> Rc<SpecNode>
    where
        F: FnOnce(&mut SuiteBuilder<'_>),
    {
        let node = self.describe(description, definition);
        node.set_pending(false);
        node
    }

    /// Declares a spec in this suite.
    pub fn it<F>(&mut self, description: &str, body: F) -> Rc<SpecNode>
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        let node = SpecNode::spec(description, body);
        self.suite.push_child(node.clone());
        node
    }

    /// Declares a pending spec in this suite.
    pub fn xit<F>(&mut self, description: &str, body: F) -> Rc<SpecNode>
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        let node = self.it(description, body);
        node.set_pending(true);
        node
    }

    /// Declares a spec in this suite that runs even when the suite is pending.
    pub fn force_it<F>(&mut self, description: &str, body: F) -> Rc<SpecNode>
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        let node = self.it(description, body);
        node.set_pending(false);
        node
    }

    /// Registers a hook to run before each spec in this suite.
    pub fn before_each<F>(&mut self, set_up: F)
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        self.suite.add_set_up_function(set_up);
    }

    /// Registers a hook to run after each spec in this suite.
    pub fn after_each<F>(&mut self, tear_down: F)
    where
        F: Fn(&Scope) -> SpecResult + 'static,
    {
        self.suite.add_tear_down_function(tear_down);
    }
}

fn build_suite<F>(description: &str, definition: F) -> Rc<SpecNode>
where
    F: FnOnce(&mut SuiteBuilder<'_>),
{
    SpecNode::suite(description, |suite| {
        definition(&mut SuiteBuilder { suite });
    })
}
