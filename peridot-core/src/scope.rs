//! Implements the per-node execution scope.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// A schema-free bag of named attributes owned by exactly one spec node.
///
/// Hooks and spec bodies receive the scope of the node that registered them as their
/// first parameter; anything they store here can be read back through that node's
/// [`SpecNode::scope`](crate::SpecNode::scope). Attributes are type-erased: reading a
/// name that was never set, or reading it as the wrong type, yields `None`.
#[derive(Default)]
pub struct Scope {
    /// Attributes keyed by name, in insertion order.
    attributes: RefCell<IndexMap<String, Rc<dyn Any>>>,
}

impl Scope {
    /// Returns a new, empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under the given name, if one is set and has type `T`.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the attribute to look up.
    pub fn get<T: Any>(&self, name: &str) -> Option<Rc<T>> {
        let value = self.attributes.borrow().get(name).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Returns a clone of the value stored under the given name, if one is set and has
    /// type `T`.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the attribute to look up.
    pub fn get_cloned<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.get::<T>(name).map(|value| value.as_ref().clone())
    }

    /// Stores a value under the given name, replacing any previous value.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the attribute.
    /// * `value` - The value to store.
    pub fn set<T: Any>(&self, name: impl Into<String>, value: T) {
        self.attributes
            .borrow_mut()
            .insert(name.into(), Rc::new(value));
    }

    /// Removes the attribute with the given name, returning whether it was present.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the attribute to remove.
    pub fn remove(&self, name: &str) -> bool {
        self.attributes.borrow_mut().shift_remove(name).is_some()
    }

    /// Returns whether an attribute with the given name is set.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.borrow().contains_key(name)
    }

    /// Returns the names of all set attributes, in the order they were first set.
    pub fn names(&self) -> Vec<String> {
        self.attributes.borrow().keys().cloned().collect()
    }

    /// Returns the number of set attributes.
    pub fn len(&self) -> usize {
        self.attributes.borrow().len()
    }

    /// Returns whether no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.attributes.borrow().is_empty()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("attributes", &self.names())
            .finish()
    }
}
