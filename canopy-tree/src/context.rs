//! Opaque payloads threaded through traversals.
//!
//! The tree never looks inside these values. A [`LiveContext`] is the
//! container a subtree is attached into (a screen, a scene, a window) and is
//! compared by identity. An [`Argument`] is whatever the caller wants hooks to
//! see for one particular edit.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// The live container a node is attached into.
#[derive(Clone)]
pub struct LiveContext(Rc<dyn Any>);

impl LiveContext {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn from_rc<T: Any>(value: Rc<T>) -> Self {
        Self(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Identity comparison, two clones of one context are the same context.
    pub fn same_as(&self, other: &LiveContext) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LiveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LiveContext({:p})", Rc::as_ptr(&self.0))
    }
}

/// Per-edit payload handed to every hook fired by that edit.
#[derive(Clone)]
pub struct Argument(Rc<dyn Any>);

impl Argument {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Argument({:p})", Rc::as_ptr(&self.0))
    }
}
