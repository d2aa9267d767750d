//! Renderable content and the hosts that display it.
//!
//! A node becomes viewable by carrying a [`ViewCapability`]. While it is live
//! its content has to be hosted by exactly one ancestor (or by the tree's
//! surface); the router in this module finds that ancestor.

mod router;
mod stack;
pub mod stub;

pub(crate) use router::{hide, show};
pub use stack::ViewStack;
pub use stub::StubHost;

use smartstring::{LazyCompact, SmartString};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Opaque handle to a node's renderable content, compared by identity.
#[derive(Clone)]
pub struct ViewContent {
    name: SmartString<LazyCompact>,
    inner: Rc<dyn Any>,
}

impl ViewContent {
    pub fn new<T: Any>(name: &str, value: T) -> Self {
        Self {
            name: name.into(),
            inner: Rc::new(value),
        }
    }

    /// Content with nothing behind it but a name.
    pub fn named(name: &str) -> Self {
        Self::new(name, ())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn same_as(&self, other: &ViewContent) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ViewContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewContent").field(&self.name.as_str()).finish()
    }
}

/// A slot able to display content on behalf of descendants.
///
/// Returning `false` from `try_show` declines the content and the router keeps
/// walking up. A hide is only ever sent to the host that accepted the show.
pub trait ViewHost {
    fn try_show(&mut self, content: &ViewContent) -> bool;
    fn try_hide(&mut self, content: &ViewContent) -> bool;
}

pub type SharedViewHost = Rc<RefCell<dyn ViewHost>>;

/// Wrap a host so it can be shared between a node and the caller.
pub fn shared<H: ViewHost + 'static>(host: H) -> Rc<RefCell<H>> {
    Rc::new(RefCell::new(host))
}

/// What makes a node viewable: its own content and, optionally, a slot in
/// which it hosts the content of its descendants.
#[derive(Clone)]
pub struct ViewCapability {
    content: ViewContent,
    host: Option<SharedViewHost>,
}

impl ViewCapability {
    pub fn new(content: ViewContent) -> Self {
        Self {
            content,
            host: None,
        }
    }

    pub fn hosting(mut self, host: SharedViewHost) -> Self {
        self.host = Some(host);
        self
    }

    pub fn content(&self) -> &ViewContent {
        &self.content
    }

    pub fn host(&self) -> Option<&SharedViewHost> {
        self.host.as_ref()
    }
}

impl fmt::Debug for ViewCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCapability")
            .field("content", &self.content)
            .field("hosting", &self.host.is_some())
            .finish()
    }
}
