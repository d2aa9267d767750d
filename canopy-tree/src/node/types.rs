use crate::context::LiveContext;
use crate::view::ViewCapability;
use crate::widget::Widget;
use parking_lot::Mutex;
use smartstring::{LazyCompact, SmartString};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Unique identifier for a node.
///
/// The generation distinguishes a recycled slot from the node that used it
/// before, so a stale id never aliases a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

/// Attach state of a node.
///
/// `Attaching` and `Detaching` only exist while a traversal is on the stack,
/// so they can only be observed from hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Unattached,
    Attaching,
    Attached,
    Detaching,
    Detached,
}

impl NodeState {
    /// `Attaching`, `Attached` or `Detaching`: the node holds a context.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            NodeState::Attaching | NodeState::Attached | NodeState::Detaching
        )
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, NodeState::Attaching | NodeState::Detaching)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeState::Unattached => "unattached",
            NodeState::Attaching => "attaching",
            NodeState::Attached => "attached",
            NodeState::Detaching => "detaching",
            NodeState::Detached => "detached",
        }
    }
}

/// Where a shown view currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostedBy {
    Ancestor(NodeId),
    Surface,
}

pub(crate) type Label = SmartString<LazyCompact>;

/// Storage for a single node inside the arena.
pub(crate) struct NodeRecord {
    pub label: Label,
    pub state: NodeState,
    pub disposed: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub context: Option<LiveContext>,
    pub dispose_on_detach: bool,
    pub widget: Rc<dyn Widget>,
    pub widget_type: &'static str,
    pub view: Option<ViewCapability>,
    pub hosted_by: Option<HostedBy>,
    pub dispose_token: Option<CancellationToken>,
    pub lock: Arc<Mutex<()>>,
}

impl NodeRecord {
    pub fn is_viewable(&self) -> bool {
        self.view.is_some()
    }
}

/// Construction options for a node.
pub struct NodeBuilder {
    pub(crate) label: Option<Label>,
    pub(crate) widget: Rc<dyn Widget>,
    pub(crate) widget_type: &'static str,
    pub(crate) view: Option<ViewCapability>,
    pub(crate) dispose_on_detach: Option<bool>,
}

impl NodeBuilder {
    pub fn new<W: Widget>(widget: W) -> Self {
        Self::from_rc(Rc::new(widget))
    }

    /// Build from a widget the caller keeps a handle to.
    pub fn from_rc<W: Widget>(widget: Rc<W>) -> Self {
        Self {
            label: None,
            widget,
            widget_type: std::any::type_name::<W>(),
            view: None,
            dispose_on_detach: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Give the node renderable content, making it viewable.
    pub fn view(mut self, view: ViewCapability) -> Self {
        self.view = Some(view);
        self
    }

    /// Override the tree's default dispose-on-detach policy for this node.
    pub fn dispose_on_detach(mut self, dispose: bool) -> Self {
        self.dispose_on_detach = Some(dispose);
        self
    }
}
