//! Lifecycle notifications.
//!
//! Each node has four self channels and four descendant channels. At every
//! node a notification first runs the widget's hook method, then the
//! registered observers in registration order.
//!
//! Before-notifications travel leaf-to-root: the subject's own hook, then its
//! parent, grandparent and so on. After-notifications travel root-to-leaf: the
//! subject's own hook, then the root, down to the immediate parent.

use crate::context::Argument;
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::WidgetTree;
use crate::widget::HookCx;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforeAttach,
    AfterAttach,
    BeforeDetach,
    AfterDetach,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::BeforeAttach => "before-attach",
            Phase::AfterAttach => "after-attach",
            Phase::BeforeDetach => "before-detach",
            Phase::AfterDetach => "after-detach",
        }
    }
}

/// An event stream a node can be observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The node's own transition.
    Own(Phase),
    /// The transition of any node below it.
    Descendant(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observer callback. The second argument is the node that is transitioning:
/// the observed node itself on `Own` channels, a descendant otherwise.
pub type Observer = Rc<dyn Fn(&HookCx<'_>, NodeId)>;

type ObserverList = SmallVec<[(ObserverId, Observer); 2]>;

/// Observer lists keyed by node and channel.
pub(crate) struct ObserverRegistry {
    lists: HashMap<(NodeId, Channel), ObserverList>,
    next_id: u64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn add(&mut self, node: NodeId, channel: Channel, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.lists
            .entry((node, channel))
            .or_default()
            .push((id, observer));
        id
    }

    /// Remove an observer from whichever channel of `node` it was registered on.
    pub fn remove(&mut self, node: NodeId, id: ObserverId) -> bool {
        let mut removed = false;
        self.lists.retain(|(owner, _), list| {
            if *owner == node {
                let before = list.len();
                list.retain(|(entry, _)| *entry != id);
                removed |= list.len() != before;
            }
            !list.is_empty()
        });
        removed
    }

    /// Clone the observers of one channel so they can run without a borrow.
    pub fn snapshot(&self, node: NodeId, channel: Channel) -> SmallVec<[Observer; 2]> {
        self.lists
            .get(&(node, channel))
            .map(|list| list.iter().map(|(_, observer)| observer.clone()).collect())
            .unwrap_or_default()
    }

    pub fn clear_node(&mut self, node: NodeId) {
        self.lists.retain(|(owner, _), _| *owner != node);
    }

    pub fn count(&self, node: NodeId, channel: Channel) -> usize {
        self.lists.get(&(node, channel)).map_or(0, |list| list.len())
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn notify_own(tree: &WidgetTree, node: NodeId, phase: Phase, argument: Option<&Argument>) -> Result<()> {
    let widget = tree.widget_handle(node)?;
    let cx = HookCx::new(tree, node, argument);

    if tree.config().logs_notifications() {
        trace!(node = %node, phase = phase.as_str(), "self hook");
    }
    match phase {
        Phase::BeforeAttach => widget.before_attach(&cx),
        Phase::AfterAttach => widget.after_attach(&cx),
        Phase::BeforeDetach => widget.before_detach(&cx),
        Phase::AfterDetach => widget.after_detach(&cx),
    }

    for observer in tree.observers_for(node, Channel::Own(phase)) {
        observer(&cx, node);
    }
    Ok(())
}

fn notify_ancestor(
    tree: &WidgetTree,
    ancestor: NodeId,
    subject: NodeId,
    phase: Phase,
    argument: Option<&Argument>,
) -> Result<()> {
    let widget = tree.widget_handle(ancestor)?;
    let cx = HookCx::new(tree, ancestor, argument);

    if tree.config().logs_notifications() {
        trace!(node = %ancestor, subject = %subject, phase = phase.as_str(), "descendant hook");
    }
    match phase {
        Phase::BeforeAttach => widget.before_descendant_attach(&cx, subject),
        Phase::AfterAttach => widget.after_descendant_attach(&cx, subject),
        Phase::BeforeDetach => widget.before_descendant_detach(&cx, subject),
        Phase::AfterDetach => widget.after_descendant_detach(&cx, subject),
    }

    for observer in tree.observers_for(ancestor, Channel::Descendant(phase)) {
        observer(&cx, subject);
    }
    Ok(())
}

/// Fire a before-phase: the node's own hook, then every ancestor from the
/// parent up to the root.
pub(crate) fn before(
    tree: &WidgetTree,
    node: NodeId,
    phase: Phase,
    argument: Option<&Argument>,
) -> Result<()> {
    notify_own(tree, node, phase, argument)?;
    for ancestor in tree.ancestors(node)? {
        notify_ancestor(tree, ancestor, node, phase, argument)?;
    }
    Ok(())
}

/// Fire an after-phase: the node's own hook, then every ancestor from the
/// root down to the parent.
pub(crate) fn after(
    tree: &WidgetTree,
    node: NodeId,
    phase: Phase,
    argument: Option<&Argument>,
) -> Result<()> {
    notify_own(tree, node, phase, argument)?;
    for ancestor in tree.ancestors(node)?.into_iter().rev() {
        notify_ancestor(tree, ancestor, node, phase, argument)?;
    }
    Ok(())
}
