use crate::context::{Argument, LiveContext};
use crate::node::{NodeId, NodeState};
use crate::tree::WidgetTree;
use std::any::Any;
use tokio_util::sync::CancellationToken;

/// What a hook or observer sees when it is invoked.
pub struct HookCx<'a> {
    pub tree: &'a WidgetTree,
    /// The node whose hook or observer is running.
    pub node: NodeId,
    pub argument: Option<&'a Argument>,
}

impl<'a> HookCx<'a> {
    pub(crate) fn new(tree: &'a WidgetTree, node: NodeId, argument: Option<&'a Argument>) -> Self {
        Self {
            tree,
            node,
            argument,
        }
    }

    /// Context of the node, present while it is attaching, attached or detaching.
    pub fn context(&self) -> Option<LiveContext> {
        self.tree.context(self.node).ok().flatten()
    }

    pub fn state(&self) -> Option<NodeState> {
        self.tree.state(self.node).ok()
    }

    pub fn dispose_token(&self) -> Option<CancellationToken> {
        self.tree.dispose_token(self.node).ok()
    }

    pub fn argument<T: Any>(&self) -> Option<&T> {
        self.argument.and_then(|a| a.downcast_ref::<T>())
    }
}

/// Behaviour attached to a node.
///
/// Every hook has an empty default. Hooks take `&self`; widgets that keep
/// state use interior mutability. No tree borrow is held while a hook runs, so
/// hooks may query the tree and issue further edits through `cx.tree`; edits
/// that would corrupt the traversal in progress are rejected by the tree.
pub trait Widget: Any {
    fn before_attach(&self, _cx: &HookCx<'_>) {}

    /// Called once the node has its context, before any child is attached.
    fn on_attach(&self, _cx: &HookCx<'_>) {}

    fn after_attach(&self, _cx: &HookCx<'_>) {}

    fn before_detach(&self, _cx: &HookCx<'_>) {}

    /// Called after every child has been detached, while the context is still set.
    fn on_detach(&self, _cx: &HookCx<'_>) {}

    fn after_detach(&self, _cx: &HookCx<'_>) {}

    fn before_descendant_attach(&self, _cx: &HookCx<'_>, _descendant: NodeId) {}

    fn after_descendant_attach(&self, _cx: &HookCx<'_>, _descendant: NodeId) {}

    fn before_descendant_detach(&self, _cx: &HookCx<'_>, _descendant: NodeId) {}

    fn after_descendant_detach(&self, _cx: &HookCx<'_>, _descendant: NodeId) {}

    /// Called during disposal once every child is disposed, before the node's
    /// dispose token is cancelled.
    fn on_dispose(&self, _cx: &HookCx<'_>) {}
}

/// A purely structural widget with no behaviour of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blank;

impl Widget for Blank {}
