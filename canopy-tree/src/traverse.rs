//! Attach and detach traversals.
//!
//! Attach is pre-order: a node has its context and its view before any child
//! is attached. Detach is post-order over the children in reverse: every
//! descendant has released its view before the node loses its context.
//!
//! Both traversals validate the whole subtree before the first hook runs. An
//! attach that still fails part way is undone; a detach always runs to the
//! end and reports the first hosting failure afterwards.

use crate::context::{Argument, LiveContext};
use crate::error::{Result, TreeError};
use crate::node::{NodeId, NodeState};
use crate::notify::{self, Phase};
use crate::tree::WidgetTree;
use crate::view;
use crate::widget::HookCx;
use tracing::{debug, warn};

/// States of a subtree captured before an attach, used to undo it.
pub(crate) type Snapshot = Vec<(NodeId, NodeState)>;

/// Fail unless no node of the subtree is locked or mid-transition.
pub(crate) fn check_idle(tree: &WidgetTree, node: NodeId) -> Result<()> {
    for id in tree.descendants_and_self(node)? {
        tree.with_record(id, |r| {
            if r.lock.is_locked() {
                return Err(TreeError::Reentrant { node: id });
            }
            if r.state.is_transitioning() {
                return Err(TreeError::MidTransition {
                    node: id,
                    state: r.state,
                });
            }
            Ok(())
        })??;
    }
    Ok(())
}

/// Fail unless every node of the subtree can be attached.
pub(crate) fn check_attach(tree: &WidgetTree, node: NodeId) -> Result<Snapshot> {
    let mut snapshot = Vec::new();
    for id in tree.descendants_and_self(node)? {
        let state = tree.with_record(id, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node: id });
            }
            if r.lock.is_locked() {
                return Err(TreeError::Reentrant { node: id });
            }
            if r.state.is_live() || r.context.is_some() {
                return Err(TreeError::AlreadyLive {
                    node: id,
                    state: r.state,
                });
            }
            Ok(r.state)
        })??;
        snapshot.push((id, state));
    }
    Ok(snapshot)
}

/// Fail unless every node of the subtree is attached into `context`.
pub(crate) fn check_detach(tree: &WidgetTree, node: NodeId, context: &LiveContext) -> Result<()> {
    for id in tree.descendants_and_self(node)? {
        tree.with_record(id, |r| {
            if r.disposed {
                return Err(TreeError::Disposed { node: id });
            }
            if r.lock.is_locked() {
                return Err(TreeError::Reentrant { node: id });
            }
            if r.state.is_transitioning() {
                return Err(TreeError::MidTransition {
                    node: id,
                    state: r.state,
                });
            }
            if r.state != NodeState::Attached {
                return Err(TreeError::NotAttached {
                    node: id,
                    state: r.state,
                });
            }
            match &r.context {
                Some(current) if current.same_as(context) => Ok(()),
                _ => Err(TreeError::ContextMismatch { node: id }),
            }
        })??;
    }
    Ok(())
}

/// Attach `node` and its subtree into `context`. On failure every node is put
/// back in the state it had before and the error is returned.
pub(crate) fn attach_subtree(
    tree: &WidgetTree,
    node: NodeId,
    context: &LiveContext,
    argument: Option<&Argument>,
) -> Result<()> {
    let snapshot = check_attach(tree, node)?;
    attach_node(tree, node, context, argument).inspect_err(|err| {
        warn!(node = %node, error = %err, "attach failed, rolling back");
        rollback(tree, node, &snapshot);
    })
}

fn attach_node(
    tree: &WidgetTree,
    node: NodeId,
    context: &LiveContext,
    argument: Option<&Argument>,
) -> Result<()> {
    notify::before(tree, node, Phase::BeforeAttach, argument)?;

    tree.with_record_mut(node, |r| {
        r.context = Some(context.clone());
        r.state = NodeState::Attaching;
    })?;

    let widget = tree.widget_handle(node)?;
    widget.on_attach(&HookCx::new(tree, node, argument));

    if tree.is_viewable(node)? {
        view::show(tree, node)?;
    }

    for child in tree.children(node)? {
        attach_node(tree, child, context, argument)?;
    }

    tree.with_record_mut(node, |r| r.state = NodeState::Attached)?;
    debug!(node = %node, label = %tree.label(node)?, "attached");

    notify::after(tree, node, Phase::AfterAttach, argument)
}

/// Release every view shown during a failed attach and restore the recorded
/// states. No hooks run. Nodes linked in by hooks go back to `Detached`.
fn rollback(tree: &WidgetTree, node: NodeId, snapshot: &Snapshot) {
    let Ok(ids) = tree.descendants_and_self(node) else {
        return;
    };
    for id in ids.into_iter().rev() {
        if let Ok(Some(_)) = tree.view_host(id) {
            if let Err(err) = view::hide(tree, id) {
                warn!(node = %id, error = %err, "view not released during rollback");
            }
        }
        let state = snapshot
            .iter()
            .find(|(recorded, _)| *recorded == id)
            .map_or(NodeState::Detached, |&(_, state)| state);
        let _ = tree.with_record_mut(id, |r| {
            if r.context.is_some() {
                r.state = state;
                r.context = None;
            }
        });
    }
}

/// Detach `node` and its subtree from `context`.
pub(crate) fn detach_subtree(
    tree: &WidgetTree,
    node: NodeId,
    context: &LiveContext,
    argument: Option<&Argument>,
) -> Result<()> {
    check_detach(tree, node, context)?;
    let mut failure = None;
    detach_node(tree, node, argument, &mut failure)?;
    failure.map_or(Ok(()), Err)
}

fn detach_node(
    tree: &WidgetTree,
    node: NodeId,
    argument: Option<&Argument>,
    failure: &mut Option<TreeError>,
) -> Result<()> {
    notify::before(tree, node, Phase::BeforeDetach, argument)?;

    tree.with_record_mut(node, |r| r.state = NodeState::Detaching)?;

    for child in tree.children(node)?.into_iter().rev() {
        detach_node(tree, child, argument, failure)?;
    }

    if tree.is_viewable(node)? {
        if let Err(err) = view::hide(tree, node) {
            failure.get_or_insert(err);
        }
    }

    let widget = tree.widget_handle(node)?;
    widget.on_detach(&HookCx::new(tree, node, argument));

    tree.with_record_mut(node, |r| {
        r.state = NodeState::Detached;
        r.context = None;
    })?;
    debug!(node = %node, label = %tree.label(node)?, "detached");

    notify::after(tree, node, Phase::AfterDetach, argument)
}
