use super::{SharedViewHost, ViewContent};
use crate::error::{Result, TreeError};
use crate::node::{HostedBy, NodeId};
use crate::tree::WidgetTree;
use tracing::{trace, warn};

/// Show the content of a viewable node in the nearest accepting host.
pub(crate) fn show(tree: &WidgetTree, node: NodeId) -> Result<HostedBy> {
    let (content, hosted_by) = tree.with_record(node, |r| {
        (r.view.as_ref().map(|v| v.content().clone()), r.hosted_by)
    })?;
    let Some(content) = content else {
        return Err(TreeError::Unhosted { node });
    };
    if hosted_by.is_some() {
        return Err(TreeError::ViewAlreadyShown { node });
    }

    let host = route(tree, node, &content)?;
    tree.with_record_mut(node, |r| r.hosted_by = Some(host))?;
    Ok(host)
}

/// Hide the content of a viewable node through the host that showed it.
///
/// The node no longer counts as hosted afterwards, even when that host
/// refuses the request.
pub(crate) fn hide(tree: &WidgetTree, node: NodeId) -> Result<HostedBy> {
    let (content, hosted_by) = tree.with_record_mut(node, |r| {
        (r.view.as_ref().map(|v| v.content().clone()), r.hosted_by.take())
    })?;
    let (Some(content), Some(hosted_by)) = (content, hosted_by) else {
        return Err(TreeError::ViewNotShown { node });
    };

    let host = match hosted_by {
        HostedBy::Ancestor(ancestor) => hosting_slot(tree, ancestor)?,
        HostedBy::Surface => tree.surface(),
    };
    match host {
        Some(host) if host.borrow_mut().try_hide(&content) => {
            trace!(node = %node, view = content.name(), "hide");
            Ok(hosted_by)
        }
        _ => {
            warn!(node = %node, view = content.name(), "recorded host refused hide request");
            Err(TreeError::ViewNotShown { node })
        }
    }
}

fn hosting_slot(tree: &WidgetTree, node: NodeId) -> Result<Option<SharedViewHost>> {
    tree.with_record(node, |r| r.view.as_ref().and_then(|v| v.host().cloned()))
}

/// Walk from the parent towards the root asking every hosting slot in turn,
/// then fall back to the tree's surface.
fn route(tree: &WidgetTree, node: NodeId, content: &ViewContent) -> Result<HostedBy> {
    let mut current = tree.parent(node)?;
    while let Some(ancestor) = current {
        if let Some(host) = hosting_slot(tree, ancestor)? {
            if host.borrow_mut().try_show(content) {
                trace!(node = %node, host = %ancestor, view = content.name(), "show");
                return Ok(HostedBy::Ancestor(ancestor));
            }
        }
        current = tree.parent(ancestor)?;
    }

    if let Some(surface) = tree.surface() {
        if surface.borrow_mut().try_show(content) {
            trace!(node = %node, view = content.name(), "show on surface");
            return Ok(HostedBy::Surface);
        }
    }

    warn!(node = %node, view = content.name(), "no host accepted show request");
    Err(TreeError::Unhosted { node })
}
