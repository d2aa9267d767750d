use crate::node::{NodeId, NodeState};
use thiserror::Error;

/// Broad classification of a [`TreeError`].
///
/// Every failure is a contract violation by the caller; none of them are
/// transient and none are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A bad argument: unknown node, wrong parent, unexpected payload.
    Argument,
    /// The operation is not legal in the node's current lifecycle state.
    InvalidState,
    /// The operation references a disposed node.
    Disposed,
    /// A view could not be shown or hidden by any host.
    Hosting,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {node} does not exist in this tree")]
    UnknownNode { node: NodeId },

    #[error("node {child} is already a child of {parent}")]
    AlreadyParented { child: NodeId, parent: NodeId },

    #[error("adding {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("argument passed while editing {node}, but {node} is not attached")]
    UnexpectedArgument { node: NodeId },

    #[error("node {node} holds a {found} widget, expected {expected}")]
    TypeMismatch {
        node: NodeId,
        expected: &'static str,
        found: &'static str,
    },

    #[error("node {parent} has no child of type {expected}")]
    NoChildOfType {
        parent: NodeId,
        expected: &'static str,
    },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("node {node} is already live ({state:?})")]
    AlreadyLive { node: NodeId, state: NodeState },

    #[error("node {node} must be attached, found {state:?}")]
    NotAttached { node: NodeId, state: NodeState },

    #[error("node {node} must not be live to be disposed, found {state:?}")]
    StillLive { node: NodeId, state: NodeState },

    #[error("node {node} is still a child of {parent}")]
    StillParented { node: NodeId, parent: NodeId },

    #[error("node {node} must be disposed first")]
    NotDisposed { node: NodeId },

    #[error("child {child} of {node} is not disposed")]
    ChildrenNotDisposed { node: NodeId, child: NodeId },

    #[error("node {node} is locked by an edit in progress")]
    Reentrant { node: NodeId },

    #[error("node {node} is mid-transition ({state:?})")]
    MidTransition { node: NodeId, state: NodeState },

    #[error("node {node} is attached to a different context")]
    ContextMismatch { node: NodeId },

    #[error("node {node} is not a root (parent is {parent})")]
    NotRoot { node: NodeId, parent: NodeId },

    #[error("node {node} is disposed")]
    Disposed { node: NodeId },

    #[error("no ancestor of {node} accepted its view")]
    Unhosted { node: NodeId },

    #[error("view of {node} is already shown")]
    ViewAlreadyShown { node: NodeId },

    #[error("view of {node} is not shown")]
    ViewNotShown { node: NodeId },
}

impl TreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::UnknownNode { .. }
            | TreeError::AlreadyParented { .. }
            | TreeError::Cycle { .. }
            | TreeError::UnexpectedArgument { .. }
            | TreeError::TypeMismatch { .. }
            | TreeError::NoChildOfType { .. } => ErrorKind::Argument,

            TreeError::NotAChild { .. }
            | TreeError::AlreadyLive { .. }
            | TreeError::NotAttached { .. }
            | TreeError::StillLive { .. }
            | TreeError::StillParented { .. }
            | TreeError::NotDisposed { .. }
            | TreeError::ChildrenNotDisposed { .. }
            | TreeError::Reentrant { .. }
            | TreeError::MidTransition { .. }
            | TreeError::ContextMismatch { .. }
            | TreeError::NotRoot { .. } => ErrorKind::InvalidState,

            TreeError::Disposed { .. } => ErrorKind::Disposed,

            TreeError::Unhosted { .. }
            | TreeError::ViewAlreadyShown { .. }
            | TreeError::ViewNotShown { .. } => ErrorKind::Hosting,
        }
    }

    /// The node the error is about.
    pub fn node(&self) -> NodeId {
        match *self {
            TreeError::UnknownNode { node }
            | TreeError::UnexpectedArgument { node }
            | TreeError::TypeMismatch { node, .. }
            | TreeError::AlreadyLive { node, .. }
            | TreeError::NotAttached { node, .. }
            | TreeError::StillLive { node, .. }
            | TreeError::StillParented { node, .. }
            | TreeError::NotDisposed { node }
            | TreeError::ChildrenNotDisposed { node, .. }
            | TreeError::Reentrant { node }
            | TreeError::MidTransition { node, .. }
            | TreeError::ContextMismatch { node }
            | TreeError::NotRoot { node, .. }
            | TreeError::Disposed { node }
            | TreeError::Unhosted { node }
            | TreeError::ViewAlreadyShown { node }
            | TreeError::ViewNotShown { node } => node,
            TreeError::AlreadyParented { child, .. }
            | TreeError::Cycle { child, .. }
            | TreeError::NotAChild { child, .. } => child,
            TreeError::NoChildOfType { parent, .. } => parent,
        }
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let node = NodeId::new(3, 0);
        assert_eq!(TreeError::UnknownNode { node }.kind(), ErrorKind::Argument);
        assert_eq!(TreeError::Reentrant { node }.kind(), ErrorKind::InvalidState);
        assert_eq!(TreeError::Disposed { node }.kind(), ErrorKind::Disposed);
        assert_eq!(TreeError::Unhosted { node }.kind(), ErrorKind::Hosting);
        assert_eq!(
            TreeError::NotAChild {
                parent: NodeId::new(0, 0),
                child: node,
            }
            .kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TreeError::AlreadyParented {
            child: NodeId::new(2, 0),
            parent: NodeId::new(1, 0),
        };
        assert_eq!(err.to_string(), "node #2 is already a child of #1");
        assert_eq!(err.node(), NodeId::new(2, 0));

        let err = TreeError::StillLive {
            node: NodeId::new(4, 1),
            state: NodeState::Attached,
        };
        assert_eq!(
            err.to_string(),
            "node #4v1 must not be live to be disposed, found Attached"
        );
    }
}
