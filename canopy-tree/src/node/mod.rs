mod arena;
mod types;

pub(crate) use arena::NodeArena;
pub(crate) use types::{Label, NodeRecord};
pub use types::{HostedBy, NodeBuilder, NodeId, NodeState};
