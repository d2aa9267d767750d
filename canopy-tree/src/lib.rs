pub mod config;
pub mod context;
pub mod dispose;
pub mod error;
mod guard;
pub mod node;
pub mod notify;
mod traverse;
pub mod tree;
pub mod view;
pub mod widget;

use std::rc::Rc;

// Re-export key types
pub use config::TreeConfig;
pub use context::{Argument, LiveContext};
pub use dispose::{CancellationToken, Interrupted, run_until_disposed, try_run_until_disposed};
pub use error::{ErrorKind, Result, TreeError};
pub use node::{HostedBy, NodeBuilder, NodeId, NodeState};
pub use notify::{Channel, Observer, ObserverId, Phase};
pub use tree::{SharedWidgetTree, WidgetTree};
pub use view::{SharedViewHost, StubHost, ViewCapability, ViewContent, ViewHost, ViewStack};
pub use widget::{Blank, HookCx, Widget};

/// Create a tree behind a shared reference.
pub fn shared_tree(config: TreeConfig) -> SharedWidgetTree {
    Rc::new(WidgetTree::with_config(config))
}
