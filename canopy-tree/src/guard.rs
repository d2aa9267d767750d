use crate::error::{Result, TreeError};
use crate::node::NodeId;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::sync::Arc;
use tracing::{trace, warn};

/// Exclusive edit lock on one node, held for a whole structural edit
/// including the traversal it triggers. Released on drop.
pub(crate) struct EditLock {
    node: NodeId,
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl EditLock {
    /// Take the lock without blocking. A node already being edited further up
    /// the stack is rejected rather than waited on.
    pub fn acquire(node: NodeId, lock: &Arc<Mutex<()>>) -> Result<Self> {
        let Some(guard) = lock.try_lock_arc() else {
            warn!(node = %node, "edit rejected, node is already being edited");
            return Err(TreeError::Reentrant { node });
        };
        trace!(node = %node, "edit lock acquired");
        Ok(Self {
            node,
            _guard: guard,
        })
    }
}

impl Drop for EditLock {
    fn drop(&mut self) {
        trace!(node = %self.node, "edit lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_lock_rejects_reentry() {
        let node = NodeId::new(0, 0);
        let lock = Arc::new(Mutex::new(()));

        let held = EditLock::acquire(node, &lock).unwrap();
        assert!(lock.is_locked());

        let err = EditLock::acquire(node, &lock).err().unwrap();
        assert_eq!(err, TreeError::Reentrant { node });
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        drop(held);
        assert!(!lock.is_locked());
        assert!(EditLock::acquire(node, &lock).is_ok());
    }
}
