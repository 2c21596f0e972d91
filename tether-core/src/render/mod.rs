//! Rendering regions over a host tree.
//!
//! A region owns a contiguous run of host nodes right after an anchor
//! placeholder and keeps it in sync with reactive state:
//!
//! - [`KeyedList`]: one node per item of an array, reconciled by key.
//! - [`Conditional`]: a single node present while a condition holds.

mod conditional;
mod host;
mod list;

pub use conditional::Conditional;
pub use host::{HostTree, MemoryTree, NodeId};
pub use list::{diff_keys, ItemContext, KeyDiff, KeyFn, KeyedList, ListKey, ReconcileStats};

/// Output of a template: the node to insert and an optional teardown run
/// when the node is removed for good.
pub struct Rendered<N> {
    pub node: N,
    pub cleanup: Option<Box<dyn FnOnce()>>,
}

impl<N> Rendered<N> {
    pub fn new(node: N) -> Self {
        Self {
            node,
            cleanup: None,
        }
    }

    pub fn with_cleanup(mut self, cleanup: impl FnOnce() + 'static) -> Self {
        self.cleanup = Some(Box::new(cleanup));
        self
    }
}

impl<N: std::fmt::Debug> std::fmt::Debug for Rendered<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rendered")
            .field("node", &self.node)
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}
