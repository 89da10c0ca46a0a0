//! Cooperative cancellation flag for in-flight generation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheap cloneable cancellation flag.
///
/// The caller keeps one handle and passes clones down into the extraction
/// pipeline; the decode loop checks it between token steps. Once cancelled
/// a flag stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, uncancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of whatever holds a clone of this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_visible_to_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());

        flag.cancel();
        assert!(clone.is_cancelled());
    }
}
