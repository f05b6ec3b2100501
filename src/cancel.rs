//! Cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{RefinerError, RefinerResult};

/// Shared flag checked between files, between publish stages and before
/// each upload attempt
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`RefinerError::Cancelled`] once cancellation was requested
    pub fn check(&self) -> RefinerResult<()> {
        if self.is_cancelled() {
            Err(RefinerError::Cancelled)
        } else {
            Ok(())
        }
    }
}
