//! Cooperative shutdown signal for the keep-alive loop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Clonable stop flag that sleeping waiters observe immediately.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every waiter.
    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock() = true;
        cvar.notify_all();
    }

    /// Whether shutdown was requested.
    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for up to `timeout`, returning early once triggered.
    ///
    /// Returns whether the signal is triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock();
        if !*triggered {
            let _ = cvar.wait_for(&mut triggered, timeout);
        }
        *triggered
    }
}
