//! Process-wide shutdown trigger

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

type Hook = Box<dyn FnOnce() + Send>;

/// Runs registered teardown hooks exactly once when triggered.
///
/// Native handles are released by explicit hooks here, never by `Drop` of a
/// cache that may outlive the rendering or audio context.
#[derive(Default)]
pub struct ShutdownSignal {
    triggered: AtomicBool,
    hooks: Mutex<Vec<(String, Hook)>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. If the signal already fired, the hook runs immediately.
    pub fn on_shutdown<F>(&self, name: impl Into<String>, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let name = name.into();
        {
            let mut hooks = self.hooks.lock();
            if !self.triggered.load(Ordering::Acquire) {
                hooks.push((name, Box::new(hook)));
                return;
            }
        }
        tracing::debug!(hook = %name, "shutdown already triggered, running hook now");
        hook();
    }

    /// Fire the signal. Hooks run in registration order; later calls do nothing.
    pub fn trigger(&self) {
        let hooks = {
            let mut hooks = self.hooks.lock();
            if self.triggered.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *hooks)
        };

        tracing::info!(hooks = hooks.len(), "shutdown triggered");
        for (name, hook) in hooks {
            tracing::debug!(hook = %name, "running shutdown hook");
            hook();
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Number of hooks waiting for the signal
    pub fn pending_hooks(&self) -> usize {
        self.hooks.lock().len()
    }
}
