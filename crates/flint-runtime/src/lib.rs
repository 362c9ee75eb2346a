//! Flint Runtime - Cross-subsystem plumbing for the content runtime
//!
//! Provides the building blocks that connect caches to the subsystems owning
//! native contexts:
//! - `EventBus` - typed topic publish/subscribe
//! - `DisposalNotifier` / `TeardownQueue` - logical removal announced, native
//!   teardown performed on the owning thread
//! - `ShutdownSignal` - explicit, once-only process teardown hooks

mod disposal;
mod event_bus;
mod shutdown;

pub use disposal::{DisposalNotification, DisposalNotifier, TeardownQueue};
pub use event_bus::{EventBus, SubscriptionId};
pub use shutdown::ShutdownSignal;
