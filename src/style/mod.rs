//! Applying runtime themes to a render target.

pub(crate) mod injector;
pub(crate) mod target;

pub use injector::{AppliedStyle, PAGE_PLACEHOLDER, StyleHandle, StyleInjector, StyleOpts};
pub use target::{DocumentTarget, SnapshotTarget, StyleElement, StyleRule, StyleTarget, TargetOp};
