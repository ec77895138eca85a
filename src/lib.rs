//! Foreground element sizing with cover/contain modes, throttled resize
//! recomputation, and host-tree adapters.
//!
//! Given a container element and a child element (typically an image) with a
//! known intrinsic aspect ratio, this crate resizes and positions the child so
//! it fills or fits the container, mimicking CSS `background-size:
//! cover/contain` — either natively (by switching the container to a CSS
//! background image) or manually (by writing explicit width/height/top/left
//! on every resize tick).
//!
//! The host element tree is consumed through the [`HostTree`] capability
//! trait; nothing here depends on a particular DOM or styling engine. All
//! scheduling is clock-agnostic: callers pass millisecond timestamps in, so
//! the whole crate is testable without real timers.
//!
//! # Modules
//!
//! - [`sizing`] — sizing modes and the manual placement geometry
//! - [`throttle`] — generic leading+trailing rate limiter for resize events
//! - [`controller`] — per-element lifecycle (attach, refresh, recompute, terminate)
//! - [`registry`] — element-identity map with idempotent create/update/destroy

#![forbid(unsafe_code)]

pub mod controller;
pub mod registry;
pub mod sizing;
pub mod throttle;

pub use controller::{Config, HostTree, LayoutController};
pub use registry::Registry;
pub use sizing::{Placement, SizingMode, compute_manual};
pub use throttle::{SubscriptionId, Throttle};

/// Layout engine error.
///
/// Failures are local by design: a bad mode token fails that parse, a missing
/// child fails that element's attach, and neither may take down a batch call
/// or the host process.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Mode token is not one of `cover`, `contain`, `containX`, `containY`.
    #[error("invalid sizing mode {0:?}")]
    InvalidSizingMode(String),

    /// The child selector matched nothing under the container.
    #[error("no child matching selector {selector:?}")]
    ChildNotFound {
        /// Selector that failed to resolve.
        selector: String,
    },
}
