//! Per-element layout lifecycle: attach, refresh, recompute, terminate.
//!
//! A [`LayoutController`] owns the sizing decision for one container element:
//! either delegate to the host styling engine's native `background-size`
//! (image children only, when supported and preferred) or compute explicit
//! pixel placement on every throttled resize tick.
//!
//! State machine: attach picks `Native` or `Manual`;
//! [`LayoutController::refresh_child`] may flip between them when the child
//! element is swapped externally; `Terminated` is absorbing — once set, no
//! operation mutates the host tree again, including a stale resize tick that
//! was already scheduled when the controller was torn down.

use std::hash::Hash;
use std::rc::Rc;

use log::{debug, warn};

use crate::sizing::{self, SizingMode};
use crate::throttle::{SubscriptionId, Throttle};
use crate::LayoutError;

/// Capabilities this crate consumes from the host element tree.
///
/// Handles are opaque, identity-comparable references to externally owned
/// elements; the crate never creates or removes elements, only reads their
/// geometry/attributes and writes named visual properties.
pub trait HostTree {
    /// Opaque element reference. Identity comparison keys the registry map.
    type Handle: Clone + Eq + Hash;

    /// First element under `container` matching `selector`, if any.
    fn find_child(&self, container: &Self::Handle, selector: &str) -> Option<Self::Handle>;

    /// Current rendered box size of an element, in CSS pixels.
    fn box_size(&self, el: &Self::Handle) -> (f64, f64);

    /// Set a named visual property to a value on an element.
    fn set_style(&mut self, el: &Self::Handle, name: &str, value: &str);

    /// Remove every inline visual property from an element.
    fn clear_styles(&mut self, el: &Self::Handle);

    /// The element's current `position` property, if it has one.
    fn position_style(&self, el: &Self::Handle) -> Option<String>;

    /// The element's `ratio` data attribute as a float (width/height).
    fn ratio_data(&self, el: &Self::Handle) -> Option<f64>;

    /// Whether the element is image-like (eligible for native sizing).
    fn is_image(&self, el: &Self::Handle) -> bool;

    /// The element's media source (an image's `src`), if any.
    fn media_source(&self, el: &Self::Handle) -> Option<String>;

    /// Feature detection: does the styling engine support `background-size`?
    fn supports_native_background_size(&self) -> bool;
}

/// Immutable per-registration settings, shared read-only by every controller
/// created from one `create` call.
///
/// Defaults mirror the legacy plugin: `img` child selector, `cover` mode,
/// native sizing preferred, supporting styles applied, 100ms throttle.
///
/// # Example
///
/// ```
/// use fgsize::{Config, SizingMode};
///
/// let config = Config::new()
///     .mode(SizingMode::Contain)
///     .child_selector("video")
///     .throttle_interval_ms(250);
/// assert!(config.prefer_native_sizing);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Selector resolving the sized child under the container.
    pub child_selector: String,
    /// How the child's box relates to the container's box.
    pub mode: SizingMode,
    /// Prefer native background sizing for image children when supported.
    pub prefer_native_sizing: bool,
    /// Write the supporting properties each mode needs (positioning,
    /// overflow, no-repeat) instead of relying on stylesheet rules.
    pub apply_supporting_styles: bool,
    /// Minimum milliseconds between manual recomputes. `0` disables
    /// throttling.
    pub throttle_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a config with the legacy defaults.
    pub fn new() -> Self {
        Self {
            child_selector: "img".to_string(),
            mode: SizingMode::Cover,
            prefer_native_sizing: true,
            apply_supporting_styles: true,
            throttle_interval_ms: 100,
        }
    }

    /// Set the child selector.
    pub fn child_selector(mut self, selector: impl Into<String>) -> Self {
        self.child_selector = selector.into();
        self
    }

    /// Set the sizing mode.
    pub fn mode(mut self, mode: SizingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Prefer or avoid native background sizing.
    pub fn prefer_native_sizing(mut self, prefer: bool) -> Self {
        self.prefer_native_sizing = prefer;
        self
    }

    /// Enable or disable writing supporting styles.
    pub fn apply_supporting_styles(mut self, apply: bool) -> Self {
        self.apply_supporting_styles = apply;
        self
    }

    /// Set the resize throttle interval in milliseconds.
    pub fn throttle_interval_ms(mut self, interval: u64) -> Self {
        self.throttle_interval_ms = interval;
        self
    }
}

/// Which sizing path the controller is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    /// Container carries the image as a CSS background; the styling engine
    /// does the fitting and no resize subscription exists.
    Native,
    /// Explicit width/height/top/left written on every throttled tick.
    Manual,
}

/// Sizing lifecycle for one container element.
///
/// Constructed only through [`LayoutController::attach`], which fails with
/// [`LayoutError::ChildNotFound`] when the selector resolves nothing — an
/// unattached controller cannot exist, so there is no unusable state to
/// guard elsewhere.
pub struct LayoutController<H: HostTree> {
    config: Rc<Config>,
    container: H::Handle,
    child: H::Handle,
    /// Aspect ratio (width/height) from the container's `ratio` data
    /// attribute. `None` means manual sizing runs degenerate (see
    /// `recompute`).
    ratio: Option<f64>,
    mode: Mode,
    terminated: bool,
    subscription: Option<SubscriptionId>,
}

impl<H: HostTree> LayoutController<H> {
    /// Resolve the child, pick the sizing path, apply initial styles, and
    /// (manual mode) subscribe to resize ticks under the container's handle.
    pub fn attach(
        host: &mut H,
        scheduler: &mut Throttle<H::Handle>,
        container: H::Handle,
        config: Rc<Config>,
    ) -> Result<Self, LayoutError> {
        let child = host
            .find_child(&container, &config.child_selector)
            .ok_or_else(|| LayoutError::ChildNotFound {
                selector: config.child_selector.clone(),
            })?;
        let mut controller = Self {
            config,
            container,
            child,
            ratio: None,
            mode: Mode::Manual,
            terminated: false,
            subscription: None,
        };
        controller.enter_mode(host, scheduler);
        Ok(controller)
    }

    /// Re-resolve the child (it may have been swapped externally) and redo
    /// the per-mode setup. The config is not re-decided.
    ///
    /// On [`LayoutError::ChildNotFound`] the controller keeps its previous
    /// child and state.
    pub fn refresh_child(
        &mut self,
        host: &mut H,
        scheduler: &mut Throttle<H::Handle>,
    ) -> Result<(), LayoutError> {
        if self.terminated {
            return Ok(());
        }
        self.child = host
            .find_child(&self.container, &self.config.child_selector)
            .ok_or_else(|| LayoutError::ChildNotFound {
                selector: self.config.child_selector.clone(),
            })?;
        self.enter_mode(host, scheduler);
        Ok(())
    }

    /// Manual-mode tick body: re-read the container box and re-apply the
    /// placement. No-op when terminated (late-tick guard), in native mode,
    /// or while the container box has zero area (not laid out yet — the
    /// sizing engine's documented precondition).
    pub fn recompute(&mut self, host: &mut H) {
        if self.terminated || self.mode != Mode::Manual {
            return;
        }
        let (container_w, container_h) = host.box_size(&self.container);
        if container_w <= 0.0 || container_h <= 0.0 {
            return;
        }
        // Missing ratio is permissive by policy: the warning was logged at
        // attach, and the degenerate (non-finite) geometry is written as-is.
        let ratio = self.ratio.unwrap_or(f64::NAN);
        let p = sizing::compute_manual(container_w, container_h, ratio, self.config.mode);
        host.set_style(&self.child, "width", &px(p.width));
        host.set_style(&self.child, "height", &px(p.height));
        host.set_style(&self.child, "top", &px(p.top));
        host.set_style(&self.child, "left", &px(p.left));
    }

    /// Tear down: unsubscribe and strip every applied style from container
    /// and child, leaving both in the tree unstyled.
    ///
    /// The terminated flag is set before anything else so a resize tick
    /// already dispatched against this controller becomes a no-op.
    pub fn terminate(&mut self, host: &mut H, scheduler: &mut Throttle<H::Handle>) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        if let Some(id) = self.subscription.take() {
            scheduler.unsubscribe(id);
        }
        host.clear_styles(&self.container);
        host.clear_styles(&self.child);
    }

    /// Whether this controller holds a live resize subscription.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Decide native vs manual for the current child and run that branch.
    fn enter_mode(&mut self, host: &mut H, scheduler: &mut Throttle<H::Handle>) {
        let native = self.config.prefer_native_sizing
            && host.supports_native_background_size()
            && host.is_image(&self.child);
        if native {
            self.enter_native(host, scheduler);
        } else {
            self.enter_manual(host, scheduler);
        }
    }

    fn enter_native(&mut self, host: &mut H, scheduler: &mut Throttle<H::Handle>) {
        self.mode = Mode::Native;
        // Native sizing reacts to layout by itself; a leftover manual-mode
        // subscription must go.
        if let Some(id) = self.subscription.take() {
            scheduler.unsubscribe(id);
        }
        if self.config.apply_supporting_styles {
            host.set_style(&self.container, "background-position", "center center");
            host.set_style(&self.container, "background-repeat", "no-repeat");
        }
        host.set_style(&self.child, "display", "none");
        match host.media_source(&self.child) {
            Some(src) => {
                host.set_style(&self.container, "background-image", &format!("url({src})"));
            }
            None => warn!("image child has no media source; background-image not set"),
        }
        host.set_style(
            &self.container,
            "background-size",
            self.config.mode.native_background_size(),
        );
        debug!("native background sizing ({})", self.config.mode);
    }

    fn enter_manual(&mut self, host: &mut H, scheduler: &mut Throttle<H::Handle>) {
        self.mode = Mode::Manual;
        self.ratio = host.ratio_data(&self.container);
        if self.ratio.is_none() {
            warn!("missing ratio data attribute on container; sizing will be degenerate");
        }
        if self.config.apply_supporting_styles {
            host.set_style(&self.container, "overflow", "hidden");
            // The child is positioned against the container, so the
            // container must establish a positioning context.
            let positioned = matches!(
                host.position_style(&self.container).as_deref(),
                Some("fixed") | Some("absolute") | Some("relative")
            );
            if !positioned {
                host.set_style(&self.container, "position", "relative");
            }
            host.set_style(&self.child, "position", "absolute");
            host.set_style(&self.child, "max-width", "none");
            host.set_style(&self.child, "max-height", "none");
        }
        self.recompute(host);
        if self.subscription.is_none() {
            self.subscription = Some(scheduler.subscribe(
                self.container.clone(),
                self.config.throttle_interval_ms,
            ));
        }
        debug!("manual sizing ({}), ratio {:?}", self.config.mode, self.ratio);
    }
}

/// CSS pixel form of a computed value.
fn px(value: f64) -> String {
    format!("{value}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_legacy_plugin() {
        let config = Config::new();
        assert_eq!(config.child_selector, "img");
        assert_eq!(config.mode, SizingMode::Cover);
        assert!(config.prefer_native_sizing);
        assert!(config.apply_supporting_styles);
        assert_eq!(config.throttle_interval_ms, 100);
    }

    #[test]
    fn config_builder_overrides() {
        let config = Config::new()
            .child_selector(".hero > img")
            .mode(SizingMode::ContainY)
            .prefer_native_sizing(false)
            .apply_supporting_styles(false)
            .throttle_interval_ms(0);
        assert_eq!(config.child_selector, ".hero > img");
        assert_eq!(config.mode, SizingMode::ContainY);
        assert!(!config.prefer_native_sizing);
        assert!(!config.apply_supporting_styles);
        assert_eq!(config.throttle_interval_ms, 0);
    }

    #[test]
    fn px_formatting() {
        assert_eq!(px(400.0), "400px");
        assert_eq!(px(-100.0), "-100px");
        assert_eq!(px(12.5), "12.5px");
    }
}
