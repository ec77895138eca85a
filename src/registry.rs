//! Element-identity registry with idempotent create/update/destroy.
//!
//! One [`Registry`] instance owns the controller map and the shared resize
//! throttle — an explicit object passed by reference to call sites, not
//! ambient global state, and nothing is stashed on the externally owned
//! elements themselves.
//!
//! Batch calls operate per element, independently: one element failing to
//! attach (or not being managed at all) never stops the rest of the batch.
//!
//! The environment feeds its raw resize stream in through
//! [`Registry::notify_resize`] and drives trailing throttle ticks by calling
//! [`Registry::run_due`] when [`Registry::next_deadline`] elapses. Delivery
//! order across independent elements within one tick is unspecified.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};

use crate::controller::{Config, HostTree, LayoutController};
use crate::throttle::Throttle;

/// Maps container element identity to its [`LayoutController`].
pub struct Registry<H: HostTree> {
    controllers: HashMap<H::Handle, LayoutController<H>>,
    scheduler: Throttle<H::Handle>,
}

impl<H: HostTree> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostTree> Registry<H> {
    /// Create an empty registry with its own resize throttle.
    pub fn new() -> Self {
        Self {
            controllers: HashMap::new(),
            scheduler: Throttle::new(),
        }
    }

    /// Attach a controller to each element that does not already have one.
    ///
    /// Re-registering a managed element is a no-op (no duplicate controller,
    /// no duplicate resize subscription). Elements whose child cannot be
    /// resolved are skipped with a warning; the rest of the batch proceeds.
    pub fn create(&mut self, host: &mut H, elements: &[H::Handle], config: Config) {
        let config = Rc::new(config);
        for el in elements {
            if self.controllers.contains_key(el) {
                debug!("element already managed; create skipped");
                continue;
            }
            match LayoutController::attach(
                host,
                &mut self.scheduler,
                el.clone(),
                Rc::clone(&config),
            ) {
                Ok(controller) => {
                    self.controllers.insert(el.clone(), controller);
                }
                Err(err) => warn!("element not attached: {err}"),
            }
        }
    }

    /// Re-resolve the child of each managed element and redo its mode setup.
    ///
    /// Unmanaged elements are skipped; a failed re-resolve leaves that
    /// controller on its previous child.
    pub fn update(&mut self, host: &mut H, elements: &[H::Handle]) {
        for el in elements {
            let Some(controller) = self.controllers.get_mut(el) else {
                continue;
            };
            if let Err(err) = controller.refresh_child(host, &mut self.scheduler) {
                warn!("element not updated: {err}");
            }
        }
    }

    /// Terminate and drop the controller of each managed element: styles are
    /// cleared on container and child, subscriptions removed. The elements
    /// stay in the tree. Unmanaged elements are skipped.
    pub fn destroy(&mut self, host: &mut H, elements: &[H::Handle]) {
        for el in elements {
            if let Some(mut controller) = self.controllers.remove(el) {
                controller.terminate(host, &mut self.scheduler);
            }
        }
    }

    /// Feed one raw resize notification at `now_ms`; leading-edge ticks are
    /// dispatched to their controllers immediately.
    pub fn notify_resize(&mut self, host: &mut H, now_ms: u64) {
        let due = self.scheduler.on_event(now_ms);
        self.dispatch(host, due);
    }

    /// Fire trailing throttle ticks due at `now_ms`.
    pub fn run_due(&mut self, host: &mut H, now_ms: u64) {
        let due = self.scheduler.poll_due(now_ms);
        self.dispatch(host, due);
    }

    /// Earliest pending trailing-tick deadline, for the environment to set
    /// its timer on. `None` when no tick is pending.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Whether the element currently has a controller.
    pub fn is_managed(&self, el: &H::Handle) -> bool {
        self.controllers.contains_key(el)
    }

    /// Number of managed elements.
    pub fn managed_count(&self) -> usize {
        self.controllers.len()
    }

    /// Number of live resize subscriptions (manual-mode controllers).
    pub fn subscription_count(&self) -> usize {
        self.scheduler.subscriber_count()
    }

    fn dispatch(&mut self, host: &mut H, due: Vec<H::Handle>) {
        for token in due {
            // A tick can outlive its controller (destroy raced a pending
            // trailing tick); unknown tokens are dropped here.
            if let Some(controller) = self.controllers.get_mut(&token) {
                controller.recompute(host);
            }
        }
    }
}
