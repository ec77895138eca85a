//! Generic leading+trailing rate limiter for noisy event streams.
//!
//! Wraps a raw notification stream (viewport resize, typically) so each
//! subscriber is ticked at most once per its configured interval. The first
//! event after a quiet period fires immediately (leading edge); the last
//! event of a burst is always eventually delivered (trailing edge), armed
//! for `last_fire + interval`.
//!
//! The throttle is clock-agnostic: every method takes a caller-supplied
//! millisecond timestamp, and trailing ticks are driven by the caller polling
//! [`Throttle::poll_due`] when [`Throttle::next_deadline`] elapses. No real
//! timer, thread, or global clock is involved, so the whole thing is
//! unit-testable with plain integers.
//!
//! Tokens are opaque to the throttle; due tokens are *returned* for the
//! caller to dispatch rather than invoked as callbacks, which keeps the
//! limiter reusable and free of any controller coupling.

use std::collections::HashMap;

/// Handle identifying one subscription, returned by [`Throttle::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
struct Subscription<T> {
    token: T,
    interval_ms: u64,
    /// Timestamp of the last delivered tick. `None` until the first event.
    last_fire: Option<u64>,
    /// Armed trailing deadline, if a burst event arrived mid-interval.
    deadline: Option<u64>,
}

/// Multi-subscriber leading+trailing throttle.
///
/// Each subscription has its own interval and carries a caller-chosen token.
/// An interval of `0` disables rate limiting for that subscription: every
/// event passes through on the leading edge.
#[derive(Debug)]
pub struct Throttle<T> {
    subs: HashMap<u64, Subscription<T>>,
    next_id: u64,
}

impl<T> Default for Throttle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Throttle<T> {
    /// Create an empty throttle.
    pub fn new() -> Self {
        Self {
            subs: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register a subscriber. Due ticks for it yield clones of `token`.
    pub fn subscribe(&mut self, token: T, interval_ms: u64) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subs.insert(
            id,
            Subscription {
                token,
                interval_ms,
                last_fire: None,
                deadline: None,
            },
        );
        SubscriptionId(id)
    }

    /// Remove a subscription, cancelling any armed trailing tick.
    ///
    /// Unknown ids are ignored; other subscriptions are unaffected.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subs.remove(&id.0);
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }

    /// Feed one raw event at `now_ms`. Returns tokens due on the leading
    /// edge; subscribers mid-interval get a trailing tick armed instead.
    ///
    /// Re-arming is idempotent: the trailing deadline is `last_fire +
    /// interval`, so later events in the same burst never push it back.
    pub fn on_event(&mut self, now_ms: u64) -> Vec<T>
    where
        T: Clone,
    {
        let mut due = Vec::new();
        for sub in self.subs.values_mut() {
            match sub.last_fire {
                Some(last) if now_ms.saturating_sub(last) < sub.interval_ms => {
                    sub.deadline = Some(last + sub.interval_ms);
                }
                _ => {
                    sub.last_fire = Some(now_ms);
                    sub.deadline = None;
                    due.push(sub.token.clone());
                }
            }
        }
        due
    }

    /// Fire armed trailing ticks whose deadline is at or before `now_ms`.
    pub fn poll_due(&mut self, now_ms: u64) -> Vec<T>
    where
        T: Clone,
    {
        let mut due = Vec::new();
        for sub in self.subs.values_mut() {
            if let Some(deadline) = sub.deadline
                && now_ms >= deadline
            {
                sub.deadline = None;
                sub.last_fire = Some(now_ms);
                due.push(sub.token.clone());
            }
        }
        due
    }

    /// Earliest armed trailing deadline, for the caller to set a timer on.
    /// `None` when nothing is pending.
    pub fn next_deadline(&self) -> Option<u64> {
        self.subs.values().filter_map(|sub| sub.deadline).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── leading edge ────────────────────────────────────────────────────

    #[test]
    fn first_event_fires_immediately() {
        let mut throttle = Throttle::new();
        throttle.subscribe("a", 100);
        assert_eq!(throttle.on_event(1_000), vec!["a"]);
        assert_eq!(throttle.next_deadline(), None);
    }

    #[test]
    fn quiet_period_restores_leading_edge() {
        let mut throttle = Throttle::new();
        throttle.subscribe("a", 100);
        assert_eq!(throttle.on_event(0), vec!["a"]);
        // Long quiet gap → next event is a fresh leading fire.
        assert_eq!(throttle.on_event(5_000), vec!["a"]);
    }

    // ── trailing edge ───────────────────────────────────────────────────

    #[test]
    fn burst_fires_leading_then_single_trailing() {
        // Events at t, t+10, t+20 with interval 100: one fire near t,
        // one trailing fire at t+100, nothing else.
        let mut throttle = Throttle::new();
        throttle.subscribe("a", 100);

        assert_eq!(throttle.on_event(0), vec!["a"]);
        assert_eq!(throttle.on_event(10), Vec::<&str>::new());
        assert_eq!(throttle.on_event(20), Vec::<&str>::new());

        assert_eq!(throttle.next_deadline(), Some(100));
        assert_eq!(throttle.poll_due(99), Vec::<&str>::new());
        assert_eq!(throttle.poll_due(100), vec!["a"]);
        // Trailing tick consumed; nothing left pending.
        assert_eq!(throttle.next_deadline(), None);
        assert_eq!(throttle.poll_due(200), Vec::<&str>::new());
    }

    #[test]
    fn later_events_do_not_push_deadline_back() {
        let mut throttle = Throttle::new();
        throttle.subscribe("a", 100);
        throttle.on_event(0);
        throttle.on_event(90);
        assert_eq!(throttle.next_deadline(), Some(100));
        throttle.on_event(99);
        assert_eq!(throttle.next_deadline(), Some(100));
    }

    #[test]
    fn sustained_stream_is_bounded() {
        // Events every 10ms for 500ms with interval 100 → at most
        // ceil(span/interval) + 1 = 6 fires.
        let mut throttle = Throttle::new();
        throttle.subscribe("a", 100);
        let mut fires = 0;
        for t in (0..=500).step_by(10) {
            fires += throttle.on_event(t).len();
            if let Some(deadline) = throttle.next_deadline()
                && deadline <= t
            {
                fires += throttle.poll_due(t).len();
            }
        }
        if throttle.next_deadline().is_some() {
            fires += throttle.poll_due(1_000).len();
        }
        assert!(fires <= 6, "fired {fires} times");
        assert!(fires >= 2, "leading and trailing both expected");
    }

    #[test]
    fn zero_interval_passes_everything_through() {
        let mut throttle = Throttle::new();
        throttle.subscribe("a", 0);
        for t in 0..5 {
            assert_eq!(throttle.on_event(t), vec!["a"]);
        }
        assert_eq!(throttle.next_deadline(), None);
    }

    // ── subscription management ─────────────────────────────────────────

    #[test]
    fn subscriptions_are_independent() {
        let mut throttle = Throttle::new();
        throttle.subscribe("fast", 10);
        throttle.subscribe("slow", 1_000);

        let mut due = throttle.on_event(0);
        due.sort_unstable();
        assert_eq!(due, vec!["fast", "slow"]);

        // 50ms later: fast is past its interval, slow arms a trailing tick.
        let due = throttle.on_event(50);
        assert_eq!(due, vec!["fast"]);
        assert_eq!(throttle.next_deadline(), Some(1_000));
    }

    #[test]
    fn unsubscribe_cancels_pending_trailing_tick() {
        let mut throttle = Throttle::new();
        let id = throttle.subscribe("a", 100);
        throttle.on_event(0);
        throttle.on_event(10);
        assert_eq!(throttle.next_deadline(), Some(100));

        throttle.unsubscribe(id);
        assert_eq!(throttle.subscriber_count(), 0);
        assert_eq!(throttle.next_deadline(), None);
        assert_eq!(throttle.poll_due(200), Vec::<&str>::new());
    }

    #[test]
    fn unsubscribe_unknown_id_is_noop() {
        let mut throttle = Throttle::new();
        let id = throttle.subscribe("a", 100);
        throttle.unsubscribe(id);
        throttle.unsubscribe(id);
        assert_eq!(throttle.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_leaves_others_untouched() {
        let mut throttle = Throttle::new();
        let a = throttle.subscribe("a", 100);
        throttle.subscribe("b", 100);
        throttle.on_event(0);
        throttle.on_event(10); // both armed
        throttle.unsubscribe(a);
        assert_eq!(throttle.poll_due(100), vec!["b"]);
    }
}
