//! Frame delivery: the scheduler seam and the budgeted default loop.

use core::time::Duration;
use log::trace;
use std::time::Instant;

/// Handle of one frame subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a scheduler-assigned raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Recurring "next frame" callbacks, as delivered by an animation-frame loop.
///
/// Subscribers stay subscribed until they unsubscribe; every delivered frame
/// reports all current subscribers.
pub trait FrameScheduler {
    /// Subscribe to upcoming frames.
    fn subscribe(&mut self) -> SubscriptionId;
    /// Cancel a subscription. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
    /// Advance the loop to `now`, returning the subscribers a frame was delivered to.
    fn poll(&mut self, now: Instant) -> Vec<SubscriptionId>;
}

/// Frame loop that coalesces work into frames with a given time budget.
///
/// A frame is delivered only if at least `budget` has elapsed since the
/// previous delivered frame; polls inside the window are deferred. The loop
/// is idle (polls deliver nothing and cost nothing) while nobody subscribes.
pub struct FrameLoop {
    /// The minimum time interval between delivered frames.
    budget: Duration,
    /// Timestamp of the most recent frame that was delivered.
    last_frame_start: Option<Instant>,
    /// Number of polls denied by the frame budget (spillover).
    deferred_count: u64,
    /// Number of frames delivered.
    frame_count: u64,
    subscribers: Vec<SubscriptionId>,
    next_id: u64,
}

impl FrameLoop {
    /// Creates a new frame loop with the specified time budget.
    #[inline]
    #[must_use]
    pub const fn new(budget: Duration) -> Self {
        Self {
            budget,
            last_frame_start: None,
            deferred_count: 0,
            frame_count: 0,
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// Returns the configured frame budget duration.
    #[inline]
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Returns the number of polls deferred by the budget since creation.
    #[inline]
    #[must_use]
    pub const fn deferred(&self) -> u64 {
        self.deferred_count
    }

    /// Returns the number of frames delivered since creation.
    #[inline]
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frame_count
    }

    /// Number of live subscriptions.
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether `id` is still subscribed.
    #[inline]
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.contains(&id)
    }

    /// Checks if a new frame budget window has started at `now`.
    fn allow(&mut self, now: Instant) -> bool {
        match self.last_frame_start {
            Some(start) if now.saturating_duration_since(start) < self.budget => false,
            _ => {
                self.last_frame_start = Some(now);
                true
            }
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_FRAME_BUDGET_MS))
    }
}

impl FrameScheduler for FrameLoop {
    fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push(id);
        trace!("FrameLoop: subscribed {id:?} ({} live)", self.subscribers.len());
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|live| *live != id);
    }

    fn poll(&mut self, now: Instant) -> Vec<SubscriptionId> {
        if self.subscribers.is_empty() {
            return Vec::new();
        }
        if !self.allow(now) {
            self.deferred_count = self.deferred_count.saturating_add(1);
            trace!("FrameLoop: frame deferred, budget not met");
            return Vec::new();
        }
        self.frame_count = self.frame_count.saturating_add(1);
        self.subscribers.clone()
    }
}
