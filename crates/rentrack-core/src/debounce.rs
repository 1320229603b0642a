//! # Detection Debouncer
//!
//! A tag held in front of the antenna is reported several times a second.
//! The debouncer turns that stream into one detection per approach.
//!
//! ```text
//!   t=0s    T  ──► dispatch   (records T@0)
//!   t=3s    T  ──► suppress   (same tag, 3s < 5s)
//!   t=4s    U  ──► dispatch   (different tag, records U@4)
//!   t=6s    T  ──► dispatch   (last dispatched was U)
//! ```
//!
//! Only dispatched detections are recorded, so a tag left in range fires
//! again once per cooldown rather than never.

use std::time::{Duration, Instant};

use crate::frame::TagId;
use crate::DEFAULT_DEBOUNCE_COOLDOWN_SECS;

/// Suppresses repeat detections of the last dispatched tag within a cooldown.
#[derive(Debug, Clone)]
pub struct Debouncer {
    cooldown: Duration,
    last: Option<(TagId, Instant)>,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Returns `true` if this detection should reach the active view.
    ///
    /// ## Example
    /// ```rust
    /// use std::time::{Duration, Instant};
    /// use rentrack_core::{Debouncer, TagId};
    ///
    /// let tag = TagId::parse("a55a0019833000e200001b260c02562050e0f800").unwrap();
    /// let mut debouncer = Debouncer::new(Duration::from_secs(5));
    /// let t0 = Instant::now();
    ///
    /// assert!(debouncer.should_dispatch(&tag, t0));
    /// assert!(!debouncer.should_dispatch(&tag, t0 + Duration::from_secs(3)));
    /// assert!(debouncer.should_dispatch(&tag, t0 + Duration::from_secs(6)));
    /// ```
    pub fn should_dispatch(&mut self, tag: &TagId, now: Instant) -> bool {
        if let Some((last_tag, last_at)) = &self.last {
            // saturating: events from the reader thread can arrive stamped
            // slightly before the previous one was processed
            if last_tag == tag && now.saturating_duration_since(*last_at) < self.cooldown {
                return false;
            }
        }

        self.last = Some((tag.clone(), now));
        true
    }

    /// Forgets the last dispatched tag.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_DEBOUNCE_COOLDOWN_SECS))
    }
}
