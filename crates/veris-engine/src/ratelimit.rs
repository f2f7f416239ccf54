//! # Per-Requester Rate Limiter
//!
//! Three independent rolling counters per requester (minute, hour, day),
//! each with its own reset deadline. Counters reset lazily: when a call
//! arrives past a counter's deadline, the counter zeroes and the
//! deadline advances by the window length. A request is admitted only
//! when all three counters are under their ceilings, and then all three
//! increment as one unit under a single write lock.
//!
//! The critical section is O(1) and never blocks; one lock guarding the
//! whole bucket map is fine even though different requesters' buckets
//! are logically independent.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use veris_core::RequesterId;

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    reset_at: DateTime<Utc>,
}

impl WindowCounter {
    fn new(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + window,
        }
    }

    fn roll(&mut self, now: DateTime<Utc>, window: Duration) {
        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = now + window;
        }
    }

    /// 0 means the window is unlimited.
    fn under(&self, ceiling: u32) -> bool {
        ceiling == 0 || self.count < ceiling
    }
}

#[derive(Debug, Clone, Copy)]
struct Buckets {
    minute: WindowCounter,
    hour: WindowCounter,
    day: WindowCounter,
}

impl Buckets {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            minute: WindowCounter::new(now, Duration::minutes(1)),
            hour: WindowCounter::new(now, Duration::hours(1)),
            day: WindowCounter::new(now, Duration::days(1)),
        }
    }
}

/// Sliding-window admission control keyed by requester.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: RwLock<HashMap<RequesterId, Buckets>>,
}

impl RateLimiter {
    /// Create a limiter with the given ceilings.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or reject one request at `now`. Admission increments all
    /// three counters atomically as a unit.
    pub fn allow(&self, requester: &RequesterId, now: DateTime<Utc>) -> bool {
        if !self.config.enabled {
            return true;
        }

        let mut buckets = self.buckets.write();
        let entry = buckets
            .entry(requester.clone())
            .or_insert_with(|| Buckets::new(now));

        entry.minute.roll(now, Duration::minutes(1));
        entry.hour.roll(now, Duration::hours(1));
        entry.day.roll(now, Duration::days(1));

        let minute_ceiling = self.config.per_minute.saturating_add(self.config.burst);
        let admitted = entry
            .minute
            .under(if self.config.per_minute == 0 { 0 } else { minute_ceiling })
            && entry.hour.under(self.config.per_hour)
            && entry.day.under(self.config.per_day);

        if admitted {
            entry.minute.count += 1;
            entry.hour.count += 1;
            entry.day.count += 1;
        }
        admitted
    }

    /// Clear all counters for a requester immediately. Administrative
    /// override, not part of normal traffic.
    pub fn reset(&self, requester: &RequesterId) {
        self.buckets.write().remove(requester);
    }

    /// Number of requesters with live buckets.
    pub fn tracked_requesters(&self) -> usize {
        self.buckets.read().len()
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn exactly_n_admissions_for_any_ceiling(ceiling in 1u32..50) {
            let limiter = RateLimiter::new(RateLimitConfig {
                enabled: true,
                per_minute: ceiling,
                per_hour: 0,
                per_day: 0,
                burst: 0,
            });
            let requester = RequesterId::new();
            let now = Utc::now();

            for _ in 0..ceiling {
                prop_assert!(limiter.allow(&requester, now));
            }
            prop_assert!(!limiter.allow(&requester, now));

            // After the window's reset deadline, admission resumes.
            prop_assert!(limiter.allow(&requester, now + Duration::seconds(60)));
        }
    }
}
