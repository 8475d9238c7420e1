// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::version::format_version;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Issues strictly increasing version identifiers
///
/// Two saves within the same millisecond would otherwise collide on the
/// same versioned path; the clock bumps the second one forward by 1ms.
#[derive(Debug, Default)]
pub struct VersionClock {
    last_millis: AtomicI64,
}

impl VersionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for the current time
    pub fn next(&self) -> String {
        self.next_at(Utc::now())
    }

    /// Identifier for `now`, or 1ms past the previous one if `now` is not later
    pub fn next_at(&self, now: DateTime<Utc>) -> String {
        let now_millis = now.timestamp_millis();
        let previous = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_millis.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let issued = now_millis.max(previous + 1);

        let ts = DateTime::<Utc>::from_timestamp_millis(issued).unwrap_or(now);
        format_version(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::parse_version;

    #[test]
    fn test_same_instant_is_bumped() {
        let clock = VersionClock::new();
        let now = Utc::now();
        let a = clock.next_at(now);
        let b = clock.next_at(now);
        let c = clock.next_at(now);
        assert!(a < b && b < c, "{a} {b} {c}");

        let pa = parse_version(&a).expect("timestamp");
        let pb = parse_version(&b).expect("timestamp");
        assert_eq!((pb - pa).num_milliseconds(), 1);
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let clock = VersionClock::new();
        let now = Utc::now();
        let later = clock.next_at(now);
        let earlier = clock.next_at(now - chrono::Duration::seconds(10));
        assert!(earlier > later);
    }

    #[test]
    fn test_real_clock_is_monotonic() {
        let clock = VersionClock::new();
        let issued: Vec<String> = (0..50).map(|_| clock.next()).collect();
        for pair in issued.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
