use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, TimeZone, Utc};

/// Request header carrying the current time in milliseconds since the Unix
/// epoch. Only honored in test mode.
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The time a request is handled at. Unparseable test headers fall back to the clock.
pub fn request_now(clock: &dyn Clock, headers: &HeaderMap, test_mode: bool) -> DateTime<Utc> {
    if test_mode {
        let header_now = headers
            .get(TEST_NOW_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());
        if let Some(now) = header_now {
            return now;
        }
    }
    clock.now()
}
