//! Run-wide rate limit for AcoustID lookups
//!
//! AcoustID allows 3 requests per second per application key. Permits are
//! spaced evenly with a burst of one, so no 1-second window ever sees more
//! than three lookups. One throttle is created per run and shared by every
//! lookup through the resolver.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// AcoustID rate limit: 3 requests/second
pub const ACOUSTID_REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

/// Evenly spaced permit source
pub struct LookupThrottle {
    limiter: DefaultDirectRateLimiter,
}

impl LookupThrottle {
    /// At most `max` permits in any 1-second window
    pub fn per_second(max: NonZeroU32) -> Self {
        Self::with_period(Duration::from_millis(1000 / u64::from(max.get()) + 1))
    }

    /// One permit per `period`, no burst
    pub fn with_period(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::MIN);

        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Wait until the next lookup may be issued
    pub async fn acquire(&self) {
        if self.limiter.check().is_err() {
            tracing::debug!("AcoustID rate limiting: waiting for next permit");
            self.limiter.until_ready().await;
        }
    }
}

impl Default for LookupThrottle {
    fn default() -> Self {
        Self::per_second(ACOUSTID_REQUESTS_PER_SECOND)
    }
}
