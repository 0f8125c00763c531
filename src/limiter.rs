use governor::{
    clock::Clock,
    middleware::RateLimitingMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::config::RateLimitConfig;

/// Admission check shared by every request that goes through one limiter
pub trait Limiter: Send + Sync {
    /// Take one cell. Returns false when the burst is used up.
    fn try_acquire(&self) -> bool;
}

impl<C, MW> Limiter for RateLimiter<NotKeyed, InMemoryState, C, MW>
where
    C: Clock,
    MW: RateLimitingMiddleware<C::Instant>,
    Self: Send + Sync,
{
    fn try_acquire(&self) -> bool {
        self.check().is_ok()
    }
}

/// `capacity` cells up front, one more every `1 / refill_per_second`.
/// Zero values fall back to one.
pub fn quota(config: &RateLimitConfig) -> Quota {
    let burst = non_zero("capacity", config.capacity);
    let rate = non_zero("refill_per_second", config.refill_per_second);
    Quota::per_second(rate).allow_burst(burst)
}

/// Limiter on the wall clock
pub fn direct(config: &RateLimitConfig) -> Arc<dyn Limiter> {
    Arc::new(RateLimiter::direct(quota(config)))
}

/// Limiter on a caller-supplied clock, e.g. `FakeRelativeClock` in tests
pub fn direct_with_clock<C>(config: &RateLimitConfig, clock: &C) -> Arc<dyn Limiter>
where
    C: Clock + Send + Sync + 'static,
    C::Instant: Send + Sync,
{
    Arc::new(RateLimiter::direct_with_clock(quota(config), clock))
}

fn non_zero(field: &str, value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or_else(|| {
        tracing::warn!("rate limit {} is 0, using 1", field);
        NonZeroU32::MIN
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::time::Duration;

    fn config(capacity: u32, refill_per_second: u32) -> RateLimitConfig {
        RateLimitConfig {
            capacity,
            refill_per_second,
        }
    }

    fn drain(limiter: &dyn Limiter) -> usize {
        let mut taken = 0;
        while limiter.try_acquire() {
            taken += 1;
        }
        taken
    }

    #[test]
    fn allows_burst_then_rejects() {
        let clock = FakeRelativeClock::default();
        let limiter = direct_with_clock(&config(5, 5), &clock);
        assert_eq!(drain(limiter.as_ref()), 5);
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn one_cell_returns_exactly_one_interval_after_drain() {
        let clock = FakeRelativeClock::default();
        let limiter = direct_with_clock(&config(5, 5), &clock);
        drain(limiter.as_ref());

        clock.advance(Duration::from_millis(199));
        assert!(!limiter.try_acquire());

        clock.advance(Duration::from_millis(1));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn polling_never_loses_a_cell() {
        let clock = FakeRelativeClock::default();
        let limiter = direct_with_clock(&config(5, 5), &clock);
        drain(limiter.as_ref());

        let mut granted = 0;
        for _ in 0..50 {
            clock.advance(Duration::from_millis(20));
            if limiter.try_acquire() {
                granted += 1;
            }
        }
        // 50 x 20ms = 1s at 5 per second
        assert_eq!(granted, 5);
    }

    #[test]
    fn full_second_restores_the_burst() {
        let clock = FakeRelativeClock::default();
        let limiter = direct_with_clock(&config(5, 5), &clock);
        drain(limiter.as_ref());

        clock.advance(Duration::from_secs(1));
        assert_eq!(drain(limiter.as_ref()), 5);
    }

    #[test]
    fn never_exceeds_capacity() {
        let clock = FakeRelativeClock::default();
        let limiter = direct_with_clock(&config(2, 5), &clock);
        clock.advance(Duration::from_secs(60));
        assert_eq!(drain(limiter.as_ref()), 2);
    }

    #[test]
    fn separate_limiters_do_not_share_state() {
        let clock = FakeRelativeClock::default();
        let a = direct_with_clock(&config(1, 1), &clock);
        let b = direct_with_clock(&config(1, 1), &clock);
        assert!(a.try_acquire());
        assert!(!a.try_acquire());
        assert!(b.try_acquire());
    }

    #[test]
    fn zero_capacity_falls_back_to_one() {
        let clock = FakeRelativeClock::default();
        let limiter = direct_with_clock(&config(0, 0), &clock);
        assert_eq!(drain(limiter.as_ref()), 1);
    }
}
