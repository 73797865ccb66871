//! Global admission rate limiting.
//!
//! A single token bucket of capacity one is shared by every caller. It refills
//! continuously at `rate_limit / 60` tokens per second; a request either takes
//! the token or is rejected immediately. Nothing queues.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ProxyError;

/// Burst size of the shared bucket.
const BUCKET_CAPACITY: f64 = 1.0;

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        // A caller that sampled the clock before the last update sees no refill.
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        if now > self.last_update {
            self.last_update = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Process-wide rate gate. Disabled gates admit everything.
#[derive(Debug)]
pub struct RateGate {
    bucket: Option<Mutex<TokenBucket>>,
    refill_per_sec: f64,
}

impl RateGate {
    /// Create a gate admitting `requests_per_minute` on average. 0 disables it.
    pub fn new(requests_per_minute: u32) -> Self {
        if requests_per_minute == 0 {
            return Self::disabled();
        }
        Self {
            bucket: Some(Mutex::new(TokenBucket::new(BUCKET_CAPACITY, Instant::now()))),
            refill_per_sec: f64::from(requests_per_minute) / 60.0,
        }
    }

    pub fn disabled() -> Self {
        Self {
            bucket: None,
            refill_per_sec: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Take the token if one is available. Never blocks on time.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        let Some(bucket) = &self.bucket else {
            return true;
        };
        let mut bucket = bucket.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        bucket.try_acquire(now, BUCKET_CAPACITY, self.refill_per_sec)
    }

    /// Admit or reject as a pipeline stage.
    pub fn check(&self) -> Result<(), ProxyError> {
        if self.try_acquire() {
            Ok(())
        } else {
            Err(ProxyError::RateLimited)
        }
    }
}

/// Middleware applying the shared gate ahead of the proxy handler.
pub async fn rate_limit_middleware(
    State(gate): State<Arc<RateGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.check() {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_disabled_gate_admits_everything() {
        let gate = RateGate::new(0);
        assert!(!gate.is_enabled());
        assert!((0..1000).all(|_| gate.try_acquire()));
    }

    #[test]
    fn test_single_token_then_refill() {
        let gate = RateGate::new(60);
        let start = Instant::now();

        assert!(gate.try_acquire_at(start));
        assert!(!gate.try_acquire_at(start));
        assert!(!gate.try_acquire_at(start + Duration::from_millis(500)));
        assert!(gate.try_acquire_at(start + Duration::from_millis(1000)));
        assert!(!gate.try_acquire_at(start + Duration::from_millis(1001)));
    }

    #[test]
    fn test_capacity_never_exceeds_one() {
        let gate = RateGate::new(60);
        let later = Instant::now() + Duration::from_secs(3600);

        assert!(gate.try_acquire_at(later));
        assert!(!gate.try_acquire_at(later));
    }

    #[test]
    fn test_stale_clock_sample_does_not_refill() {
        let gate = RateGate::new(60);
        let start = Instant::now();

        assert!(gate.try_acquire_at(start + Duration::from_secs(2)));
        assert!(!gate.try_acquire_at(start));
    }

    #[test]
    fn test_concurrent_callers_never_double_spend() {
        let gate = Arc::new(RateGate::new(1));
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let gate = gate.clone();
                std::thread::spawn(move || (0..100).filter(|_| gate.try_acquire()).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_check_maps_to_rate_limited() {
        let gate = RateGate::new(1);
        assert!(gate.check().is_ok());
        assert!(matches!(gate.check(), Err(ProxyError::RateLimited)));
    }
}
