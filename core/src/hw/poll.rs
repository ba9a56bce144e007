//! hw/poll.rs
//! Bounded-or-unbounded polling with cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::hw::registers::HardwareError;

/// Shared stop flag. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// `None` polls until ready or cancelled.
    pub max_attempts: Option<u32>,
    /// Sleep between attempts.
    pub backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff: Duration::from_micros(10),
        }
    }
}

impl PollPolicy {
    pub const fn new(max_attempts: Option<u32>, backoff: Duration) -> Self {
        Self { max_attempts, backoff }
    }

    /// Give up after `attempts` checks.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready,
    Exhausted,
    Cancelled,
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready)
    }
}

/// Call `ready` until it returns `true`, the policy's attempt cap is hit, or
/// `cancel` is set. A hardware error ends polling immediately.
pub fn poll_until<F>(
    policy: &PollPolicy,
    cancel: Option<&CancelToken>,
    mut ready: F,
) -> Result<PollOutcome, HardwareError>
where
    F: FnMut() -> Result<bool, HardwareError>,
{
    let mut attempts: u32 = 0;
    loop {
        if ready()? {
            return Ok(PollOutcome::Ready);
        }
        attempts = attempts.saturating_add(1);

        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Ok(PollOutcome::Cancelled);
        }
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Ok(PollOutcome::Exhausted);
        }
        if !policy.backoff.is_zero() {
            thread::sleep(policy.backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PollPolicy {
        PollPolicy::new(None, Duration::ZERO)
    }

    #[test]
    fn ready_after_some_attempts() {
        let mut calls = 0;
        let outcome = poll_until(&fast(), None, || {
            calls += 1;
            Ok(calls == 5)
        })
        .unwrap();
        assert_eq!(outcome, PollOutcome::Ready);
        assert_eq!(calls, 5);
    }

    #[test]
    fn attempt_cap_is_honoured() {
        let mut calls = 0;
        let outcome = poll_until(&fast().with_max_attempts(3), None, || {
            calls += 1;
            Ok(false)
        })
        .unwrap();
        assert_eq!(outcome, PollOutcome::Exhausted);
        assert_eq!(calls, 3);
    }

    #[test]
    fn cancellation_stops_unbounded_poll() {
        let token = CancelToken::new();
        let remote = token.clone();
        let mut calls = 0;
        let outcome = poll_until(&fast(), Some(&token), || {
            calls += 1;
            if calls == 2 {
                remote.cancel();
            }
            Ok(false)
        })
        .unwrap();
        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(token.is_cancelled());
    }

    #[test]
    fn errors_propagate() {
        let err = poll_until(&fast(), None, || {
            Err(HardwareError::Bus { name: "X".into(), msg: "timeout".into() })
        });
        assert!(err.is_err());
    }
}
