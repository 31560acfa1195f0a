//! Cooperative cancellation for long-running analytics calls.
//!
//! The source dialect (spec §5/§9) uses implicit blocking calls with a
//! cancellation token; we model that directly with OS threads rather than
//! pulling in an async runtime the teacher never depended on. Algorithms
//! call [`CancellationToken::check`] at least once per outer iteration and
//! at least every 100ms of wall time, per spec §5.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Returned out-of-band from `Tool::execute` when a call observes
/// cancellation — distinct from a validation failure or an algorithmic one
/// (spec §7: "propagate as the idiomatic cancellation error instead of a
/// `Result`").
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct CancelError;

/// Shared cancellation flag plus an optional wall-clock deadline.
///
/// Cheap to clone (an `Arc` around an `AtomicBool`); a single token can be
/// handed to every analytics call made within one `Tool::execute`.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// A token that is never cancelled and never times out.
    pub fn none() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// A token bound to a wall-clock timeout from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// An already-cancelled token, useful for testing the cancellation path
    /// (spec §8 scenario S7).
    pub fn cancelled() -> Self {
        let token = Self::none();
        token.cancel();
        token
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True if cancellation was requested or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::SeqCst) {
            return true;
        }
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    /// Returns `Err(CancelError)` if cancelled, `Ok(())` otherwise.
    ///
    /// Call this at loop-iteration granularity in every analytics algorithm
    /// that can run long (SCC, Leiden, PageRank, path enumeration).
    pub fn check(&self) -> Result<(), CancelError> {
        if self.is_cancelled() {
            Err(CancelError)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::none()
    }
}

/// Helper for bounding a loop by wall-clock time in addition to iteration
/// count, used by algorithms with a "check every 100ms" obligation even
/// when cancellation itself is not requested.
pub struct DeadlineClock {
    last_check: Instant,
    interval: Duration,
}

impl DeadlineClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_check: Instant::now(),
            interval,
        }
    }

    /// True once `interval` has elapsed since the previous `true` result.
    pub fn due(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_check) >= self.interval {
            self.last_check = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_cancels() {
        let token = CancellationToken::none();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancelled_is_cancelled() {
        let token = CancellationToken::cancelled();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(CancelError));
    }

    #[test]
    fn cancel_is_observed_across_clones() {
        let token = CancellationToken::none();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn deadline_expires() {
        let token = CancellationToken::with_timeout(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(token.is_cancelled());
    }
}
