//! Cooperative cancellation for long-running searches.
//!
//! The genetic algorithm, simulated annealing and the backtracking solver
//! poll a [`CancelToken`] once per generation, temperature step or search
//! step respectively. A token trips when [`CancelToken::cancel`] is called
//! from any clone, or when its wall-clock deadline passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag with an optional deadline.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only trips when cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips once `budget` has elapsed from now.
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + budget),
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested or the deadline passed.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        matches!(self.deadline, Some(dl) if Instant::now() >= dl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_not_cancelled() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn test_cancel_visible_through_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_zero_timeout_trips_immediately() {
        let token = CancelToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_long_timeout_does_not_trip() {
        let token = CancelToken::with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
    }
}
