//! Input debouncing.

use std::time::Duration;

use tokio::time::Instant;

/// Quiet period used when nothing else is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Coalesces bursts of values into the last one, released after a quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer that releases values after `delay` of quiet.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Returns true if a value is waiting to be released.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value without waiting.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Waits until the pending value has been quiet for the full delay.
    ///
    /// Pending forever while nothing is queued. Cancel safe: the value is
    /// only taken once the deadline has passed.
    pub async fn ready(&mut self) -> T {
        let Some(deadline) = self.pending.as_ref().map(|(_, deadline)| *deadline) else {
            return std::future::pending().await;
        };
        tokio::time::sleep_until(deadline).await;
        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_value() {
        let mut debouncer = Debouncer::default();

        debouncer.push("s");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("st");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("star");
        let last_push = Instant::now();

        let value = debouncer.ready().await;

        assert_eq!(value, "star");
        assert!(last_push.elapsed() >= DEFAULT_DEBOUNCE);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_nothing_pending_never_resolves() {
        let mut debouncer: Debouncer<String> = Debouncer::new(Duration::from_millis(50));

        let mut ready = tokio_test::task::spawn(debouncer.ready());

        tokio_test::assert_pending!(ready.poll());
        tokio_test::assert_pending!(ready.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_keeps_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.push(1);

        let early = tokio::time::timeout(Duration::from_millis(100), debouncer.ready()).await;
        assert!(early.is_err());
        assert!(debouncer.is_pending());

        assert_eq!(debouncer.ready().await, 1);
    }

    #[test]
    fn test_flush_takes_value_once() {
        let mut debouncer = Debouncer::new(Duration::from_secs(1));
        debouncer.push("a");
        assert_eq!(debouncer.flush(), Some("a"));
        assert_eq!(debouncer.flush(), None);
        assert!(!debouncer.is_pending());
    }
}
