use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the scheduler and any thread.
///
/// Generation checks the flag between stages, so cancelling never leaves a
/// half-built room in the pool.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes the request.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Reports whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::CancellationToken;
    use std::thread;

    #[test]
    fn cancellation_is_visible_across_threads() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || remote.cancel());
        handle.join().expect("cancelling thread panicked");
        assert!(token.is_cancelled());
    }
}
