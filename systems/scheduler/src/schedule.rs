use std::time::Duration;

use puzzle_director_core::SessionTime;

/// Fixed-interval task driven by the session clock.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PeriodicTask {
    interval: Duration,
    last_run: SessionTime,
}

impl PeriodicTask {
    pub(crate) const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: SessionTime::ZERO,
        }
    }

    /// Returns the time since the previous run when the task is due, and
    /// marks it as run.
    pub(crate) fn poll(&mut self, now: SessionTime) -> Option<Duration> {
        let elapsed = now.saturating_since(self.last_run);
        if elapsed < self.interval {
            return None;
        }
        self.last_run = now;
        Some(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::PeriodicTask;
    use puzzle_director_core::SessionTime;
    use std::time::Duration;

    #[test]
    fn fires_once_per_interval() {
        let mut task = PeriodicTask::new(Duration::from_secs(2));
        assert_eq!(task.poll(SessionTime::from_secs(1)), None);
        assert_eq!(task.poll(SessionTime::from_secs(2)), Some(Duration::from_secs(2)));
        assert_eq!(task.poll(SessionTime::from_secs(3)), None);
        assert_eq!(task.poll(SessionTime::from_secs(5)), Some(Duration::from_secs(3)));
    }
}
