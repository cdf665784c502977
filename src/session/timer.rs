use std::time::{Duration, Instant};

/// Converts wall-clock ticks into quiz time.
///
/// Time only accumulates while the caller reports the quiz as running; the
/// first sample after a pause sets a new baseline, so paused time never counts.
#[derive(Clone, Debug, Default)]
pub struct QuizTimer {
    last: Option<Instant>,
}

impl QuizTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `now` (a new question appeared).
    pub fn restart(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.last = None;
    }

    /// Time elapsed since the previous sample, or `None` when not running or
    /// when this sample only establishes the baseline.
    pub fn elapsed(&mut self, now: Instant, running: bool) -> Option<Duration> {
        if !running {
            self.last = None;
            return None;
        }
        let prev = self.last.replace(now)?;
        Some(now.saturating_duration_since(prev))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_between_samples() {
        let t0 = Instant::now();
        let mut timer = QuizTimer::new();
        timer.restart(t0);
        assert_eq!(timer.elapsed(t0 + Duration::from_millis(100), true), Some(Duration::from_millis(100)));
        assert_eq!(timer.elapsed(t0 + Duration::from_millis(250), true), Some(Duration::from_millis(150)));
    }

    #[test]
    fn test_paused_time_is_skipped() {
        let t0 = Instant::now();
        let mut timer = QuizTimer::new();
        timer.restart(t0);
        assert_eq!(timer.elapsed(t0 + Duration::from_secs(1), false), None);
        // First sample after resuming only sets the baseline.
        assert_eq!(timer.elapsed(t0 + Duration::from_secs(10), true), None);
        assert_eq!(timer.elapsed(t0 + Duration::from_millis(10_100), true), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_stop_resets_baseline() {
        let t0 = Instant::now();
        let mut timer = QuizTimer::new();
        timer.restart(t0);
        timer.stop();
        assert_eq!(timer.elapsed(t0 + Duration::from_secs(2), true), None);
    }
}
