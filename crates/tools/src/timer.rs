use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of recent frame durations.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    capacity: usize,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(dt);
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn average(&self) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        self.window.iter().sum::<Duration>() / self.window.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or(Duration::ZERO)
    }

    /// Frames per second implied by the average, 0 when nothing was recorded.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_window_stats() {
        let mut timer = FrameTimer::new(3);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));

        assert_eq!(timer.count(), 3);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert_eq!(timer.max(), Duration::from_millis(30));
        assert_eq!(timer.min(), Duration::from_millis(10));
    }

    #[test]
    fn oldest_sample_drops_out() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(25));
        assert_eq!(timer.min(), Duration::from_millis(20));
    }

    #[test]
    fn fps_from_average() {
        let mut timer = FrameTimer::new(4);
        assert_eq!(timer.fps(), 0.0);
        timer.record(Duration::from_millis(20));
        assert!((timer.fps() - 50.0).abs() < 1e-3);
    }
}
