use std::collections::VecDeque;

/// Number of frames kept by [`FpsHistory`].
pub const FPS_HISTORY_LEN: usize = 128;

/// Rolling window of frames-per-second samples for the overlay plot.
#[derive(Debug, Clone)]
pub struct FpsHistory {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl Default for FpsHistory {
    fn default() -> Self {
        Self::with_capacity(FPS_HISTORY_LEN)
    }
}

impl FpsHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a frame that took `dt` seconds. Non-positive deltas are ignored.
    pub fn push(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(1.0 / dt);
    }

    /// Oldest sample first.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    pub fn min(&self) -> Option<f32> {
        self.samples().reduce(f32::min)
    }

    pub fn max(&self) -> Option<f32> {
        self.samples().reduce(f32::max)
    }

    pub fn average(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples().sum::<f32>() / self.samples.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_no_stats() {
        let history = FpsHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.average(), None);
        assert_eq!(history.min(), None);
    }

    #[test]
    fn stats_over_samples() {
        let mut history = FpsHistory::default();
        history.push(0.5);
        history.push(0.25);
        history.push(0.1);
        assert_eq!(history.min(), Some(2.0));
        assert_eq!(history.max(), Some(10.0));
        assert_eq!(history.latest(), Some(10.0));
        assert!((history.average().unwrap() - 16.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn window_drops_oldest() {
        let mut history = FpsHistory::with_capacity(3);
        for dt in [1.0, 0.5, 0.25, 0.125] {
            history.push(dt);
        }
        assert_eq!(history.samples().collect::<Vec<_>>(), vec![2.0, 4.0, 8.0]);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut history = FpsHistory::default();
        history.push(0.0);
        history.push(f32::NAN);
        assert!(history.is_empty());
    }
}
