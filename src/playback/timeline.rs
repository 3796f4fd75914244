//! Shot sequence timeline: the immutable snapshot the player runs over.
//!
//! The player takes its own copy of the shot list when it opens; edits made
//! in the store while the player is up do not reach an open timeline. Start
//! and end times are prefix sums computed once at construction, so
//! `sum(end_time(i) - start_time(i))` telescopes to `total_duration` exactly.

use crate::store::Shot;

/// An ordered sequence of timed shots with precomputed boundaries.
#[derive(Debug, Clone)]
pub struct Timeline {
    shots: Vec<Shot>,
    /// `starts[i]` is the global time at which shot `i` begins;
    /// `starts[len]` is the total duration.
    starts: Vec<f64>,
}

impl Timeline {
    /// Builds a timeline over a snapshot of shots, in sequence order.
    pub fn new(shots: Vec<Shot>) -> Self {
        let mut starts = Vec::with_capacity(shots.len() + 1);
        let mut t = 0.0;
        starts.push(t);
        for shot in &shots {
            t += shot.duration;
            starts.push(t);
        }
        Self { shots, starts }
    }

    /// Number of shots in the sequence.
    pub fn len(&self) -> usize {
        self.shots.len()
    }

    /// True for a sequence with no shots.
    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// The shot at an index.
    pub fn shot(&self, index: usize) -> Option<&Shot> {
        self.shots.get(index)
    }

    /// All shots, in sequence order.
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    /// Global time at which shot `index` begins.
    pub fn start_time(&self, index: usize) -> f64 {
        self.starts[index]
    }

    /// Global time at which shot `index` ends.
    pub fn end_time(&self, index: usize) -> f64 {
        self.starts[index + 1]
    }

    /// Sum of all shot durations.
    pub fn total_duration(&self) -> f64 {
        *self.starts.last().unwrap_or(&0.0)
    }

    /// The index of the shot covering global time `t`, clamped to the last
    /// shot for `t` past the end. Must not be called on an empty timeline.
    pub fn index_at(&self, t: f64) -> usize {
        debug_assert!(!self.is_empty());
        // Zero-duration shots never cover any instant; the scan skips them.
        for i in 0..self.shots.len() {
            if t < self.end_time(i) {
                return i;
            }
        }
        self.shots.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(durations: &[f64]) -> Timeline {
        Timeline::new(
            durations
                .iter()
                .enumerate()
                .map(|(i, d)| Shot::new((i + 1) as i32).with_duration(*d))
                .collect(),
        )
    }

    #[test]
    fn test_boundaries() {
        let tl = timeline(&[3.5, 2.0, 4.5]);
        assert_eq!(tl.start_time(0), 0.0);
        assert_eq!(tl.end_time(0), 3.5);
        assert_eq!(tl.start_time(1), 3.5);
        assert_eq!(tl.end_time(1), 5.5);
        assert_eq!(tl.start_time(2), 5.5);
        assert_eq!(tl.end_time(2), 10.0);
        assert_eq!(tl.total_duration(), 10.0);
    }

    #[test]
    fn test_durations_sum_exactly_to_total() {
        let tl = timeline(&[0.3, 1.7, 2.9, 0.1, 4.4]);
        let summed: f64 = (0..tl.len()).map(|i| tl.end_time(i) - tl.start_time(i)).sum();
        // Prefix sums telescope, so this holds exactly in floating point.
        assert_eq!(summed, tl.total_duration());
    }

    #[test]
    fn test_index_at() {
        let tl = timeline(&[3.5, 2.0, 4.5]);
        assert_eq!(tl.index_at(0.0), 0);
        assert_eq!(tl.index_at(3.4), 0);
        assert_eq!(tl.index_at(3.5), 1);
        assert_eq!(tl.index_at(5.5), 2);
        assert_eq!(tl.index_at(9.9), 2);
        assert_eq!(tl.index_at(10.0), 2);
        assert_eq!(tl.index_at(99.0), 2);
    }

    #[test]
    fn test_index_at_skips_zero_duration_shots() {
        let tl = timeline(&[1.0, 0.0, 2.0]);
        assert_eq!(tl.index_at(0.5), 0);
        // The zero-duration shot covers no instant.
        assert_eq!(tl.index_at(1.0), 2);
    }

    #[test]
    fn test_empty_timeline_total() {
        let tl = Timeline::new(Vec::new());
        assert!(tl.is_empty());
        assert_eq!(tl.total_duration(), 0.0);
    }
}
