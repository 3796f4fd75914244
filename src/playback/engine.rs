//! Animatic playback engine.
//!
//! A tick-driven state machine over a [`Timeline`] snapshot: the host fires
//! [`PlaybackEngine::tick`] every [`TICK_INTERVAL`] while the engine reports
//! `is_playing()`, and reads back the current shot, elapsed time, and
//! progress. The host owns the timer; it tears the timer down whenever
//! playback stops and on close, so no ticks outlive the player. Closing the
//! engine consumes it, which makes a tick after close unrepresentable.
//!
//! Elapsed time advances by the nominal tick interval, not by measured wall
//! clock, so error accumulates at tick granularity. That is an accepted
//! limitation of the design, as is the one-advance-per-tick rule: a shot
//! shorter than one tick stays on screen one extra tick past its nominal
//! end.

use std::time::Duration;

use crate::store::{AspectRatio, Shot};

use super::timeline::Timeline;

/// Interval at which the host drives [`PlaybackEngine::tick`].
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Seconds added to the elapsed clock per tick.
const TICK_SECONDS: f64 = 0.1;

/// Timer-driven playback state over one shot sequence snapshot.
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    timeline: Timeline,
    aspect_ratio: AspectRatio,
    current_index: usize,
    elapsed: f64,
    playing: bool,
}

impl PlaybackEngine {
    /// Opens a player over a snapshot of shots, starting at the first shot,
    /// elapsed zero, playing. Returns `None` for an empty sequence: with no
    /// shots there is no current shot, so the caller must guard.
    pub fn open(shots: Vec<Shot>, aspect_ratio: AspectRatio) -> Option<Self> {
        if shots.is_empty() {
            return None;
        }
        Some(Self {
            timeline: Timeline::new(shots),
            aspect_ratio,
            current_index: 0,
            elapsed: 0.0,
            playing: true,
        })
    }

    /// Advances the clock by one tick interval and crosses at most one shot
    /// boundary. No-op while paused.
    ///
    /// When the last shot ends, playback stops and the elapsed clock is
    /// clamped to the nominal total duration (so the final displayed
    /// timestamp reads exactly `total / total`).
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        self.elapsed += TICK_SECONDS;
        if self.elapsed >= self.timeline.end_time(self.current_index) {
            if self.current_index + 1 < self.timeline.len() {
                // Exactly one shot per tick, even when the shot's duration
                // is shorter than the tick interval.
                self.current_index += 1;
            } else {
                self.playing = false;
                self.elapsed = self.timeline.total_duration();
            }
        }
    }

    /// Flips play/pause. Resuming continues exactly where playback paused;
    /// neither the elapsed clock nor the current shot resets.
    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    /// Rewinds to the first shot at elapsed zero. The play/pause state is
    /// left as-is.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.elapsed = 0.0;
    }

    /// Jumps to a global time, clamped into `[0, total_duration]`, and
    /// resolves the shot covering it. The play/pause state is left as-is.
    pub fn seek(&mut self, t: f64) {
        self.elapsed = t.clamp(0.0, self.timeline.total_duration());
        self.current_index = self.timeline.index_at(self.elapsed);
    }

    /// Discards the player. The shot sequence it snapshotted is unaffected,
    /// and no further ticks are possible on a closed engine.
    pub fn close(self) {}

    /// The shot currently displayed. Always valid while the engine is open.
    pub fn current_shot(&self) -> &Shot {
        // open() rejects empty sequences and current_index never leaves
        // 0..len, so the index is always in range.
        &self.timeline.shots()[self.current_index]
    }

    /// Index of the current shot.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Whether the tick timer should be running.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Global elapsed seconds since playback start, bounded by the total.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Fraction of the whole sequence played, in `[0, 1]`. Zero for a
    /// sequence whose total duration is zero.
    pub fn progress(&self) -> f64 {
        let total = self.timeline.total_duration();
        if total <= 0.0 {
            return 0.0;
        }
        (self.elapsed / total).min(1.0)
    }

    /// The framing ratio the player was opened with.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// The snapshot this player runs over.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One tick of slack: boundary checks fire at tick granularity.
    const TOL: f64 = TICK_SECONDS * 1.5;

    fn shots(durations: &[f64]) -> Vec<Shot> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Shot::new((i + 1) as i32)
                    .with_title(format!("Shot {}", i + 1))
                    .with_duration(*d)
            })
            .collect()
    }

    fn tick_until<F: Fn(&PlaybackEngine) -> bool>(engine: &mut PlaybackEngine, stop: F) -> usize {
        let mut ticks = 0;
        while !stop(engine) {
            engine.tick();
            ticks += 1;
            assert!(ticks < 10_000, "engine failed to reach condition");
        }
        ticks
    }

    #[test]
    fn test_open_empty_sequence_is_guarded() {
        assert!(PlaybackEngine::open(Vec::new(), AspectRatio::Wide).is_none());
    }

    #[test]
    fn test_open_starts_playing_at_first_shot() {
        let engine = PlaybackEngine::open(shots(&[2.0]), AspectRatio::Square).unwrap();
        assert!(engine.is_playing());
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.elapsed(), 0.0);
        assert_eq!(engine.aspect_ratio(), AspectRatio::Square);
        assert_eq!(engine.current_shot().title, "Shot 1");
    }

    #[test]
    fn test_plays_sequence_to_completion() {
        let mut engine = PlaybackEngine::open(shots(&[3.5, 2.0, 4.5]), AspectRatio::Wide).unwrap();

        tick_until(&mut engine, |e| e.current_index() == 1);
        assert!((engine.elapsed() - 3.5).abs() < TOL);

        tick_until(&mut engine, |e| e.current_index() == 2);
        assert!((engine.elapsed() - 5.5).abs() < TOL);

        tick_until(&mut engine, |e| !e.is_playing());
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.elapsed(), 10.0);
        assert_eq!(engine.progress(), 1.0);

        // Ticks after the end change nothing.
        engine.tick();
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.elapsed(), 10.0);
    }

    #[test]
    fn test_current_index_always_valid() {
        let mut engine = PlaybackEngine::open(shots(&[0.3, 0.2, 0.5]), AspectRatio::Wide).unwrap();
        for _ in 0..100 {
            engine.tick();
            assert!(engine.current_index() < 3);
        }
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_pause_and_resume_preserve_position() {
        let mut engine = PlaybackEngine::open(shots(&[3.0, 3.0]), AspectRatio::Wide).unwrap();
        for _ in 0..12 {
            engine.tick();
        }
        let elapsed = engine.elapsed();
        let index = engine.current_index();

        engine.toggle_play();
        assert!(!engine.is_playing());
        // Ticks while paused are no-ops (a leaked timer would be harmless).
        for _ in 0..50 {
            engine.tick();
        }
        assert_eq!(engine.elapsed(), elapsed);
        assert_eq!(engine.current_index(), index);

        engine.toggle_play();
        assert!(engine.is_playing());
        assert_eq!(engine.elapsed(), elapsed);
        assert_eq!(engine.current_index(), index);
    }

    #[test]
    fn test_restart_resets_position_not_play_state() {
        let mut engine = PlaybackEngine::open(shots(&[1.0, 1.0]), AspectRatio::Wide).unwrap();
        tick_until(&mut engine, |e| !e.is_playing());

        engine.restart();
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.elapsed(), 0.0);
        assert!(!engine.is_playing());

        engine.toggle_play();
        engine.restart();
        assert!(engine.is_playing());
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn test_progress_is_monotonic_and_capped() {
        let mut engine = PlaybackEngine::open(shots(&[0.5, 0.5]), AspectRatio::Wide).unwrap();
        let mut last = engine.progress();
        for _ in 0..30 {
            engine.tick();
            let p = engine.progress();
            assert!(p >= last);
            assert!(p <= 1.0);
            last = p;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_zero_duration_shot_advances_next_tick() {
        let mut engine = PlaybackEngine::open(shots(&[0.0, 1.0]), AspectRatio::Wide).unwrap();
        assert_eq!(engine.current_index(), 0);
        engine.tick();
        // The degenerate shot held for exactly one tick.
        assert_eq!(engine.current_index(), 1);
        tick_until(&mut engine, |e| !e.is_playing());
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_sub_tick_duration_sticks_one_tick_not_forever() {
        let mut engine = PlaybackEngine::open(shots(&[0.01, 0.01, 1.0]), AspectRatio::Wide).unwrap();
        engine.tick();
        assert_eq!(engine.current_index(), 1);
        engine.tick();
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_seek_resolves_covering_shot() {
        let mut engine = PlaybackEngine::open(shots(&[3.5, 2.0, 4.5]), AspectRatio::Wide).unwrap();
        engine.seek(4.0);
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.elapsed(), 4.0);

        engine.seek(-5.0);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.elapsed(), 0.0);

        engine.seek(100.0);
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.elapsed(), 10.0);
    }

    #[test]
    fn test_start_time_bound_holds_within_one_tick() {
        let mut engine = PlaybackEngine::open(shots(&[0.7, 1.3, 0.4]), AspectRatio::Wide).unwrap();
        while engine.is_playing() {
            engine.tick();
            let start = engine.timeline().start_time(engine.current_index());
            assert!(engine.elapsed() >= start - TICK_SECONDS);
        }
    }
}
