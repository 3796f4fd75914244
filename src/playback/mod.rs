//! Animatic playback module.
//!
//! This module provides:
//! - `timeline`: the immutable shot-sequence snapshot with precomputed
//!   shot boundaries
//! - `engine`: the tick-driven playback state machine (play/pause/seek/
//!   restart, current shot, progress)

pub mod engine;
pub mod timeline;

pub use engine::{PlaybackEngine, TICK_INTERVAL};
pub use timeline::Timeline;
