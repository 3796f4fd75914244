//! Storyreel - Storyboard shot editor core with timed animatic playback.
//!
//! This crate provides the non-presentation half of a storyboard editor:
//!
//! - **Store**: projects own storyboards, storyboards own ordered timed
//!   shots; every mutation goes through a command/reducer interface and
//!   yields a fresh aggregate revision
//! - **Playback**: a tick-driven animatic engine over a snapshot of the
//!   active storyboard's shots
//! - **Persistence**: debounced JSON snapshots under versioned keys, with
//!   seed-data fallback on unreadable reads
//!
//! # Example
//!
//! ```rust
//! use storyreel::{Command, PlaybackEngine, StoreManager};
//!
//! let mut store = StoreManager::new();
//! let project_id = store.root().active_project_id.clone();
//! let board_id = store.active_project().unwrap().active_storyboard_id.clone();
//!
//! // Edits arrive as commands; each one produces a new aggregate revision.
//! store.apply(Command::AddShot {
//!     project_id: project_id.clone(),
//!     storyboard_id: board_id.clone(),
//! });
//!
//! // The player runs over a snapshot of the shot sequence.
//! let project = store.active_project().unwrap();
//! let shots = project.active_storyboard().unwrap().shots.clone();
//! let mut player = PlaybackEngine::open(shots, project.aspect_ratio).unwrap();
//! player.tick();
//! assert!(player.is_playing());
//! ```

pub mod error;

// Core modules
pub mod export;
pub mod generate;
pub mod persist;
pub mod playback;
pub mod store;

// Re-exports for convenience
pub use error::{ReelError, ReelResult};
pub use export::render_storyboard_html;
pub use generate::{compose_prompt, GenerationTracker, ImageGenerator};
pub use persist::{DirStorage, KeyValueStorage, MemoryStorage, PersistenceGateway};
pub use playback::{PlaybackEngine, Timeline, TICK_INTERVAL};
pub use store::{
    AspectRatio, CameraAngle, Command, GenerationTicket, Project, Shot, ShotPatch, StoreManager,
    StoreRoot, Storyboard, User,
};
