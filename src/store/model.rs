//! Data models for the storyboard editor.
//!
//! The root aggregate is [`StoreRoot`]: a set of projects, each owning its
//! storyboards, each owning an ordered sequence of shots. The whole aggregate
//! is serialized as one JSON value by the persistence gateway, so every type
//! here derives `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default duration for a freshly created shot, in seconds.
pub const DEFAULT_SHOT_DURATION: f64 = 2.0;

/// Maximum number of previous images kept per shot.
pub const SHOT_HISTORY_LIMIT: usize = 20;

/// Default display names for new entities.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";
pub const DEFAULT_STORYBOARD_NAME: &str = "Storyboard 1";

/// Generates a fresh entity id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// =============================================================================
// ASPECT RATIO
// =============================================================================

/// Fixed framing ratio applied to all shot imagery within a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// All supported ratios, in display order.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Wide,
        AspectRatio::Tall,
        AspectRatio::Standard,
        AspectRatio::Portrait,
        AspectRatio::Square,
    ];

    /// The ratio string as shown in the UI and stored on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Square => "1:1",
        }
    }

    /// CSS `aspect-ratio` property value, used by the export renderer.
    pub fn css_value(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "16 / 9",
            AspectRatio::Tall => "9 / 16",
            AspectRatio::Standard => "4 / 3",
            AspectRatio::Portrait => "3 / 4",
            AspectRatio::Square => "1 / 1",
        }
    }

    /// Parses a ratio string. Returns `None` for anything outside the fixed set.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CAMERA ANGLE
// =============================================================================

/// Conventional camera angle labels for a shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraAngle {
    #[default]
    #[serde(rename = "Wide Shot")]
    Wide,
    #[serde(rename = "Medium Shot")]
    Medium,
    #[serde(rename = "Close-Up")]
    CloseUp,
    #[serde(rename = "Extreme Close-Up")]
    ExtremeCloseUp,
    #[serde(rename = "Over-the-Shoulder")]
    OverShoulder,
    #[serde(rename = "Low Angle")]
    LowAngle,
    #[serde(rename = "High Angle")]
    HighAngle,
    #[serde(rename = "Point of View")]
    PointOfView,
    #[serde(rename = "Aerial")]
    Aerial,
}

impl CameraAngle {
    /// All supported angles, in display order.
    pub const ALL: [CameraAngle; 9] = [
        CameraAngle::Wide,
        CameraAngle::Medium,
        CameraAngle::CloseUp,
        CameraAngle::ExtremeCloseUp,
        CameraAngle::OverShoulder,
        CameraAngle::LowAngle,
        CameraAngle::HighAngle,
        CameraAngle::PointOfView,
        CameraAngle::Aerial,
    ];

    /// The display label, also used in composed generation prompts.
    pub fn label(&self) -> &'static str {
        match self {
            CameraAngle::Wide => "Wide Shot",
            CameraAngle::Medium => "Medium Shot",
            CameraAngle::CloseUp => "Close-Up",
            CameraAngle::ExtremeCloseUp => "Extreme Close-Up",
            CameraAngle::OverShoulder => "Over-the-Shoulder",
            CameraAngle::LowAngle => "Low Angle",
            CameraAngle::HighAngle => "High Angle",
            CameraAngle::PointOfView => "Point of View",
            CameraAngle::Aerial => "Aerial",
        }
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// SHOT
// =============================================================================

/// One timed visual unit: a text prompt, camera angle, duration, and the
/// optional generated image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Shot {
    /// Unique identifier.
    pub id: String,
    /// 1-based ordinal, dense and contiguous within the owning sequence.
    /// Maintained exclusively by the store's renumbering; never set directly.
    pub number: i32,
    /// Display duration in seconds, positive.
    pub duration: f64,
    /// Free-text description, doubles as the generation prompt.
    pub title: String,
    /// Camera angle label, if one is set.
    pub camera_angle: Option<CameraAngle>,
    /// Opaque reference to generated artwork; absent until generation succeeds.
    pub image_url: Option<String>,
    /// True only while an image-generation request for this shot is in flight.
    pub is_generating: bool,
    /// The exact prompt sent for the most recent successful generation.
    pub last_generated_prompt: Option<String>,
    /// Previous images, newest first, capped at [`SHOT_HISTORY_LIMIT`].
    pub history: Vec<ShotImageHistory>,
}

impl Default for Shot {
    fn default() -> Self {
        Self {
            id: String::new(),
            number: 0,
            duration: DEFAULT_SHOT_DURATION,
            title: String::new(),
            camera_angle: Some(CameraAngle::default()),
            image_url: None,
            is_generating: false,
            last_generated_prompt: None,
            history: Vec::new(),
        }
    }
}

impl Shot {
    /// Creates a new Shot with a generated id and the given ordinal.
    pub fn new(number: i32) -> Self {
        Self {
            id: new_id(),
            number,
            ..Default::default()
        }
    }

    /// Builder: Set title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: Set duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Builder: Set camera angle.
    pub fn with_camera_angle(mut self, angle: CameraAngle) -> Self {
        self.camera_angle = Some(angle);
        self
    }

    /// Builder: Set image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Pushes the current image onto the history stack, trimming to the cap.
    pub(crate) fn archive_current_image(&mut self) {
        if let Some(url) = self.image_url.take() {
            let prompt = self.last_generated_prompt.clone().unwrap_or_default();
            self.history
                .insert(0, ShotImageHistory::new(url, prompt).with_timestamp(now_millis()));
            if self.history.len() > SHOT_HISTORY_LIMIT {
                self.history.truncate(SHOT_HISTORY_LIMIT);
            }
        }
    }
}

/// Partial update for a shot's editable fields.
///
/// `None` leaves a field untouched. The clearable fields (`camera_angle`,
/// `image_url`) nest an `Option` so a patch can distinguish "unchanged"
/// from "cleared". A patch can never touch the ordinal or the transient
/// generation state; those move only through the store's own paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotPatch {
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub camera_angle: Option<Option<CameraAngle>>,
    pub image_url: Option<Option<String>>,
}

impl ShotPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Set title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: Set duration.
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Builder: Set (or clear) the camera angle.
    pub fn camera_angle(mut self, angle: Option<CameraAngle>) -> Self {
        self.camera_angle = Some(angle);
        self
    }

    /// Builder: Set the image URL.
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(Some(url.into()));
        self
    }

    /// Builder: Clear the image URL.
    pub fn clear_image(mut self) -> Self {
        self.image_url = Some(None);
        self
    }

    /// Merges the patch into a shot.
    pub fn apply_to(&self, shot: &mut Shot) {
        if let Some(title) = &self.title {
            shot.title = title.clone();
        }
        if let Some(duration) = self.duration {
            shot.duration = duration;
        }
        if let Some(angle) = self.camera_angle {
            shot.camera_angle = angle;
        }
        if let Some(image_url) = &self.image_url {
            shot.image_url = image_url.clone();
        }
    }
}

/// A previously generated image for a shot, kept for undo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShotImageHistory {
    pub id: String,
    pub image_url: String,
    pub prompt: String,
    /// Milliseconds since epoch.
    pub timestamp: i64,
}

impl ShotImageHistory {
    /// Creates a new history entry with a generated id.
    pub fn new(image_url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            image_url: image_url.into(),
            prompt: prompt.into(),
            timestamp: 0,
        }
    }

    /// Builder: Set timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Renumbers a sequence densely from 1, preserving order.
pub(crate) fn renumber(shots: &mut [Shot]) {
    for (i, shot) in shots.iter_mut().enumerate() {
        shot.number = (i + 1) as i32;
    }
}

// =============================================================================
// STORYBOARD
// =============================================================================

/// Ordered collection of shots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Storyboard {
    pub id: String,
    pub name: String,
    /// Order-significant shot sequence. Shot numbers always run `1..=len`.
    pub shots: Vec<Shot>,
}

impl Storyboard {
    /// Creates a new empty storyboard with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            shots: Vec::new(),
        }
    }

    /// Builder: Append a shot (renumbered to the end of the sequence).
    pub fn with_shot(mut self, mut shot: Shot) -> Self {
        shot.number = (self.shots.len() + 1) as i32;
        self.shots.push(shot);
        self
    }

    /// Looks up a shot by id.
    pub fn shot(&self, shot_id: &str) -> Option<&Shot> {
        self.shots.iter().find(|s| s.id == shot_id)
    }

    /// Looks up a shot by id, mutably.
    pub fn shot_mut(&mut self, shot_id: &str) -> Option<&mut Shot> {
        self.shots.iter_mut().find(|s| s.id == shot_id)
    }

    /// Total display duration of the sequence, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.shots.iter().map(|s| s.duration).sum()
    }
}

// =============================================================================
// PROJECT
// =============================================================================

/// Collection of storyboards plus display/aspect configuration.
///
/// A project always owns at least one storyboard, and
/// `active_storyboard_id` always references one of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub storyboards: Vec<Storyboard>,
    pub active_storyboard_id: String,
    pub aspect_ratio: AspectRatio,
}

impl Project {
    /// Creates a new project with one default storyboard, which is active.
    pub fn new(name: impl Into<String>) -> Self {
        let board = Storyboard::new(DEFAULT_STORYBOARD_NAME);
        let active_storyboard_id = board.id.clone();
        Self {
            id: new_id(),
            name: name.into(),
            storyboards: vec![board],
            active_storyboard_id,
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Builder: Set aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Looks up a storyboard by id.
    pub fn storyboard(&self, storyboard_id: &str) -> Option<&Storyboard> {
        self.storyboards.iter().find(|b| b.id == storyboard_id)
    }

    /// Looks up a storyboard by id, mutably.
    pub fn storyboard_mut(&mut self, storyboard_id: &str) -> Option<&mut Storyboard> {
        self.storyboards.iter_mut().find(|b| b.id == storyboard_id)
    }

    /// The active storyboard. Present for any project built through the
    /// store, which repairs the pointer on every structural mutation.
    pub fn active_storyboard(&self) -> Option<&Storyboard> {
        self.storyboard(&self.active_storyboard_id)
    }
}

// =============================================================================
// STORE ROOT
// =============================================================================

/// Root aggregate: the full set of projects plus the active selection.
///
/// The store replaces this value wholesale on every mutation; consumers must
/// re-resolve entities by id after each revision rather than holding
/// references across one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreRoot {
    pub projects: Vec<Project>,
    pub active_project_id: String,
}

impl StoreRoot {
    /// Creates a root with a single empty default project.
    pub fn new() -> Self {
        let project = Project::new(DEFAULT_PROJECT_NAME);
        let active_project_id = project.id.clone();
        Self {
            projects: vec![project],
            active_project_id,
        }
    }

    /// Built-in starter content, used when persisted data is missing or
    /// unreadable.
    pub fn seed() -> Self {
        let board = Storyboard::new(DEFAULT_STORYBOARD_NAME)
            .with_shot(
                Shot::new(1)
                    .with_title("Establishing shot of the city at dawn")
                    .with_duration(3.0),
            )
            .with_shot(
                Shot::new(2)
                    .with_title("Hero walks into frame, looking up")
                    .with_camera_angle(CameraAngle::LowAngle),
            )
            .with_shot(
                Shot::new(3)
                    .with_title("Close on the hero's face, determined")
                    .with_camera_angle(CameraAngle::CloseUp),
            );
        let active_storyboard_id = board.id.clone();
        let project = Project {
            id: new_id(),
            name: "My First Project".to_string(),
            storyboards: vec![board],
            active_storyboard_id,
            aspect_ratio: AspectRatio::default(),
        };
        let active_project_id = project.id.clone();
        Self {
            projects: vec![project],
            active_project_id,
        }
    }

    /// Looks up a project by id.
    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    /// Looks up a project by id, mutably.
    pub fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    /// The active project. Present for any root built through the store.
    pub fn active_project(&self) -> Option<&Project> {
        self.project(&self.active_project_id)
    }
}

// =============================================================================
// USER
// =============================================================================

/// Signed-in user record. Login is a stub: no credentials are verified.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Milliseconds since epoch.
    pub signed_in_at: i64,
}

impl User {
    /// Fabricates a signed-in user record.
    pub fn sign_in(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            email: email.into(),
            signed_in_at: now_millis(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shot_defaults() {
        let shot = Shot::new(1);
        assert!(!shot.id.is_empty());
        assert_eq!(shot.number, 1);
        assert_eq!(shot.duration, DEFAULT_SHOT_DURATION);
        assert_eq!(shot.camera_angle, Some(CameraAngle::Wide));
        assert!(shot.image_url.is_none());
        assert!(!shot.is_generating);
    }

    #[test]
    fn test_project_starts_with_active_storyboard() {
        let project = Project::new("Test");
        assert_eq!(project.storyboards.len(), 1);
        assert!(project.active_storyboard().is_some());
        assert_eq!(project.active_storyboard().unwrap().name, DEFAULT_STORYBOARD_NAME);
    }

    #[test]
    fn test_renumber_dense_from_one() {
        let mut shots = vec![Shot::new(7), Shot::new(3), Shot::new(9)];
        renumber(&mut shots);
        let numbers: Vec<i32> = shots.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_aspect_ratio_round_trip() {
        for ratio in AspectRatio::ALL {
            let json = serde_json::to_string(&ratio).unwrap();
            assert_eq!(json, format!("\"{}\"", ratio.as_str()));
            let back: AspectRatio = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ratio);
            assert_eq!(AspectRatio::parse(ratio.as_str()), Some(ratio));
        }
        assert_eq!(AspectRatio::parse("21:9"), None);
    }

    #[test]
    fn test_camera_angle_serializes_as_label() {
        let json = serde_json::to_string(&CameraAngle::OverShoulder).unwrap();
        assert_eq!(json, "\"Over-the-Shoulder\"");
    }

    #[test]
    fn test_archive_current_image_caps_history() {
        let mut shot = Shot::new(1).with_image_url("img-0");
        shot.last_generated_prompt = Some("prompt-0".to_string());
        for i in 1..=25 {
            shot.archive_current_image();
            shot.image_url = Some(format!("img-{}", i));
            shot.last_generated_prompt = Some(format!("prompt-{}", i));
        }
        assert_eq!(shot.history.len(), SHOT_HISTORY_LIMIT);
        // Newest first.
        assert_eq!(shot.history[0].image_url, "img-24");
        assert_eq!(shot.history[0].prompt, "prompt-24");
    }

    #[test]
    fn test_store_root_round_trip() {
        let root = StoreRoot::seed();
        let json = serde_json::to_string(&root).unwrap();
        let back: StoreRoot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root);
    }

    #[test]
    fn test_seed_has_playable_content() {
        let root = StoreRoot::seed();
        let board = root.active_project().unwrap().active_storyboard().unwrap();
        assert_eq!(board.shots.len(), 3);
        assert!(board.total_duration() > 0.0);
        let numbers: Vec<i32> = board.shots.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
