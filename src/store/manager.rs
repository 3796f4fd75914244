//! StoreManager implementation with revision-replacement semantics.
//!
//! This module provides the main `StoreManager` struct that owns the project
//! aggregate and provides:
//! - A [`Command`] interface: components emit intents, one reducer applies
//!   them, each command yields at most one new aggregate revision
//! - Named CRUD operations over projects, storyboards, and shots
//! - Macro-generated single-field shot setters for high-frequency edits
//! - Generation bookkeeping wired through [`GenerationTracker`]

use paste::paste;
use tracing::warn;

use crate::generate::{compose_prompt, GenerationTracker, RequestId};
use crate::store::model::{
    renumber, AspectRatio, CameraAngle, Project, Shot, ShotPatch, StoreRoot, Storyboard,
    DEFAULT_PROJECT_NAME,
};

// =============================================================================
// COMMANDS
// =============================================================================

/// A structured mutation intent against the aggregate.
///
/// Commands are the only write path UI layers need: they carry ids rather
/// than references, so no component ever holds a stale entity across a
/// revision. Invalid commands (unknown ids, guarded deletes, out-of-range
/// indices) are no-ops and do not produce a revision.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateProject,
    DeleteProject { project_id: String },
    RenameProject { project_id: String, name: String },
    SetAspectRatio { project_id: String, ratio: AspectRatio },
    SelectProject { project_id: String },
    CreateStoryboard { project_id: String },
    DeleteStoryboard { project_id: String, storyboard_id: String },
    RenameStoryboard { project_id: String, storyboard_id: String, name: String },
    SelectStoryboard { project_id: String, storyboard_id: String },
    AddShot { project_id: String, storyboard_id: String },
    UpdateShot { project_id: String, storyboard_id: String, shot_id: String, patch: ShotPatch },
    DeleteShot { project_id: String, storyboard_id: String, shot_id: String },
    MoveShot { project_id: String, storyboard_id: String, from: usize, to: usize },
}

// =============================================================================
// GENERATION TICKET
// =============================================================================

/// Handle for one in-flight image generation request.
///
/// Issued by [`StoreManager::begin_generation`]; the caller sends
/// `ticket.prompt` to the generation service and hands the ticket back to
/// [`StoreManager::finish_generation`] with the outcome. Only the latest
/// ticket per shot is honored when it completes.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    pub project_id: String,
    pub storyboard_id: String,
    pub shot_id: String,
    /// The exact composed prompt for this request.
    pub prompt: String,
    /// Framing for the generated image.
    pub aspect_ratio: AspectRatio,
    request_id: RequestId,
}

// =============================================================================
// FIELD SETTER MACRO
// =============================================================================

/// Generates single-field shot setters that route through `update_shot`,
/// so every edit follows the same guarded one-revision path.
macro_rules! shot_field_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        paste! {
            $(
                /// Sets one shot field via a single-field patch.
                pub fn [<set_shot_ $field>](
                    &mut self,
                    project_id: &str,
                    storyboard_id: &str,
                    shot_id: &str,
                    value: $ty,
                ) {
                    self.update_shot(
                        project_id,
                        storyboard_id,
                        shot_id,
                        ShotPatch {
                            $field: Some(value),
                            ..Default::default()
                        },
                    );
                }
            )*
        }
    };
}

// =============================================================================
// STORE MANAGER
// =============================================================================

/// The owning store for the project aggregate.
///
/// Every mutation clones the current [`StoreRoot`], applies the change, and
/// replaces the root wholesale, bumping a revision counter. The counter is
/// the change-detection signal for the persistence gateway and for UI
/// refresh; consumers re-resolve entities by id after each revision instead
/// of holding references across one.
pub struct StoreManager {
    root: StoreRoot,
    revision: u64,
    generations: GenerationTracker,
}

impl StoreManager {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a manager with a single empty default project.
    pub fn new() -> Self {
        Self::from_root(StoreRoot::new())
    }

    /// Creates a manager over a loaded aggregate (e.g. from persistence).
    pub fn from_root(root: StoreRoot) -> Self {
        Self {
            root,
            revision: 0,
            generations: GenerationTracker::new(),
        }
    }

    /// The current aggregate. Valid only until the next mutation.
    pub fn root(&self) -> &StoreRoot {
        &self.root
    }

    /// Monotonic revision counter, bumped once per applied mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The active project. Always present: the store never drops the last one.
    pub fn active_project(&self) -> Option<&Project> {
        self.root.active_project()
    }

    /// Replaces the root with a mutated copy and bumps the revision.
    /// All mutations funnel through here; guards run before it so that
    /// rejected commands produce no revision.
    fn update_root<F>(&mut self, f: F)
    where
        F: FnOnce(&mut StoreRoot),
    {
        let mut next = self.root.clone();
        f(&mut next);
        self.root = next;
        self.revision += 1;
    }

    // =========================================================================
    // COMMAND INTERFACE
    // =========================================================================

    /// Applies one command, producing at most one new revision.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::CreateProject => {
                let _ = self.create_project();
            }
            Command::DeleteProject { project_id } => self.delete_project(&project_id),
            Command::RenameProject { project_id, name } => self.rename_project(&project_id, &name),
            Command::SetAspectRatio { project_id, ratio } => {
                self.set_aspect_ratio(&project_id, ratio)
            }
            Command::SelectProject { project_id } => self.select_project(&project_id),
            Command::CreateStoryboard { project_id } => {
                let _ = self.create_storyboard(&project_id);
            }
            Command::DeleteStoryboard { project_id, storyboard_id } => {
                self.delete_storyboard(&project_id, &storyboard_id)
            }
            Command::RenameStoryboard { project_id, storyboard_id, name } => {
                self.rename_storyboard(&project_id, &storyboard_id, &name)
            }
            Command::SelectStoryboard { project_id, storyboard_id } => {
                self.select_storyboard(&project_id, &storyboard_id)
            }
            Command::AddShot { project_id, storyboard_id } => {
                let _ = self.add_shot(&project_id, &storyboard_id);
            }
            Command::UpdateShot { project_id, storyboard_id, shot_id, patch } => {
                self.update_shot(&project_id, &storyboard_id, &shot_id, patch)
            }
            Command::DeleteShot { project_id, storyboard_id, shot_id } => {
                self.delete_shot(&project_id, &storyboard_id, &shot_id)
            }
            Command::MoveShot { project_id, storyboard_id, from, to } => {
                self.move_shot(&project_id, &storyboard_id, from, to)
            }
        }
    }

    // =========================================================================
    // PROJECT OPERATIONS
    // =========================================================================

    /// Appends a new default project (one storyboard, 16:9) and makes it
    /// active. Returns the new project id.
    pub fn create_project(&mut self) -> String {
        let project = Project::new(DEFAULT_PROJECT_NAME);
        let project_id = project.id.clone();
        let active_id = project_id.clone();
        self.update_root(move |root| {
            root.projects.push(project);
            root.active_project_id = active_id;
        });
        project_id
    }

    /// Removes a project. No-op when it is the last one; the store always
    /// contains at least one project.
    pub fn delete_project(&mut self, project_id: &str) {
        if self.root.projects.len() <= 1 || self.root.project(project_id).is_none() {
            return;
        }
        self.cancel_generations_under(project_id, None);
        let project_id = project_id.to_string();
        self.update_root(move |root| {
            root.projects.retain(|p| p.id != project_id);
            if root.active_project_id == project_id {
                // Guard above keeps at least one project around.
                if let Some(first) = root.projects.first() {
                    root.active_project_id = first.id.clone();
                }
            }
        });
    }

    /// Renames a project.
    pub fn rename_project(&mut self, project_id: &str, name: &str) {
        if self.root.project(project_id).is_none() {
            return;
        }
        let project_id = project_id.to_string();
        let name = name.to_string();
        self.update_root(move |root| {
            if let Some(project) = root.project_mut(&project_id) {
                project.name = name;
            }
        });
    }

    /// Sets the project aspect ratio, applied uniformly to all its shots.
    pub fn set_aspect_ratio(&mut self, project_id: &str, ratio: AspectRatio) {
        if self.root.project(project_id).is_none() {
            return;
        }
        let project_id = project_id.to_string();
        self.update_root(move |root| {
            if let Some(project) = root.project_mut(&project_id) {
                project.aspect_ratio = ratio;
            }
        });
    }

    /// Makes a project the active one.
    pub fn select_project(&mut self, project_id: &str) {
        if self.root.project(project_id).is_none() || self.root.active_project_id == project_id {
            return;
        }
        let project_id = project_id.to_string();
        self.update_root(move |root| {
            root.active_project_id = project_id;
        });
    }

    // =========================================================================
    // STORYBOARD OPERATIONS
    // =========================================================================

    /// Appends a default-named empty storyboard to a project and makes it
    /// the project's active storyboard. Returns the new storyboard id.
    pub fn create_storyboard(&mut self, project_id: &str) -> Option<String> {
        let project = self.root.project(project_id)?;
        let name = format!("Storyboard {}", project.storyboards.len() + 1);
        let board = Storyboard::new(name);
        let board_id = board.id.clone();
        let project_id = project_id.to_string();
        let active_id = board_id.clone();
        self.update_root(move |root| {
            if let Some(project) = root.project_mut(&project_id) {
                project.storyboards.push(board);
                project.active_storyboard_id = active_id;
            }
        });
        Some(board_id)
    }

    /// Removes a storyboard. No-op when it is the project's last one; the
    /// active pointer falls back to the first remaining sibling.
    pub fn delete_storyboard(&mut self, project_id: &str, storyboard_id: &str) {
        let Some(project) = self.root.project(project_id) else {
            return;
        };
        if project.storyboards.len() <= 1 || project.storyboard(storyboard_id).is_none() {
            return;
        }
        self.cancel_generations_under(project_id, Some(storyboard_id));
        let project_id = project_id.to_string();
        let storyboard_id = storyboard_id.to_string();
        self.update_root(move |root| {
            if let Some(project) = root.project_mut(&project_id) {
                project.storyboards.retain(|b| b.id != storyboard_id);
                if project.active_storyboard_id == storyboard_id {
                    if let Some(first) = project.storyboards.first() {
                        project.active_storyboard_id = first.id.clone();
                    }
                }
            }
        });
    }

    /// Renames a storyboard.
    pub fn rename_storyboard(&mut self, project_id: &str, storyboard_id: &str, name: &str) {
        let exists = self
            .root
            .project(project_id)
            .and_then(|p| p.storyboard(storyboard_id))
            .is_some();
        if !exists {
            return;
        }
        let project_id = project_id.to_string();
        let storyboard_id = storyboard_id.to_string();
        let name = name.to_string();
        self.update_root(move |root| {
            if let Some(board) = root
                .project_mut(&project_id)
                .and_then(|p| p.storyboard_mut(&storyboard_id))
            {
                board.name = name;
            }
        });
    }

    /// Makes a storyboard the project's active one.
    pub fn select_storyboard(&mut self, project_id: &str, storyboard_id: &str) {
        let Some(project) = self.root.project(project_id) else {
            return;
        };
        if project.storyboard(storyboard_id).is_none()
            || project.active_storyboard_id == storyboard_id
        {
            return;
        }
        let project_id = project_id.to_string();
        let storyboard_id = storyboard_id.to_string();
        self.update_root(move |root| {
            if let Some(project) = root.project_mut(&project_id) {
                project.active_storyboard_id = storyboard_id;
            }
        });
    }

    // =========================================================================
    // SHOT OPERATIONS
    // =========================================================================

    /// Appends a new default shot (`number = len + 1`, duration 2.0, default
    /// camera angle, empty title, no image). Returns the new shot id.
    pub fn add_shot(&mut self, project_id: &str, storyboard_id: &str) -> Option<String> {
        let board = self.root.project(project_id)?.storyboard(storyboard_id)?;
        let shot = Shot::new((board.shots.len() + 1) as i32);
        let shot_id = shot.id.clone();
        let project_id = project_id.to_string();
        let storyboard_id = storyboard_id.to_string();
        self.update_root(move |root| {
            if let Some(board) = root
                .project_mut(&project_id)
                .and_then(|p| p.storyboard_mut(&storyboard_id))
            {
                board.shots.push(shot);
            }
        });
        Some(shot_id)
    }

    /// Merges a partial update into a shot. Patches can never touch the
    /// ordinal; renumbering happens only through insert/delete/move.
    pub fn update_shot(
        &mut self,
        project_id: &str,
        storyboard_id: &str,
        shot_id: &str,
        patch: ShotPatch,
    ) {
        let exists = self
            .root
            .project(project_id)
            .and_then(|p| p.storyboard(storyboard_id))
            .and_then(|b| b.shot(shot_id))
            .is_some();
        if !exists {
            return;
        }
        let project_id = project_id.to_string();
        let storyboard_id = storyboard_id.to_string();
        let shot_id = shot_id.to_string();
        self.update_root(move |root| {
            if let Some(shot) = root
                .project_mut(&project_id)
                .and_then(|p| p.storyboard_mut(&storyboard_id))
                .and_then(|b| b.shot_mut(&shot_id))
            {
                patch.apply_to(shot);
            }
        });
    }

    shot_field_setters!(
        title: String,
        duration: f64,
        camera_angle: Option<CameraAngle>,
        image_url: Option<String>,
    );

    /// Removes a shot and renumbers the remaining sequence densely from 1.
    pub fn delete_shot(&mut self, project_id: &str, storyboard_id: &str, shot_id: &str) {
        let exists = self
            .root
            .project(project_id)
            .and_then(|p| p.storyboard(storyboard_id))
            .and_then(|b| b.shot(shot_id))
            .is_some();
        if !exists {
            return;
        }
        self.generations.cancel(shot_id);
        let project_id = project_id.to_string();
        let storyboard_id = storyboard_id.to_string();
        let shot_id = shot_id.to_string();
        self.update_root(move |root| {
            if let Some(board) = root
                .project_mut(&project_id)
                .and_then(|p| p.storyboard_mut(&storyboard_id))
            {
                board.shots.retain(|s| s.id != shot_id);
                renumber(&mut board.shots);
            }
        });
    }

    /// Moves a shot with splice semantics: removes the element at `from` and
    /// reinserts it at `to`, then renumbers. No-op when `from == to` or
    /// either index is out of range.
    pub fn move_shot(&mut self, project_id: &str, storyboard_id: &str, from: usize, to: usize) {
        let Some(board) = self
            .root
            .project(project_id)
            .and_then(|p| p.storyboard(storyboard_id))
        else {
            return;
        };
        let len = board.shots.len();
        if from == to || from >= len || to >= len {
            return;
        }
        let project_id = project_id.to_string();
        let storyboard_id = storyboard_id.to_string();
        self.update_root(move |root| {
            if let Some(board) = root
                .project_mut(&project_id)
                .and_then(|p| p.storyboard_mut(&storyboard_id))
            {
                let shot = board.shots.remove(from);
                board.shots.insert(to, shot);
                renumber(&mut board.shots);
            }
        });
    }

    // =========================================================================
    // GENERATION
    // =========================================================================

    /// Starts an image generation request for a shot: marks it as
    /// generating, composes the prompt from its current title and camera
    /// angle, and registers the request as the live one for the shot.
    ///
    /// Returns `None` when the shot does not exist. Issuing a new request
    /// while an earlier one is in flight supersedes it.
    pub fn begin_generation(
        &mut self,
        project_id: &str,
        storyboard_id: &str,
        shot_id: &str,
    ) -> Option<GenerationTicket> {
        let project = self.root.project(project_id)?;
        let aspect_ratio = project.aspect_ratio;
        let shot = project.storyboard(storyboard_id)?.shot(shot_id)?;
        let prompt = compose_prompt(&shot.title, shot.camera_angle);

        let request_id = self.generations.begin(shot_id);
        let ticket = GenerationTicket {
            project_id: project_id.to_string(),
            storyboard_id: storyboard_id.to_string(),
            shot_id: shot_id.to_string(),
            prompt,
            aspect_ratio,
            request_id,
        };

        let (project_id, storyboard_id, shot_id) = (
            ticket.project_id.clone(),
            ticket.storyboard_id.clone(),
            ticket.shot_id.clone(),
        );
        self.update_root(move |root| {
            if let Some(shot) = root
                .project_mut(&project_id)
                .and_then(|p| p.storyboard_mut(&storyboard_id))
                .and_then(|b| b.shot_mut(&shot_id))
            {
                shot.is_generating = true;
            }
        });
        Some(ticket)
    }

    /// Applies the outcome of a generation request.
    ///
    /// Stale tickets (superseded by a later request, or whose shot has been
    /// deleted) are dropped without touching the aggregate. On success the
    /// previous image moves into the shot's history and `image_url` /
    /// `last_generated_prompt` are replaced; on failure (`None`) the shot
    /// reverts to its no-image state. Either way `is_generating` clears.
    pub fn finish_generation(&mut self, ticket: &GenerationTicket, result: Option<String>) {
        if !self.generations.complete(&ticket.shot_id, ticket.request_id) {
            warn!(shot_id = %ticket.shot_id, "dropping stale generation result");
            return;
        }
        let exists = self
            .root
            .project(&ticket.project_id)
            .and_then(|p| p.storyboard(&ticket.storyboard_id))
            .and_then(|b| b.shot(&ticket.shot_id))
            .is_some();
        if !exists {
            // The shot went away while the request was in flight.
            return;
        }
        let (project_id, storyboard_id, shot_id) = (
            ticket.project_id.clone(),
            ticket.storyboard_id.clone(),
            ticket.shot_id.clone(),
        );
        let prompt = ticket.prompt.clone();
        self.update_root(move |root| {
            if let Some(shot) = root
                .project_mut(&project_id)
                .and_then(|p| p.storyboard_mut(&storyboard_id))
                .and_then(|b| b.shot_mut(&shot_id))
            {
                shot.is_generating = false;
                match result {
                    Some(url) => {
                        shot.archive_current_image();
                        shot.image_url = Some(url);
                        shot.last_generated_prompt = Some(prompt);
                    }
                    None => {
                        shot.image_url = None;
                    }
                }
            }
        });
    }

    /// Forgets live generation requests for every shot under a project (or
    /// one of its storyboards), so their completions become no-ops.
    fn cancel_generations_under(&mut self, project_id: &str, storyboard_id: Option<&str>) {
        let Some(project) = self.root.project(project_id) else {
            return;
        };
        let shot_ids: Vec<String> = project
            .storyboards
            .iter()
            .filter(|b| storyboard_id.map_or(true, |id| b.id == id))
            .flat_map(|b| b.shots.iter().map(|s| s.id.clone()))
            .collect();
        for shot_id in shot_ids {
            self.generations.cancel(&shot_id);
        }
    }
}

impl Default for StoreManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
