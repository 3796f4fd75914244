//! Image generation boundary.
//!
//! The actual generation service is opaque to this crate: callers hand a
//! composed prompt and an aspect ratio to an [`ImageGenerator`] and get back
//! an image reference or a failure. What this module owns is the part that
//! has to be correct regardless of the service: prompt composition and the
//! latest-request-wins bookkeeping in [`GenerationTracker`] that decides
//! whether a completion is still allowed to touch its shot.

mod tracker;

pub use tracker::{GenerationTracker, RequestId};

use crate::error::ReelResult;
use crate::store::{AspectRatio, CameraAngle};

/// Composes the prompt sent to the generation service.
///
/// When the shot carries a camera angle the prompt is
/// `"Camera Angle: {angle}. {title}"`, otherwise the title alone.
pub fn compose_prompt(title: &str, angle: Option<CameraAngle>) -> String {
    match angle {
        Some(angle) => format!("Camera Angle: {}. {}", angle, title),
        None => title.to_string(),
    }
}

/// Opaque image generation service.
///
/// `Ok(None)` and `Err(_)` both mean the request failed; the shot reverts to
/// its no-image state either way and nothing is retried automatically.
pub trait ImageGenerator {
    /// Requests an image for the prompt, framed at the given aspect ratio.
    /// Returns an opaque image reference on success.
    fn generate(&self, prompt: &str, aspect_ratio: AspectRatio) -> ReelResult<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_prompt_with_angle() {
        let prompt = compose_prompt("A hero on a rooftop", Some(CameraAngle::LowAngle));
        assert_eq!(prompt, "Camera Angle: Low Angle. A hero on a rooftop");
    }

    #[test]
    fn test_compose_prompt_without_angle() {
        let prompt = compose_prompt("A hero on a rooftop", None);
        assert_eq!(prompt, "A hero on a rooftop");
    }
}
