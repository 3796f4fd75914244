//! Latest-request-wins tracking for in-flight generation requests.
//!
//! Requests are fire-and-forget: the store issues one, the service completes
//! it some time later, and in between the user may have re-triggered
//! generation for the same shot or deleted the shot entirely. The tracker
//! keeps one live request id per shot; only the completion carrying that id
//! is applied, so later requests win deterministically and stale results
//! are dropped instead of clobbering newer ones.

use std::collections::HashMap;

/// Monotonic id for one generation request.
pub type RequestId = u64;

/// Registry of the live generation request per shot id.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    live: HashMap<String, RequestId>,
    next_request_id: RequestId,
}

impl GenerationTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new request for a shot, superseding any earlier one.
    pub fn begin(&mut self, shot_id: &str) -> RequestId {
        self.next_request_id += 1;
        self.live.insert(shot_id.to_string(), self.next_request_id);
        self.next_request_id
    }

    /// Whether this request is still the live one for its shot.
    pub fn is_live(&self, shot_id: &str, request_id: RequestId) -> bool {
        self.live.get(shot_id) == Some(&request_id)
    }

    /// Retires a request. Returns true when it was the live one (and its
    /// result may be applied); false for stale or unknown requests.
    pub fn complete(&mut self, shot_id: &str, request_id: RequestId) -> bool {
        if self.is_live(shot_id, request_id) {
            self.live.remove(shot_id);
            true
        } else {
            false
        }
    }

    /// Forgets any live request for a shot (used when the shot is deleted).
    pub fn cancel(&mut self, shot_id: &str) {
        self.live.remove(shot_id);
    }

    /// Number of shots with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_request_completes() {
        let mut tracker = GenerationTracker::new();
        let id = tracker.begin("shot-1");
        assert!(tracker.is_live("shot-1", id));
        assert!(tracker.complete("shot-1", id));
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn test_later_request_supersedes_earlier() {
        let mut tracker = GenerationTracker::new();
        let first = tracker.begin("shot-1");
        let second = tracker.begin("shot-1");

        // The superseded completion is dropped.
        assert!(!tracker.complete("shot-1", first));
        // The shot is still awaiting the live request.
        assert!(tracker.is_live("shot-1", second));
        assert!(tracker.complete("shot-1", second));
    }

    #[test]
    fn test_completion_after_cancel_is_stale() {
        let mut tracker = GenerationTracker::new();
        let id = tracker.begin("shot-1");
        tracker.cancel("shot-1");
        assert!(!tracker.complete("shot-1", id));
    }

    #[test]
    fn test_requests_are_independent_per_shot() {
        let mut tracker = GenerationTracker::new();
        let a = tracker.begin("shot-a");
        let b = tracker.begin("shot-b");
        assert_eq!(tracker.in_flight(), 2);
        assert!(tracker.complete("shot-a", a));
        assert!(tracker.is_live("shot-b", b));
    }
}
