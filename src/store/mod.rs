//! Project/storyboard store module.
//!
//! This module provides:
//! - `model`: Data structures for the aggregate (Project, Storyboard, Shot)
//! - `manager`: StoreManager with the command/reducer interface and
//!   revision-replacement mutation discipline

pub mod manager;
pub mod model;

pub use manager::{Command, GenerationTicket, StoreManager};
pub use model::*;
