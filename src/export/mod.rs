//! Storyboard export module.
//!
//! Provides the printable HTML renderer for a storyboard.

pub mod html;

pub use html::render_storyboard_html;
