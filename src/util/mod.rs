//! Utility functions shared by both binaries.
//!
//! - **Atomic writes**: replace output files without exposing partial content
//! - **Text processing**: terminal-safe previews of feed-supplied strings

mod fs;
mod text;

pub use fs::write_atomically;
pub use text::{strip_control_chars, truncate_to_width};
