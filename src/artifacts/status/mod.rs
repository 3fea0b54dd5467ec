//! Working tree status
//!
//! - `file_change`: labels for staged and unstaged changes
//! - `status_info`: the report gathered from a refreshed index

pub mod file_change;
pub mod status_info;
