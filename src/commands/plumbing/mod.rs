//! Plumbing shared by porcelain commands
//!
//! - `write_commit`: store the trees of a snapshot and a commit on top of them

pub mod write_commit;
