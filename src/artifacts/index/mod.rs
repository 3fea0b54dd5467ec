//! Persisted staging record
//!
//! The index file is a JSON record with three arrays of `{filename, hash}`
//! entries:
//!
//! ```text
//! {"added":[...],"removed":[...],"tracked":[...]}
//! ```
//!
//! Untracked and modified-but-unstaged paths are never persisted; they are
//! recomputed from the working directory whenever a command needs them.

pub mod index_entry;
pub mod index_record;
