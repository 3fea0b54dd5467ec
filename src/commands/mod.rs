//! Command implementations
//!
//! - `plumbing`: building blocks shared by several commands (tree and commit
//!   writing)
//! - `porcelain`: the user-facing verbs, one file each
//!
//! Every command is an `async fn` on [`Repository`](crate::areas::repository::Repository)
//! that writes its human-readable output to the repository's writer.

pub mod plumbing;
pub mod porcelain;
