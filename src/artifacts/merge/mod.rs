//! Merge machinery
//!
//! - `ancestry`: reachability over the commit graph and the lowest common
//!   ancestor search
//! - `strategy`: picks between no-op, fast-forward and recursive merges
//! - `diff`: three-way comparison of file snapshots and conflict detection

pub mod ancestry;
pub mod diff;
pub mod strategy;
