//! Working-directory reconciliation
//!
//! Switching the working directory to another snapshot is planned in full
//! before anything is touched: the plan lists the files to delete, the blobs
//! to deploy and, for guarded operations, every path whose uncommitted state
//! would be lost. A plan with conflicts is refused as a whole.

pub mod conflict;
pub mod migration;
