//! Domain types and algorithms
//!
//! - `branch`: branch names and revision specs
//! - `checkout`: migration plans and the conflicts that block them
//! - `index`: the persisted index record
//! - `log`: commit history walk
//! - `merge`: ancestry, three-way diff and strategy selection
//! - `objects`: blobs, trees, commits and their ids
//! - `status`: the working tree status report

pub mod branch;
pub mod checkout;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
