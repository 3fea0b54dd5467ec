//! Commit history traversal for `log`
//!
//! `rev_list` walks breadth-first from a start commit over every parent,
//! yielding each reachable commit once.

pub mod rev_list;
