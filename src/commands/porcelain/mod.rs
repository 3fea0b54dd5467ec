//! User-facing commands
//!
//! - `init`: create the metadata directory
//! - `add`, `rm`: stage and unstage paths
//! - `status`: report staged, unstaged and untracked changes
//! - `commit`: record the staged snapshot
//! - `log`: walk the history
//! - `reset`: move the current branch and rebuild the working directory
//! - `checkout`: switch to a branch or commit, or restore paths
//! - `branch`: create, remove and list branches
//! - `merge`: merge another branch into the current one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;

/// Whether `path` is `prefix` itself or lies below it; the empty prefix is
/// the workspace root
pub(crate) fn is_under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
