//! twig: a small content-addressed version control engine
//!
//! - `areas`: the on-disk parts of a repository
//! - `artifacts`: objects, revisions and the checkout, merge, status and log
//!   algorithms
//! - `commands`: one `async fn` per verb on [`areas::repository::Repository`]
//! - `config`: author identity and commit date
//! - `errors`: the failure taxonomy callers can match on

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;
