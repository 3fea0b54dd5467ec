//! On-disk areas of a repository
//!
//! - `database`: content-addressed object store
//! - `index`: staging area
//! - `refs`: branch refs, HEAD and the current-branch file
//! - `repository`: the context owning every area of one repository
//! - `workspace`: working directory file operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
