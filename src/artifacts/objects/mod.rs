//! Content-addressed objects
//!
//! Three kinds of objects live in the store, each identified by the SHA-1 of
//! its hashed content:
//!
//! - **Blob**: raw file bytes, stored zlib-compressed under `objects/<id>`
//! - **Tree**: `"<kind> <id> <name>"` lines, stored as text under `objects/<id>`
//! - **Commit**: a JSON record, stored under `objects/<id>.json`
//!
//! Objects are immutable once written; writing an id that already exists is a no-op.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;
pub mod tree_builder;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest prefix accepted when resolving abbreviated ids
pub const MIN_ABBREV_LENGTH: usize = 4;
