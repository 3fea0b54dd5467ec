//! Commit record
//!
//! Commits are metadata, not payloads: they are stored uncompressed as JSON
//! in `objects/<id>.json`.
//!
//! ```text
//! {"tree":"<id>","parents":["<id>",...],"author":"Name <email>","date":"...","message":"..."}
//! ```
//!
//! The commit id is the hash of `commit ` followed by that JSON text.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::BufRead;

pub const COMMIT_DATE_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

const COMMIT_HASH_PREFIX: &str = "commit ";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Commit {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    author: String,
    date: String,
    message: String,
}

impl Commit {
    pub fn new(
        tree: ObjectId,
        parents: Vec<ObjectId>,
        author: String,
        date: chrono::DateTime<chrono::FixedOffset>,
        message: String,
    ) -> Self {
        Commit {
            tree,
            parents,
            author,
            date: date.format(COMMIT_DATE_FORMAT).to_string(),
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree
    }

    /// First parent, `None` for a root commit
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let json = serde_json::to_vec(self).context("Unable to encode commit record")?;
        Ok(json.into())
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        serde_json::from_reader(reader).context("Unable to decode commit record")
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn hashed_content(&self) -> anyhow::Result<Bytes> {
        let mut content = COMMIT_HASH_PREFIX.as_bytes().to_vec();
        content.extend_from_slice(&Packable::serialize(self)?);

        Ok(content.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample(parents: Vec<ObjectId>) -> Commit {
        let date = chrono::DateTime::parse_from_rfc2822("Sun, 01 Jan 2023 12:00:00 +0000").unwrap();
        Commit::new(
            ObjectId::hash_of(b"tree"),
            parents,
            "user <user@localhost>".to_string(),
            date,
            "first line\n\nbody".to_string(),
        )
    }

    #[test]
    fn record_keeps_field_order() {
        let json = String::from_utf8(sample(vec![]).serialize().unwrap().to_vec()).unwrap();

        assert!(json.starts_with("{\"tree\":"));
        assert!(json.contains("\"parents\":[]"));
        assert!(json.contains("\"date\":\"Sun Jan 1 12:00:00 2023 +0000\""));
    }

    #[test]
    fn record_parses_back() {
        let commit = sample(vec![ObjectId::hash_of(b"parent")]);
        let parsed = Commit::deserialize(Cursor::new(commit.serialize().unwrap())).unwrap();

        assert_eq!(parsed, commit);
        assert_eq!(parsed.short_message(), "first line");
        assert_eq!(parsed.parent(), Some(&ObjectId::hash_of(b"parent")));
    }

    #[test]
    fn parents_change_the_commit_id() {
        let root = sample(vec![]);
        let child = sample(vec![root.object_id().unwrap()]);

        assert_ne!(root.object_id().unwrap(), child.object_id().unwrap());
        assert!(!child.is_merge());
    }
}
