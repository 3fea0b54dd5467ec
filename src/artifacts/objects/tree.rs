//! Tree object
//!
//! A tree lists one directory level. Each entry is stored on its own line:
//!
//! ```text
//! <kind> <hash> <name>
//! ```
//!
//! where `<kind>` is `blob` or `tree` and `<name>` is the base name of the
//! child. Full paths are rebuilt by walking down from the root tree.
//!
//! The tree id is the hash of `"tree "` and then every child's hash followed
//! by its name, in entry order. Entries are kept sorted by name so the id is
//! deterministic. The prefix keeps the empty tree apart from the empty blob,
//! since both live in the same directory.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

const TREE_HASH_PREFIX: &str = "tree ";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub kind: ObjectType,
    pub oid: ObjectId,
    pub name: String,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.kind == ObjectType::Tree
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Tree { entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(&format!("{} {} {}\n", entry.kind, entry.oid, entry.name));
        }

        Ok(content.into())
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line.context("Unable to read tree entry")?;
            if line.is_empty() {
                continue;
            }

            // names may contain spaces, so only split off the first two fields
            let mut parts = line.splitn(3, ' ');
            let (Some(kind), Some(oid), Some(name)) = (parts.next(), parts.next(), parts.next())
            else {
                anyhow::bail!("Malformed tree entry: {}", line);
            };

            let kind = ObjectType::try_from(kind)?;
            let oid = ObjectId::try_parse(oid.to_string())?;
            entries.push(TreeEntry::new(kind, oid, name.to_string()));
        }

        Ok(Tree::new(entries))
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn hashed_content(&self) -> anyhow::Result<Bytes> {
        let mut content = String::from(TREE_HASH_PREFIX);
        for entry in &self.entries {
            content.push_str(entry.oid.as_ref());
            content.push_str(&entry.name);
        }

        Ok(content.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn blob_entry(content: &[u8], name: &str) -> TreeEntry {
        TreeEntry::new(ObjectType::Blob, ObjectId::hash_of(content), name.to_string())
    }

    #[test]
    fn serialized_lines_parse_back() {
        let tree = Tree::new(vec![
            blob_entry(b"b", "with space.txt"),
            blob_entry(b"a", "a.txt"),
        ]);

        let bytes = tree.serialize().unwrap();
        let parsed = Tree::deserialize(Cursor::new(bytes)).unwrap();

        assert_eq!(parsed, tree);
        assert_eq!(parsed.entries()[1].name, "with space.txt");
    }

    #[test]
    fn tree_id_ignores_insertion_order() {
        let one = Tree::new(vec![blob_entry(b"a", "a.txt"), blob_entry(b"b", "b.txt")]);
        let two = Tree::new(vec![blob_entry(b"b", "b.txt"), blob_entry(b"a", "a.txt")]);

        assert_eq!(one.object_id().unwrap(), two.object_id().unwrap());
    }

    #[test]
    fn tree_id_depends_on_child_names() {
        let one = Tree::new(vec![blob_entry(b"a", "a.txt")]);
        let two = Tree::new(vec![blob_entry(b"a", "renamed.txt")]);

        assert_ne!(one.object_id().unwrap(), two.object_id().unwrap());
    }

    #[test]
    fn empty_tree_does_not_share_the_empty_blob_id() {
        assert_ne!(Tree::default().object_id().unwrap(), ObjectId::hash_of(b""));
    }

    #[test]
    fn malformed_line_is_rejected() {
        let result = Tree::deserialize(Cursor::new("blob deadbeef"));
        assert!(result.is_err());
    }
}
