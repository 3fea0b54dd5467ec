//! Build tree objects from a flat list of staged paths
//!
//! Paths are split on `/` into nested directory nodes, each node owning its
//! children. Writing walks the structure post-order so every child id is
//! known before its parent tree is hashed.

use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::TwigError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Node {
    File { path: String, oid: ObjectId },
    Directory(DirectoryNode),
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryNode {
    children: BTreeMap<String, Node>,
}

impl DirectoryNode {
    pub fn build<'a>(
        files: impl IntoIterator<Item = (&'a String, &'a ObjectId)>,
    ) -> anyhow::Result<Self> {
        let mut root = DirectoryNode::default();
        for (path, oid) in files {
            root.insert(path, oid.clone())?;
        }

        Ok(root)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn insert(&mut self, path: &str, oid: ObjectId) -> anyhow::Result<()> {
        let segments = path.split('/').collect::<Vec<_>>();
        let Some((file_name, parents)) = segments.split_last() else {
            anyhow::bail!(TwigError::invalid_state("empty path in index"));
        };

        let mut node = self;
        for segment in parents {
            let child = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| Node::Directory(DirectoryNode::default()));

            node = match child {
                Node::Directory(directory) => directory,
                Node::File { path: existing, .. } => {
                    anyhow::bail!(TwigError::invalid_state(format!(
                        "{} is a file but {} needs it to be a directory",
                        existing, path
                    )));
                }
            };
        }

        if let Some(Node::Directory(_)) = node.children.get(*file_name) {
            anyhow::bail!(TwigError::invalid_state(format!(
                "{} is staged as a file but also contains staged files",
                path
            )));
        }

        node.children.insert(
            file_name.to_string(),
            Node::File {
                path: path.to_string(),
                oid,
            },
        );

        Ok(())
    }

    /// Store every file and tree, children first, and return the root tree id
    ///
    /// `store_blob` receives the full path and staged id of each file;
    /// `store_tree` receives every tree in post-order.
    pub fn write<B, T>(&self, store_blob: &mut B, store_tree: &mut T) -> anyhow::Result<ObjectId>
    where
        B: FnMut(&str, &ObjectId) -> anyhow::Result<()>,
        T: FnMut(&Tree) -> anyhow::Result<()>,
    {
        let mut entries = Vec::with_capacity(self.children.len());

        for (name, child) in &self.children {
            let entry = match child {
                Node::File { path, oid } => {
                    store_blob(path, oid)?;
                    TreeEntry::new(ObjectType::Blob, oid.clone(), name.clone())
                }
                Node::Directory(directory) => {
                    let oid = directory.write(store_blob, store_tree)?;
                    TreeEntry::new(ObjectType::Tree, oid, name.clone())
                }
            };
            entries.push(entry);
        }

        let tree = Tree::new(entries);
        store_tree(&tree)?;

        tree.object_id()
    }
}
