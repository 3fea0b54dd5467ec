use crate::artifacts::index::index_record::FileMap;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{IoResultExt, TwigError};
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object store, a flat `objects/` directory
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    fn object_path(&self, object_type: ObjectType, oid: &ObjectId) -> PathBuf {
        self.path.join(object_type.file_name(oid))
    }

    pub fn contains(&self, object_type: ObjectType, oid: &ObjectId) -> bool {
        self.object_path(object_type, oid).exists()
    }

    /// Write an object unless an object with the same id is already stored
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_type = object.object_type();
        let oid = object.object_id()?;
        let object_path = self.object_path(object_type, &oid);

        if object_path.exists() {
            tracing::debug!(%oid, kind = %object_type, "object already stored");
            return Ok(oid);
        }

        let mut content = object.serialize()?;
        if object_type.is_compressed() {
            content = Self::compress(content)?;
        }
        self.write_object(&object_path, content)?;

        tracing::debug!(%oid, kind = %object_type, "stored object");
        Ok(oid)
    }

    pub fn store_blob(&self, content: Bytes) -> anyhow::Result<ObjectId> {
        self.store(&Blob::new(content))
    }

    pub fn load_blob(&self, oid: &ObjectId) -> anyhow::Result<Blob> {
        let content = self.read_object(ObjectType::Blob, oid)?;
        Blob::deserialize(Cursor::new(content))
    }

    pub fn parse_tree(&self, oid: &ObjectId) -> anyhow::Result<Tree> {
        let content = self.read_object(ObjectType::Tree, oid)?;
        Tree::deserialize(Cursor::new(content)).with_context(|| format!("Corrupt tree {}", oid))
    }

    pub fn parse_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        let content = self.read_object(ObjectType::Commit, oid)?;
        Commit::deserialize(Cursor::new(content)).with_context(|| format!("Corrupt commit {}", oid))
    }

    pub fn commit_exists(&self, oid: &ObjectId) -> bool {
        self.contains(ObjectType::Commit, oid)
    }

    /// Every file reachable from a tree, keyed by its full path
    pub fn tree_files(&self, oid: &ObjectId) -> anyhow::Result<FileMap> {
        let mut files = FileMap::new();
        self.collect_tree_files(oid, "", &mut files)?;
        Ok(files)
    }

    fn collect_tree_files(
        &self,
        oid: &ObjectId,
        prefix: &str,
        files: &mut FileMap,
    ) -> anyhow::Result<()> {
        for entry in self.parse_tree(oid)?.entries() {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", prefix, entry.name)
            };

            if entry.is_tree() {
                self.collect_tree_files(&entry.oid, &path, files)?;
            } else {
                files.insert(path, entry.oid.clone());
            }
        }

        Ok(())
    }

    /// Every file of a commit's snapshot; `None` (no commit yet) is empty
    pub fn commit_files(&self, oid: Option<&ObjectId>) -> anyhow::Result<FileMap> {
        match oid {
            Some(oid) => {
                let commit = self.parse_commit(oid)?;
                self.tree_files(commit.tree_oid())
            }
            None => Ok(FileMap::new()),
        }
    }

    /// Commits whose id starts with `prefix`
    pub fn find_commits_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        let mut matches = Vec::new();

        if !self.path.is_dir() {
            return Ok(matches);
        }

        let entries = std::fs::read_dir(&self.path)
            .io_context(|| format!("Unable to list objects in {}", self.path.display()))?;
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            if let Some(oid) = ObjectType::commit_id_from_file_name(&file_name.to_string_lossy())
                && oid.as_ref().starts_with(&prefix)
            {
                matches.push(oid);
            }
        }

        matches.sort();
        Ok(matches)
    }

    fn read_object(&self, object_type: ObjectType, oid: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.object_path(object_type, oid);

        let content = std::fs::read(&object_path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => {
                TwigError::not_found(format!("{} {} not found", object_type, oid))
            }
            _ => TwigError::io(
                format!("Unable to read object file {}", object_path.display()),
                source,
            ),
        })?;

        if object_type.is_compressed() {
            Self::decompress(content.into())
        } else {
            Ok(content.into())
        }
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.path)
            .io_context(|| format!("Unable to create object directory {}", self.path.display()))?;
        let temp_object_path = self.path.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .io_context(|| format!("Unable to open object file {}", temp_object_path.display()))?;

        file.write_all(&object_content)
            .io_context(|| format!("Unable to write object file {}", temp_object_path.display()))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path)
            .io_context(|| format!("Unable to rename object file to {}", object_path.display()))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
