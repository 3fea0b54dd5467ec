//! Staging index
//!
//! The index keeps five maps of relative path to content hash:
//!
//! - `added`: new or changed files staged for the next commit
//! - `removed`: staged deletions, keyed by the last known hash
//! - `tracked`: files of the last commit (or checkout)
//! - `untracked`: files on disk that were never staged
//! - `modified_tracked`: tracked or staged files whose disk content changed since
//!
//! Only the first three are persisted. The other two, along with the set of
//! staged-new files missing from disk, are recomputed by
//! [`Index::update_modifying`] and [`Index::search_untracked`] at the start of
//! commands that need them.
//!
//! A path is never in `added` and `removed` at the same time; the staging
//! transitions below keep that invariant.

use crate::artifacts::index::index_record::{FileMap, IndexRecord};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::IoResultExt;
use anyhow::Context;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.twig/index`)
    path: Box<Path>,
    added: FileMap,
    removed: FileMap,
    tracked: FileMap,
    untracked: FileMap,
    modified_tracked: FileMap,
    /// Staged-new paths whose file is gone from disk
    missing_added: BTreeSet<String>,
    /// Set when a persisted map changed since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            added: FileMap::new(),
            removed: FileMap::new(),
            tracked: FileMap::new(),
            untracked: FileMap::new(),
            modified_tracked: FileMap::new(),
            missing_added: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
        self.tracked.clear();
        self.untracked.clear();
        self.modified_tracked.clear();
        self.missing_added.clear();
        self.changed = false;
    }

    /// Load the persisted maps from disk
    ///
    /// A missing or empty index file yields an empty index. The file is read
    /// under a shared lock.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .io_context(|| format!("Unable to open index file {}", self.path.display()))?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)
            .io_context(|| format!("Unable to lock index file {}", self.path.display()))?;

        if lock.metadata()?.len() == 0 {
            return Ok(());
        }

        let record: IndexRecord = serde_json::from_reader(std::io::BufReader::new(&**lock))
            .with_context(|| format!("Malformed index file {}", self.path.display()))?;
        (self.added, self.removed, self.tracked) = record.into_maps();

        tracing::debug!(
            added = self.added.len(),
            removed = self.removed.len(),
            tracked = self.tracked.len(),
            "loaded index"
        );

        Ok(())
    }

    /// Persist `added`, `removed` and `tracked` under an exclusive lock
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .io_context(|| format!("Unable to open index file {}", self.path.display()))?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)
            .io_context(|| format!("Unable to lock index file {}", self.path.display()))?;

        let record = IndexRecord::from_maps(&self.added, &self.removed, &self.tracked);
        serde_json::to_writer(&**lock, &record)
            .with_context(|| format!("Unable to write index file {}", self.path.display()))?;

        tracing::debug!(
            added = self.added.len(),
            removed = self.removed.len(),
            tracked = self.tracked.len(),
            "stored index"
        );
        self.changed = false;

        Ok(())
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn added(&self) -> &FileMap {
        &self.added
    }

    pub fn removed(&self) -> &FileMap {
        &self.removed
    }

    pub fn tracked(&self) -> &FileMap {
        &self.tracked
    }

    pub fn untracked(&self) -> &FileMap {
        &self.untracked
    }

    pub fn modified_tracked(&self) -> &FileMap {
        &self.modified_tracked
    }

    pub fn missing_added(&self) -> &BTreeSet<String> {
        &self.missing_added
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// Every path the next commit would contain, with its staged hash
    ///
    /// Staged hashes in `added` win over the tracked ones.
    pub fn snapshot(&self) -> FileMap {
        let mut files = self.tracked.clone();
        files.extend(
            self.added
                .iter()
                .map(|(path, oid)| (path.clone(), oid.clone())),
        );
        files
    }

    /// Stage the current content of a file
    pub fn stage(&mut self, path: &str, oid: ObjectId) {
        self.untracked.remove(path);
        self.modified_tracked.remove(path);

        if let Some(removed_oid) = self.removed.remove(path) {
            // restore the path to tracked, staging the content only if it changed
            if removed_oid != oid {
                self.added.insert(path.to_string(), oid);
            }
            self.tracked.insert(path.to_string(), removed_oid);
        } else if self.tracked.get(path) == Some(&oid) {
            // back to the committed content, nothing left to stage
            self.added.remove(path);
        } else {
            self.added.insert(path.to_string(), oid);
        }

        self.changed = true;
    }

    /// Stage the deletion of a tracked path that is gone from disk
    pub fn stage_deletion(&mut self, path: &str) {
        self.added.remove(path);
        self.modified_tracked.remove(path);

        if let Some(oid) = self.tracked.remove(path) {
            self.removed.insert(path.to_string(), oid);
        }

        self.changed = true;
    }

    /// Undo the staging of a path
    ///
    /// A staged-new path simply leaves `added`; a tracked path is moved to
    /// `removed` so its deletion is committed. Unknown paths are ignored.
    pub fn unstage(&mut self, path: &str) {
        self.modified_tracked.remove(path);
        let was_added = self.added.remove(path).is_some();

        if let Some(oid) = self.tracked.remove(path) {
            self.removed.insert(path.to_string(), oid);
        } else if !was_added {
            return;
        }

        self.changed = true;
    }

    /// Recompute `modified_tracked` against the disk
    ///
    /// `hash_of` yields the disk hash of a path, `None` when it no longer is
    /// a regular file. Tracked paths that vanished move to `removed`.
    pub fn update_modifying<F>(&mut self, hash_of: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> anyhow::Result<Option<ObjectId>>,
    {
        self.modified_tracked.clear();
        self.missing_added.clear();

        let staged = self
            .tracked
            .keys()
            .chain(self.added.keys())
            .cloned()
            .collect::<BTreeSet<_>>();

        for path in staged {
            let expected = match self.added.get(&path).or_else(|| self.tracked.get(&path)) {
                Some(oid) => oid.clone(),
                None => continue,
            };

            match hash_of(&path)? {
                Some(oid) if oid != expected => {
                    self.modified_tracked.insert(path, oid);
                }
                Some(_) => {}
                None if self.tracked.contains_key(&path) => {
                    tracing::debug!(path, "tracked file vanished, staging deletion");
                    self.stage_deletion(&path);
                }
                // a staged-new file deleted from disk still has its blob stored
                None => {
                    self.missing_added.insert(path);
                }
            }
        }

        Ok(())
    }

    /// Recompute `untracked` from the list of files on disk
    pub fn search_untracked<F>(&mut self, files: &[String], hash_of: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> anyhow::Result<Option<ObjectId>>,
    {
        self.untracked.clear();

        for path in files {
            if self.tracked.contains_key(path) || self.added.contains_key(path) {
                continue;
            }
            if let Some(oid) = hash_of(path)? {
                self.untracked.insert(path.clone(), oid);
            }
        }

        Ok(())
    }

    /// Fold the staged changes into `tracked` after a commit
    pub fn update_after_commit(&mut self) {
        let added = std::mem::take(&mut self.added);
        for path in added.keys() {
            self.modified_tracked.remove(path);
        }
        self.tracked.extend(added);
        self.removed.clear();

        self.changed = true;
    }

    /// Track exactly `files`, discarding every staged change
    pub fn reset_to(&mut self, files: FileMap) {
        self.tracked = files;
        self.added.clear();
        self.removed.clear();
        self.modified_tracked.clear();
        self.missing_added.clear();

        self.changed = true;
    }

    /// Track `files` while keeping staged-new paths outside of them
    pub fn switch_to(&mut self, files: FileMap) {
        let previous = std::mem::replace(&mut self.tracked, files);
        self.added
            .retain(|path, _| !previous.contains_key(path) && !self.tracked.contains_key(path));
        self.removed.clear();
        self.modified_tracked.clear();
        self.missing_added.clear();

        self.changed = true;
    }

    /// Put a restored path back to its tracked state
    pub fn restore(&mut self, path: &str, oid: ObjectId) {
        self.added.remove(path);
        self.removed.remove(path);
        self.modified_tracked.remove(path);
        self.missing_added.remove(path);
        self.untracked.remove(path);
        self.tracked.insert(path.to_string(), oid);

        self.changed = true;
    }
}
