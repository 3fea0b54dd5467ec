//! Three-way comparison of file snapshots
//!
//! Each side is reduced to the paths it changed relative to the base: a new
//! hash for added or modified files, `None` for deletions. A path changed by
//! both sides to different results is a conflict, and so is a path one side
//! needs as a file while the other needs it as a directory. Everything else
//! merges by applying both change sets on top of the base.

use crate::artifacts::index::index_record::FileMap;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};

/// Path to its new hash, `None` when deleted
pub type ChangeSet = BTreeMap<String, Option<ObjectId>>;

/// Paths whose hash differs between `base` and `side`, deletions included
pub fn changes(base: &FileMap, side: &FileMap) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (path, oid) in side {
        if base.get(path) != Some(oid) {
            changes.insert(path.clone(), Some(oid.clone()));
        }
    }
    for path in base.keys() {
        if !side.contains_key(path) {
            changes.insert(path.clone(), None);
        }
    }

    changes
}

#[derive(Debug)]
pub struct ThreeWayDiff<'f> {
    base: &'f FileMap,
    ours: ChangeSet,
    theirs: ChangeSet,
}

impl<'f> ThreeWayDiff<'f> {
    pub fn new(base: &'f FileMap, ours: &FileMap, theirs: &FileMap) -> Self {
        ThreeWayDiff {
            base,
            ours: changes(base, ours),
            theirs: changes(base, theirs),
        }
    }

    pub fn ours(&self) -> &ChangeSet {
        &self.ours
    }

    pub fn theirs(&self) -> &ChangeSet {
        &self.theirs
    }

    /// Paths both sides changed to different results, and paths caught in a
    /// file/directory clash, sorted
    pub fn conflicts(&self) -> Vec<String> {
        let mut conflicts: BTreeSet<String> = self
            .ours
            .iter()
            .filter(|(path, our_change)| {
                self.theirs
                    .get(*path)
                    .is_some_and(|their_change| their_change != *our_change)
            })
            .map(|(path, _)| path.clone())
            .collect();

        conflicts.extend(self.file_directory_clashes());
        conflicts.into_iter().collect()
    }

    /// Paths where one file would sit inside another
    ///
    /// Every path that survives in either merge order is a candidate, so the
    /// result does not depend on which side is ours.
    fn file_directory_clashes(&self) -> BTreeSet<String> {
        let written = |path: &String| {
            self.ours.get(path).is_some_and(Option::is_some)
                || self.theirs.get(path).is_some_and(Option::is_some)
        };
        let untouched =
            |path: &String| !self.ours.contains_key(path) && !self.theirs.contains_key(path);

        let candidates: BTreeSet<&str> = self
            .base
            .keys()
            .filter(|path| untouched(*path))
            .chain(self.ours.keys().chain(self.theirs.keys()).filter(|path| written(*path)))
            .map(String::as_str)
            .collect();

        let mut clashes = BTreeSet::new();
        for path in &candidates {
            for (index, _) in path.match_indices('/') {
                let parent = &path[..index];
                if candidates.contains(parent) {
                    clashes.insert(parent.to_string());
                    clashes.insert(path.to_string());
                }
            }
        }

        clashes
    }

    /// Base overlaid with our changes, then theirs
    pub fn merged(&self) -> FileMap {
        let mut files = self.base.clone();

        for (path, change) in self.ours.iter().chain(self.theirs.iter()) {
            match change {
                Some(oid) => {
                    files.insert(path.clone(), oid.clone());
                }
                None => {
                    files.remove(path);
                }
            }
        }

        files
    }
}
