use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::artifacts::checkout::conflict::{ConflictType, ConflictsSet, render_conflicts};
use crate::artifacts::index::index_record::FileMap;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};

/// Whether uncommitted work blocks the migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    /// Refuse to lose any uncommitted change (checkout, merge)
    Guarded,
    /// Overwrite tracked content unconditionally (reset, path checkout)
    Discard,
}

/// Plan for turning the working directory into a target snapshot
///
/// Untracked files and staged-new files outside the target are never
/// deleted. The index passed to [`Migration::plan`] must have its
/// `modified_tracked` and `untracked` maps freshly computed.
pub struct Migration<'r> {
    database: &'r Database,
    deletions: BTreeSet<String>,
    writes: BTreeMap<String, ObjectId>,
    conflicts: ConflictsSet,
}

impl<'r> Migration<'r> {
    pub fn plan(database: &'r Database, index: &Index, target: &FileMap, safety: Safety) -> Self {
        let mut migration = Migration {
            database,
            deletions: BTreeSet::new(),
            writes: BTreeMap::new(),
            conflicts: ConflictsSet::new(),
        };

        if safety == Safety::Guarded {
            migration.check_for_conflicts(index, target);
        }

        migration.deletions = index
            .tracked()
            .keys()
            .filter(|path| !target.contains_key(*path))
            .cloned()
            .collect();

        migration.writes = target
            .iter()
            .filter(|(path, oid)| Self::disk_hash(index, path) != Some(*oid))
            .map(|(path, oid)| (path.clone(), oid.clone()))
            .collect();

        migration
    }

    /// Best knowledge of what is on disk at `path`, without reading it
    fn disk_hash<'i>(index: &'i Index, path: &str) -> Option<&'i ObjectId> {
        if index.missing_added().contains(path) {
            return None;
        }

        index
            .modified_tracked()
            .get(path)
            .or_else(|| index.added().get(path))
            .or_else(|| index.tracked().get(path))
            .or_else(|| index.untracked().get(path))
    }

    fn check_for_conflicts(&mut self, index: &Index, target: &FileMap) {
        for path in index.modified_tracked().keys() {
            self.record_conflict(ConflictType::StaleFile, path);
        }

        for (path, oid) in index.added() {
            let would_change = match target.get(path) {
                Some(target_oid) => target_oid != oid,
                None => Self::collides(path, target),
            };
            if index.tracked().contains_key(path) || would_change {
                self.record_conflict(ConflictType::StagedChange, path);
            }
        }

        for path in index.removed().keys() {
            if target.contains_key(path) {
                self.record_conflict(ConflictType::StagedRemoval, path);
            }
        }

        for (path, oid) in index.untracked() {
            let would_change = match target.get(path) {
                Some(target_oid) => target_oid != oid,
                None => Self::collides(path, target),
            };
            if would_change {
                self.record_conflict(ConflictType::UntrackedOverwritten, path);
            }
        }
    }

    /// Whether writing the target would replace `path` with a directory, or
    /// one of its parent directories with a file
    fn collides(path: &str, target: &FileMap) -> bool {
        let as_dir = format!("{}/", path);
        let replaced_by_dir = target
            .range(as_dir.clone()..)
            .next()
            .is_some_and(|(target_path, _)| target_path.starts_with(&as_dir));

        let parent_replaced_by_file = path
            .match_indices('/')
            .any(|(index, _)| target.contains_key(&path[..index]));

        replaced_by_dir || parent_replaced_by_file
    }

    fn record_conflict(&mut self, conflict_type: ConflictType, path: &str) {
        self.conflicts
            .entry(conflict_type)
            .or_default()
            .insert(path.to_string());
    }

    pub fn conflicts(&self) -> &ConflictsSet {
        &self.conflicts
    }

    /// Every conflicting path, sorted
    pub fn conflicting_paths(&self) -> BTreeSet<&String> {
        self.conflicts.values().flatten().collect()
    }

    /// Refuse the migration with `InvalidState` when it would lose work
    pub fn ensure_safe(&self, operation: &str) -> anyhow::Result<()> {
        if self.conflicts.values().all(BTreeSet::is_empty) {
            return Ok(());
        }

        tracing::warn!(
            operation,
            paths = self.conflicting_paths().len(),
            "refusing to overwrite uncommitted changes"
        );
        anyhow::bail!(TwigError::invalid_state(render_conflicts(
            operation,
            &self.conflicts
        )))
    }

    pub fn deletions(&self) -> &BTreeSet<String> {
        &self.deletions
    }

    pub fn writes(&self) -> &BTreeMap<String, ObjectId> {
        &self.writes
    }

    pub fn load_blob_data(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        Ok(self.database.load_blob(oid)?.into_content())
    }
}
