use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type FileMap = BTreeMap<String, ObjectId>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(default)]
    pub added: Vec<IndexEntry>,
    #[serde(default)]
    pub removed: Vec<IndexEntry>,
    #[serde(default)]
    pub tracked: Vec<IndexEntry>,
}

impl IndexRecord {
    pub fn from_maps(added: &FileMap, removed: &FileMap, tracked: &FileMap) -> Self {
        IndexRecord {
            added: Self::to_entries(added),
            removed: Self::to_entries(removed),
            tracked: Self::to_entries(tracked),
        }
    }

    pub fn into_maps(self) -> (FileMap, FileMap, FileMap) {
        (
            Self::to_map(self.added),
            Self::to_map(self.removed),
            Self::to_map(self.tracked),
        )
    }

    fn to_entries(files: &FileMap) -> Vec<IndexEntry> {
        files
            .iter()
            .map(|(filename, hash)| IndexEntry::new(filename.clone(), hash.clone()))
            .collect()
    }

    fn to_map(entries: Vec<IndexEntry>) -> FileMap {
        entries
            .into_iter()
            .map(|entry| (entry.filename, entry.hash))
            .collect()
    }
}
