use crate::artifacts::objects::object_id::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

/// Suffix distinguishing commit records from blob and tree payloads
const COMMIT_SUFFIX: &str = ".json";

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Name of the file holding an object of this type under `objects/`
    pub fn file_name(&self, oid: &ObjectId) -> String {
        match self {
            ObjectType::Commit => format!("{}{}", oid, COMMIT_SUFFIX),
            ObjectType::Blob | ObjectType::Tree => oid.to_string(),
        }
    }

    /// Recover a commit id from a file name under `objects/`
    pub fn commit_id_from_file_name(file_name: &str) -> Option<ObjectId> {
        file_name
            .strip_suffix(COMMIT_SUFFIX)
            .and_then(|stem| ObjectId::try_parse(stem.to_string()).ok())
    }

    /// Blob payloads are compressed; trees and commits are stored as text
    pub fn is_compressed(&self) -> bool {
        matches!(self, ObjectType::Blob)
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(anyhow::anyhow!("Invalid object type: {}", value)),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_get_a_distinct_file_name() {
        let oid = ObjectId::hash_of(b"x");

        assert_eq!(ObjectType::Blob.file_name(&oid), oid.to_string());
        assert_eq!(ObjectType::Tree.file_name(&oid), oid.to_string());
        assert_eq!(ObjectType::Commit.file_name(&oid), format!("{oid}.json"));
        assert_eq!(
            ObjectType::commit_id_from_file_name(&ObjectType::Commit.file_name(&oid)),
            Some(oid)
        );
    }
}
