const LABEL_WIDTH: usize = 12;

/// Change recorded in the index relative to the last commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StagedChange {
    NewFile,
    Modified,
    Deleted,
}

impl From<&StagedChange> for &str {
    fn from(change: &StagedChange) -> Self {
        match change {
            StagedChange::NewFile => "new file:",
            StagedChange::Modified => "modified:",
            StagedChange::Deleted => "deleted:",
        }
    }
}

impl std::fmt::Display for StagedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label: &str = self.into();
        write!(f, "{:<width$}", label, width = LABEL_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_padded_to_one_column() {
        assert_eq!(StagedChange::NewFile.to_string(), "new file:   ");
        assert_eq!(StagedChange::Modified.to_string(), "modified:   ");
        assert_eq!(StagedChange::Deleted.to_string(), "deleted:    ");
    }
}
