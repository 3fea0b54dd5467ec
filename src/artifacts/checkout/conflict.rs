use std::collections::{BTreeMap, BTreeSet};

/// Kind of uncommitted work a working-directory rewrite would destroy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictType {
    /// Tracked or staged file modified on disk but not staged
    StaleFile,
    /// Staged content that differs from what would be written
    StagedChange,
    /// Staged deletion of a path the target snapshot contains
    StagedRemoval,
    /// Untracked file the target snapshot would overwrite
    UntrackedOverwritten,
}

#[derive(Debug)]
pub struct ConflictMessage {
    pub header: &'static str,
    pub footer: &'static str,
}

impl From<ConflictType> for ConflictMessage {
    fn from(value: ConflictType) -> Self {
        match value {
            ConflictType::StaleFile => Self {
                header: "Your local changes to the following files would be overwritten:",
                footer: "Please commit your changes before you switch branches.",
            },
            ConflictType::StagedChange => Self {
                header: "Your staged changes to the following files would be lost:",
                footer: "Please commit your changes before you switch branches.",
            },
            ConflictType::StagedRemoval => Self {
                header: "The following files are staged for removal but would be restored:",
                footer: "Please commit the removal before you switch branches.",
            },
            ConflictType::UntrackedOverwritten => Self {
                header: "The following untracked working tree files would be overwritten:",
                footer: "Please move or remove them before you switch branches.",
            },
        }
    }
}

pub type ConflictsSet = BTreeMap<ConflictType, BTreeSet<String>>;

/// Render every non-empty conflict group, git style
pub fn render_conflicts(operation: &str, conflicts: &ConflictsSet) -> String {
    let groups = conflicts
        .iter()
        .filter(|(_, paths)| !paths.is_empty())
        .map(|(conflict_type, paths)| {
            let message = ConflictMessage::from(*conflict_type);
            let lines = paths
                .iter()
                .map(|path| format!("\t{}", path))
                .collect::<Vec<_>>()
                .join("\n");
            format!("error: {}\n{}\n{}", message.header, lines, message.footer)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\nAborting {}", groups, operation)
}
