use crate::areas::index::Index;
use crate::areas::refs::Head;
use crate::artifacts::status::file_change::StagedChange;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Snapshot of what `status` reports
///
/// Built from an index whose `modified_tracked` and `untracked` maps were
/// just recomputed against the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub(crate) head: Head,
    pub(crate) staged: BTreeMap<String, StagedChange>,
    pub(crate) unstaged: BTreeSet<String>,
    pub(crate) untracked: BTreeSet<String>,
}

impl StatusInfo {
    pub fn collect(head: Head, index: &Index) -> Self {
        let mut staged = index
            .added()
            .keys()
            .map(|path| {
                let change = if index.tracked().contains_key(path) {
                    StagedChange::Modified
                } else {
                    StagedChange::NewFile
                };
                (path.clone(), change)
            })
            .collect::<BTreeMap<_, _>>();
        staged.extend(
            index
                .removed()
                .keys()
                .map(|path| (path.clone(), StagedChange::Deleted)),
        );

        StatusInfo {
            head,
            staged,
            unstaged: index.modified_tracked().keys().cloned().collect(),
            untracked: index.untracked().keys().cloned().collect(),
        }
    }

    pub fn staged(&self) -> &BTreeMap<String, StagedChange> {
        &self.staged
    }

    pub fn unstaged(&self) -> &BTreeSet<String> {
        &self.unstaged
    }

    pub fn untracked(&self) -> &BTreeSet<String> {
        &self.untracked
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }

    pub fn render(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        match &self.head {
            Head::Attached(branch) => writeln!(writer, "On branch {}", branch)?,
            Head::Detached(oid) => writeln!(writer, "HEAD detached at {}", oid.to_short_oid())?,
        }

        if self.is_clean() {
            writeln!(writer, "nothing to commit, working tree clean")?;
            return Ok(());
        }

        if !self.staged.is_empty() {
            writeln!(writer, "Changes to be committed:")?;
            for (path, change) in &self.staged {
                writeln!(writer, "\t{}{}", change, path)?;
            }
            writeln!(writer)?;
        }

        if !self.unstaged.is_empty() {
            writeln!(writer, "Changes not staged for commit:")?;
            for path in &self.unstaged {
                writeln!(writer, "\t{}{}", StagedChange::Modified, path)?;
            }
            writeln!(writer)?;
        }

        if !self.untracked.is_empty() {
            writeln!(writer, "Untracked files:")?;
            for path in &self.untracked {
                writeln!(writer, "\t{}", path)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::artifacts::objects::object_id::ObjectId;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn oid(content: &str) -> ObjectId {
        ObjectId::hash_of(content.as_bytes())
    }

    fn master() -> Head {
        Head::Attached(BranchName::try_parse("master").unwrap())
    }

    fn render(status: &StatusInfo) -> String {
        let mut out = Vec::new();
        status.render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn clean_tree_reports_nothing_to_commit() {
        let index = Index::new(Path::new("/nonexistent/index").into());
        let status = StatusInfo::collect(master(), &index);

        assert_eq!(
            render(&status),
            "On branch master\nnothing to commit, working tree clean\n"
        );
    }

    #[test]
    fn every_section_is_listed_in_order() {
        let mut index = Index::new(Path::new("/nonexistent/index").into());
        index.stage("kept.txt", oid("kept"));
        index.stage("gone.txt", oid("gone"));
        index.stage("edited.txt", oid("v1"));
        index.update_after_commit();

        index.stage("new.txt", oid("new"));
        index.stage("kept.txt", oid("kept v2"));
        index.unstage("gone.txt");
        index
            .update_modifying(|path| {
                Ok(Some(match path {
                    "edited.txt" => oid("v2"),
                    "kept.txt" => oid("kept v2"),
                    _ => oid("new"),
                }))
            })
            .unwrap();
        index
            .search_untracked(&["loose.txt".to_string()], |_| Ok(Some(oid("loose"))))
            .unwrap();

        let status = StatusInfo::collect(master(), &index);

        assert_eq!(
            render(&status),
            "On branch master\n\
             Changes to be committed:\n\
             \tdeleted:    gone.txt\n\
             \tmodified:   kept.txt\n\
             \tnew file:   new.txt\n\
             \n\
             Changes not staged for commit:\n\
             \tmodified:   edited.txt\n\
             \n\
             Untracked files:\n\
             \tloose.txt\n\
             \n"
        );
    }

    #[test]
    fn detached_head_shows_the_short_id() {
        let index = Index::new(Path::new("/nonexistent/index").into());
        let head = oid("commit");
        let status = StatusInfo::collect(Head::Detached(head.clone()), &index);

        assert!(render(&status).starts_with(&format!("HEAD detached at {}\n", head.to_short_oid())));
    }
}
