use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Print every commit reachable from `start` (default HEAD), breadth-first
    pub async fn log(&mut self, start: Option<&str>) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let start = match start {
            Some(revision) => Some(Revision::try_parse(revision)?.resolve(self)?),
            None => self.refs().read_head()?,
        };

        for entry in RevList::new(self.database(), start) {
            let (oid, commit) = entry?;
            self.show_commit_medium(&oid, &commit)?;
        }

        Ok(())
    }

    fn show_commit_medium(&self, oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "commit {}", oid)?;
        if commit.is_merge() {
            let parents = commit
                .parents()
                .iter()
                .map(ObjectId::to_short_oid)
                .collect::<Vec<_>>();
            writeln!(writer, "Merge: {}", parents.join(" "))?;
        }
        writeln!(writer, "Author: {}", commit.author())?;
        writeln!(writer, "Date:   {}", commit.date())?;
        writeln!(writer)?;
        for message_line in commit.message().lines() {
            writeln!(writer, "    {}", message_line)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
