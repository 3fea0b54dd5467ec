use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::{Migration, Safety};
use std::io::Write;

impl Repository {
    /// Move HEAD (and the current branch) to a revision, discarding staged
    /// and unstaged changes to tracked files
    ///
    /// Untracked and staged-new files stay on disk.
    pub async fn reset(&mut self, revision: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let target = Revision::try_parse(revision)?.resolve(self)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        self.refresh_index(&mut index, true)?;

        let files = self.database().commit_files(Some(&target))?;
        let migration = Migration::plan(self.database(), &index, &files, Safety::Discard);
        self.workspace().apply_migration(&migration)?;

        self.refs().update_head(&target)?;
        index.reset_to(files);
        index.write_updates()?;

        let commit = self.database().parse_commit(&target)?;
        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            target.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
