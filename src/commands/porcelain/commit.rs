use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::errors::TwigError;
use std::io::Write;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        self.refresh_index(&mut index, false)?;

        let parent = self.refs().read_head()?;
        if parent.is_some() && !index.has_staged_changes() {
            anyhow::bail!(TwigError::invalid_state(
                "nothing to commit, working tree clean"
            ));
        }

        let is_root = match parent {
            Some(_) => "",
            None => " (root-commit)",
        };
        let message = message.trim().to_string();
        let snapshot = index.snapshot();

        let commit_oid = self.write_commit(&snapshot, parent.into_iter().collect(), message.clone())?;
        index.update_after_commit();
        index.write_updates()?;

        let label = match self.refs().read_head_state()? {
            Head::Attached(branch) => branch.to_string(),
            Head::Detached(_) => "detached HEAD".to_string(),
        };
        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            label,
            is_root,
            commit_oid.to_short_oid(),
            message.lines().next().unwrap_or_default()
        )?;

        Ok(())
    }
}
