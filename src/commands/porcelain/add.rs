use crate::areas::repository::Repository;
use crate::commands::porcelain::is_under;
use crate::errors::TwigError;
use std::collections::BTreeSet;

impl Repository {
    /// Stage the current content of each path
    ///
    /// Directories expand to every file below them. Known paths that are gone
    /// from disk have their deletion staged instead.
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        for path in paths {
            let relative = self.workspace().normalize(path)?;
            let files = self.workspace().list_files_under(&relative)?;

            let vanished = index
                .tracked()
                .keys()
                .chain(index.added().keys())
                .filter(|known| is_under(known, &relative) && !self.workspace().is_file(known))
                .cloned()
                .collect::<BTreeSet<_>>();

            if files.is_empty() && vanished.is_empty() {
                anyhow::bail!(TwigError::not_found(format!(
                    "pathspec '{}' did not match any files",
                    path
                )));
            }

            for file in files {
                let content = self.workspace().read_file(&file)?;
                let oid = self.database().store_blob(content)?;
                tracing::debug!(path = %file, %oid, "staging file");
                index.stage(&file, oid);
            }

            for file in vanished {
                tracing::debug!(path = %file, "staging deletion");
                index.stage_deletion(&file);
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
