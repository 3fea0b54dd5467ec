use crate::areas::repository::Repository;
use crate::commands::porcelain::is_under;
use std::collections::BTreeSet;

impl Repository {
    /// Unstage paths, leaving the files on disk
    ///
    /// A staged-new path leaves the index; a tracked one has its deletion
    /// staged. Unknown paths are ignored.
    pub async fn rm(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        for path in paths {
            let relative = self.workspace().normalize(path)?;
            let known = index
                .tracked()
                .keys()
                .chain(index.added().keys())
                .filter(|known| is_under(known, &relative))
                .cloned()
                .collect::<BTreeSet<_>>();

            if known.is_empty() {
                tracing::debug!(path = %relative, "ignoring unknown path");
            }
            for file in known {
                index.unstage(&file);
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
