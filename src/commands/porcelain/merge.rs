use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::{Migration, Safety};
use crate::artifacts::index::index_record::FileMap;
use crate::artifacts::merge::ancestry::Ancestry;
use crate::artifacts::merge::diff::ThreeWayDiff;
use crate::artifacts::merge::strategy::MergeStrategy;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use std::io::Write;

impl Repository {
    /// Merge another branch into the current one
    ///
    /// Conflicting changes abort the merge before anything is written.
    pub async fn merge(&mut self, branch: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let Some(current) = self.refs().current_branch()? else {
            anyhow::bail!(TwigError::invalid_state(
                "cannot merge while HEAD is detached"
            ));
        };
        let target = BranchName::try_parse(branch)
            .map_err(|_| TwigError::not_found(format!("branch '{}' not found", branch)))?;
        if !self.refs().branch_exists(&target) {
            anyhow::bail!(TwigError::not_found(format!("branch '{}' not found", branch)));
        }
        let theirs = self.refs().read_branch(&target)?.ok_or_else(|| {
            TwigError::not_found(format!("branch '{}' has no commits yet", branch))
        })?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        self.refresh_index(&mut index, true)?;

        let ours = self.refs().read_head()?;
        let strategy = match &ours {
            Some(ours) => {
                let database = self.database();
                let ancestry = Ancestry::new(|oid: &ObjectId| {
                    Ok(database.parse_commit(oid)?.parents().to_vec())
                });
                MergeStrategy::select(&ancestry, ours, &theirs)?
            }
            // an unborn branch simply adopts the other history
            None => MergeStrategy::FastForward,
        };

        match strategy {
            MergeStrategy::AlreadyUpdated => {
                writeln!(self.writer(), "Already up to date.")?;
            }
            MergeStrategy::FastForward => {
                let files = self.database().commit_files(Some(&theirs))?;
                self.migrate_for_merge(&mut index, &files)?;
                self.refs().update_branch(&current, &theirs)?;

                if let Some(ours) = &ours {
                    writeln!(
                        self.writer(),
                        "Updating {}..{}",
                        ours.to_short_oid(),
                        theirs.to_short_oid()
                    )?;
                }
                writeln!(self.writer(), "Fast-forward")?;
            }
            MergeStrategy::Recursive { base } => {
                let base_files = self.database().commit_files(base.as_ref())?;
                let our_files = self.database().commit_files(ours.as_ref())?;
                let their_files = self.database().commit_files(Some(&theirs))?;

                let diff = ThreeWayDiff::new(&base_files, &our_files, &their_files);
                let conflicts = diff.conflicts();
                if !conflicts.is_empty() {
                    tracing::warn!(paths = conflicts.len(), "merge conflict");
                    anyhow::bail!(TwigError::MergeConflict { paths: conflicts });
                }

                let merged = diff.merged();
                self.migrate_for_merge(&mut index, &merged)?;

                let parents = ours.into_iter().chain([theirs]).collect();
                let message = format!("Merge branch '{}' into {}", target, current);
                self.write_commit(&merged, parents, message)?;

                writeln!(self.writer(), "Merge made by the 'recursive' strategy.")?;
            }
        }

        if index.is_changed() {
            index.write_updates()?;
        }

        Ok(())
    }

    /// Bring the working directory and index to the merged snapshot, refusing
    /// to lose uncommitted work
    fn migrate_for_merge(&self, index: &mut Index, files: &FileMap) -> anyhow::Result<()> {
        let migration = Migration::plan(self.database(), index, files, Safety::Guarded);
        migration.ensure_safe("merge")?;
        self.workspace().apply_migration(&migration)?;

        index.switch_to(files.clone());
        Ok(())
    }
}
