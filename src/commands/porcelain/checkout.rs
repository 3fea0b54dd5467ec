use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::REF_ALIASES;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::{Migration, Safety};
use crate::artifacts::objects::object_id::ObjectId;
use crate::commands::porcelain::is_under;
use crate::errors::TwigError;
use std::collections::BTreeSet;
use std::io::Write;

const DETACHED_HEAD_MESSAGE: &str = r"You are in 'detached HEAD' state. You can look around, make experimental
changes and commit them, and you can discard any commits you make in this
state without impacting any branches by switching back to a branch.

If you want to create a new branch to retain commits you create, you may
do so (now or later) by running branch-create after switching back with
checkout. Commits made here are only reachable through HEAD.";

enum CheckoutTarget {
    /// An existing branch, unborn when it has no commit yet
    Branch(BranchName, Option<ObjectId>),
    Commit(ObjectId),
}

impl CheckoutTarget {
    fn oid(&self) -> Option<&ObjectId> {
        match self {
            CheckoutTarget::Branch(_, oid) => oid.as_ref(),
            CheckoutTarget::Commit(oid) => Some(oid),
        }
    }
}

impl Repository {
    /// Switch the working directory, index and HEAD to a branch or commit
    ///
    /// Nothing is touched when uncommitted work would be lost.
    pub async fn checkout(&mut self, revision: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let target = self.resolve_checkout_target(revision)?;

        // staying on the current branch keeps the working tree and index as is
        if let CheckoutTarget::Branch(branch, _) = &target
            && self.refs().current_branch()?.as_ref() == Some(branch)
        {
            writeln!(self.writer(), "Already on '{}'", branch)?;
            return Ok(());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        self.refresh_index(&mut index, true)?;

        let files = self.database().commit_files(target.oid())?;
        let migration = Migration::plan(self.database(), &index, &files, Safety::Guarded);
        migration.ensure_safe("checkout")?;
        self.workspace().apply_migration(&migration)?;

        let previous = self.refs().read_head()?;
        match &target {
            CheckoutTarget::Branch(branch, _) => {
                self.refs().attach_head(branch)?;
                writeln!(self.writer(), "Switched to branch '{}'", branch)?;
            }
            CheckoutTarget::Commit(oid) => {
                let was_detached = self.refs().is_detached();
                self.refs().detach_head(oid)?;
                let commit = self.database().parse_commit(oid)?;

                if !was_detached {
                    writeln!(self.writer(), "Note: switching to '{}'.\n", revision)?;
                    writeln!(self.writer(), "{}\n", DETACHED_HEAD_MESSAGE)?;
                } else if let Some(previous) = previous.as_ref().filter(|previous| *previous != oid) {
                    writeln!(
                        self.writer(),
                        "Previous HEAD position was {}",
                        previous.to_short_oid()
                    )?;
                }
                writeln!(
                    self.writer(),
                    "HEAD is now at {} {}",
                    oid.to_short_oid(),
                    commit.short_message()
                )?;
            }
        }

        index.switch_to(files);
        index.write_updates()?;

        Ok(())
    }

    /// Overwrite paths with their last known content, without safety checks
    ///
    /// Content comes from the tracked or staged-deleted hash, or from the
    /// staged hash for files that were never committed.
    pub async fn checkout_files(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        for path in paths {
            let relative = self.workspace().normalize(path)?;
            let known = index
                .tracked()
                .keys()
                .chain(index.removed().keys())
                .chain(index.added().keys())
                .filter(|known| is_under(known, &relative))
                .cloned()
                .collect::<BTreeSet<_>>();

            if known.is_empty() {
                anyhow::bail!(TwigError::not_found(format!(
                    "pathspec '{}' did not match any file(s) known to twig",
                    path
                )));
            }

            for file in known {
                let committed = index
                    .tracked()
                    .get(&file)
                    .or_else(|| index.removed().get(&file))
                    .cloned();

                match committed {
                    Some(oid) => {
                        self.restore_file(&file, &oid)?;
                        index.restore(&file, oid);
                    }
                    None => {
                        if let Some(oid) = index.added().get(&file).cloned() {
                            self.restore_file(&file, &oid)?;
                        }
                    }
                }
            }
        }

        index.write_updates()?;

        Ok(())
    }

    fn resolve_checkout_target(&self, revision: &str) -> anyhow::Result<CheckoutTarget> {
        // HEAD names the current branch while attached
        let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
        if resolved_name == HEAD_REF_NAME
            && let Some(branch) = self.refs().current_branch()?
        {
            let oid = self.refs().read_branch(&branch)?;
            return Ok(CheckoutTarget::Branch(branch, oid));
        }

        if let Ok(branch) = BranchName::try_parse(revision)
            && self.refs().branch_exists(&branch)
        {
            let oid = self.refs().read_branch(&branch)?;
            return Ok(CheckoutTarget::Branch(branch, oid));
        }

        let oid = Revision::try_parse(revision)?.resolve(self)?;
        Ok(CheckoutTarget::Commit(oid))
    }

    fn restore_file(&self, path: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let blob = self.database().load_blob(oid)?;
        self.workspace().write_file(path, blob.content())?;

        tracing::debug!(path, %oid, "restored file");
        Ok(())
    }
}
