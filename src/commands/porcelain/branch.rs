use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::TwigError;
use std::io::Write;

impl Repository {
    /// Create a branch at HEAD and switch to it
    ///
    /// The working directory and index are left as they are, since the new
    /// branch points at the commit already checked out.
    pub async fn branch_create(&mut self, name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let branch = BranchName::try_parse(name)?;

        let head = self.refs().read_head()?;
        self.refs().create_branch(&branch, head.as_ref())?;
        self.refs().attach_head(&branch)?;

        writeln!(self.writer(), "Switched to a new branch '{}'", branch)?;

        Ok(())
    }

    pub async fn branch_remove(&mut self, name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        let branch = BranchName::try_parse(name)
            .map_err(|_| TwigError::not_found(format!("branch '{}' not found", name)))?;

        if !self.refs().branch_exists(&branch) {
            anyhow::bail!(TwigError::not_found(format!("branch '{}' not found", name)));
        }
        if self.refs().current_branch()?.as_ref() == Some(&branch) {
            anyhow::bail!(TwigError::invalid_state(format!(
                "cannot delete branch '{}' checked out at HEAD",
                branch
            )));
        }

        let oid = self.refs().delete_branch(&branch)?;
        let was = oid
            .map(|oid| oid.to_short_oid())
            .unwrap_or_else(|| "unborn".to_string());
        writeln!(self.writer(), "Deleted branch {} (was {}).", branch, was)?;

        Ok(())
    }

    pub async fn show_branches(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let head = self.refs().read_head_state()?;
        let mut writer = self.writer();

        if let Head::Detached(oid) = &head {
            writeln!(writer, "* (HEAD detached at {})", oid.to_short_oid())?;
        }
        for branch in self.refs().list_branches()? {
            let marker = match &head {
                Head::Attached(current) if *current == branch => "* ",
                _ => "  ",
            };
            writeln!(writer, "{}{}", marker, branch)?;
        }

        Ok(())
    }
}
