use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::IoResultExt;
use std::io::Write;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        let objects_path = self.database().objects_path();
        std::fs::create_dir_all(objects_path).io_context(|| {
            format!("Unable to create object directory {}", objects_path.display())
        })?;

        self.refs().init(&BranchName::default_branch())?;

        let index = self.index();
        let mut index = index.lock().await;
        if !index.path().exists() {
            index.write_updates()?;
        }

        tracing::info!(path = %self.path().display(), "initialized repository");
        writeln!(
            self.writer(),
            "Initialized empty twig repository in {}",
            self.metadata_path().display()
        )?;

        Ok(())
    }
}
