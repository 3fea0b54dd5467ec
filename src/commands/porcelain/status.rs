use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::StatusInfo;

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        self.refresh_index(&mut index, true)?;
        // vanished tracked files were moved to the staged deletions
        if index.is_changed() {
            index.write_updates()?;
        }

        let status = StatusInfo::collect(self.refs().read_head_state()?, &index);
        let mut writer = self.writer();
        status.render(&mut **writer)?;

        Ok(())
    }
}
