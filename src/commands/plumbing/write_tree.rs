use crate::areas::repository::Repository;
use crate::artifacts::trees::builder::TreeBuilder;
use std::io::Write;

impl Repository {
    /// Store the tree hierarchy described by the index and print its root id
    pub async fn write_tree(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let root_oid = TreeBuilder::new(self.database()).build_from_index(&index)?;

        writeln!(self.writer(), "{}", root_oid)?;
        Ok(())
    }
}
