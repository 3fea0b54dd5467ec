use crate::areas::repository::Repository;
use crate::artifacts::index::index_record::FileMap;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::objects::tree_builder::DirectoryNode;
use crate::errors::TwigError;

impl Repository {
    /// Store `files` as a tree hierarchy and commit it with `parents`, then
    /// move HEAD (through the current branch when attached) to the new commit
    pub fn write_commit(
        &self,
        files: &FileMap,
        parents: Vec<ObjectId>,
        message: String,
    ) -> anyhow::Result<ObjectId> {
        let tree_oid = self.write_tree(files)?;

        let config = self.config();
        let commit = Commit::new(
            tree_oid,
            parents,
            config.author(),
            config.commit_date(),
            message,
        );
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        tracing::info!(oid = %commit_oid, parents = commit.parents().len(), "wrote commit");
        Ok(commit_oid)
    }

    fn write_tree(&self, files: &FileMap) -> anyhow::Result<ObjectId> {
        let database = self.database();
        let workspace = self.workspace();
        let root = DirectoryNode::build(files)?;

        root.write(
            &mut |path: &str, oid: &ObjectId| -> anyhow::Result<()> {
                if database.contains(ObjectType::Blob, oid) {
                    return Ok(());
                }

                // staged blobs are stored by `add`; fall back to the working copy
                let stored = database.store_blob(workspace.read_file(path)?)?;
                if &stored != oid {
                    anyhow::bail!(TwigError::invalid_state(format!(
                        "{} changed since it was staged; add it again",
                        path
                    )));
                }
                Ok(())
            },
            &mut |tree: &Tree| database.store(tree).map(|_| ()),
        )
    }
}
