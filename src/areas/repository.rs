use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::config::Config;
use crate::errors::{IoResultExt, TwigError};
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name of the metadata directory inside the working tree
pub const METADATA_DIR: &str = ".twig";

/// Everything one command needs: the areas of a single repository, the
/// configuration it runs with and the sink for human-readable output
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    config: Config,
}

impl Repository {
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>, config: Config) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .io_context(|| format!("Unable to create directory {}", path.display()))?;
        }
        let path = path
            .canonicalize()
            .io_context(|| format!("Unable to resolve {}", path.display()))?;
        let metadata_path = path.join(METADATA_DIR);

        let index = Index::new(metadata_path.join("index").into_boxed_path());
        let database = Database::new(metadata_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(metadata_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> Box<Path> {
        self.path.join(METADATA_DIR).into_boxed_path()
    }

    /// Fail with `NotFound` unless `init` has run here
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if !self.metadata_path().is_dir() {
            anyhow::bail!(TwigError::not_found(format!(
                "not a twig repository: {}",
                self.path.display()
            )));
        }

        Ok(())
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Recompute the index's view of the disk: unstaged modifications, vanished
    /// tracked files and, with `with_untracked`, untracked files
    pub fn refresh_index(&self, index: &mut Index, with_untracked: bool) -> anyhow::Result<()> {
        let workspace = self.workspace();
        index.update_modifying(|path| workspace.hash_file(path))?;

        if with_untracked {
            let files = workspace.list_files()?;
            index.search_untracked(&files, |path| workspace.hash_file(path))?;
        }

        Ok(())
    }
}
