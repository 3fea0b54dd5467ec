use assert_fs::TempDir;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use twig::areas::repository::Repository;
use twig::artifacts::index::index_record::FileMap;
use twig::artifacts::objects::commit::Commit;
use twig::artifacts::objects::object_id::ObjectId;
use twig::config::Config;
use twig::errors::TwigError;

/// Output sink whose content stays readable after handing it to a repository
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8(bytes).expect("output is not UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// An in-process repository in a temporary directory
pub struct TestRepository {
    pub dir: TempDir,
    pub repository: Repository,
    output: SharedBuffer,
}

pub fn test_config() -> Config {
    let date = chrono::DateTime::parse_from_rfc2822("Sun, 01 Jan 2023 12:00:00 +0000")
        .expect("valid test date");
    Config::new("fake_user", "fake_email@email.com").with_author_date(date)
}

pub async fn init_repository() -> TestRepository {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = SharedBuffer::default();
    let mut repository = Repository::new(dir.path(), Box::new(output.clone()), test_config())
        .expect("Failed to open repository");

    repository.init().await.expect("init failed");
    output.take();

    TestRepository {
        dir,
        repository,
        output,
    }
}

impl TestRepository {
    pub fn write(&self, path: &str, content: &str) {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(path)).expect("Failed to read file")
    }

    pub fn exists(&self, path: &str) -> bool {
        self.dir.path().join(path).exists()
    }

    pub fn delete(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).expect("Failed to delete file");
    }

    pub fn take_output(&self) -> String {
        self.output.take()
    }

    pub async fn add(&mut self, paths: &[&str]) -> anyhow::Result<()> {
        let paths = paths.iter().map(|path| path.to_string()).collect::<Vec<_>>();
        self.repository.add(&paths).await
    }

    pub async fn rm(&mut self, paths: &[&str]) -> anyhow::Result<()> {
        let paths = paths.iter().map(|path| path.to_string()).collect::<Vec<_>>();
        self.repository.rm(&paths).await
    }

    /// Stage everything and commit, returning the new HEAD commit id
    pub async fn commit_all(&mut self, message: &str) -> ObjectId {
        self.add(&["."]).await.expect("add failed");
        self.repository.commit(message).await.expect("commit failed");
        self.take_output();
        self.head().expect("HEAD has no commit")
    }

    pub fn head(&self) -> Option<ObjectId> {
        self.repository.refs().read_head().expect("Failed to read HEAD")
    }

    pub fn parse_commit(&self, oid: &ObjectId) -> Commit {
        self.repository
            .database()
            .parse_commit(oid)
            .expect("Failed to parse commit")
    }

    /// The persisted `tracked` map, read back from disk
    pub async fn tracked(&self) -> FileMap {
        let index = self.repository.index();
        let mut index = index.lock().await;
        index.rehydrate().expect("Failed to load index");
        index.tracked().clone()
    }

    pub fn commit_count(&self) -> usize {
        crate::common::file::count_commits(self.dir.path())
    }
}

pub fn error_kind(error: &anyhow::Error) -> &TwigError {
    error
        .downcast_ref::<TwigError>()
        .unwrap_or_else(|| panic!("not a twig error: {error:?}"))
}
