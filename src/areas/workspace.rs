use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{IoResultExt, TwigError};
use anyhow::Context;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 1] = [crate::areas::repository::METADATA_DIR];

/// Working directory, addressed with `/`-separated paths relative to its root
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn a user-supplied path into a workspace-relative one
    ///
    /// Absolute paths must lie inside the workspace. `.` maps to the empty
    /// string, meaning the workspace root.
    pub fn normalize(&self, path: &str) -> anyhow::Result<String> {
        let path = Path::new(path);
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.path).map_err(|_| {
                TwigError::not_found(format!("{} is outside the repository", path.display()))
            })?
        } else {
            path
        };

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if segments.pop().is_none() {
                        anyhow::bail!(TwigError::not_found(format!(
                            "{} is outside the repository",
                            path.display()
                        )));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {}
            }
        }

        Ok(segments.join("/"))
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()),
            _ => false,
        })
    }

    fn to_relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.path).ok()?;
        if Self::is_ignored(relative) {
            return None;
        }

        Some(
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        )
    }

    /// Every regular file in the workspace, sorted
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        self.list_files_under("")
    }

    /// Every regular file at or below a workspace-relative path, sorted
    ///
    /// A missing path yields an empty list.
    pub fn list_files_under(&self, relative: &str) -> anyhow::Result<Vec<String>> {
        let root = self.absolute(relative);
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let path = entry.path();
                !Self::is_ignored(path.strip_prefix(&self.path).unwrap_or(path))
            });

        for entry in walker {
            let entry = entry.with_context(|| format!("Unable to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(relative) = self.to_relative(entry.path()) {
                files.push(relative);
            }
        }

        files.sort();
        Ok(files)
    }

    fn absolute(&self, relative: &str) -> PathBuf {
        if relative.is_empty() {
            self.path.to_path_buf()
        } else {
            self.path.join(relative)
        }
    }

    pub fn is_file(&self, relative: &str) -> bool {
        self.absolute(relative).is_file()
    }

    pub fn is_dir(&self, relative: &str) -> bool {
        self.absolute(relative).is_dir()
    }

    pub fn read_file(&self, relative: &str) -> anyhow::Result<Bytes> {
        let path = self.absolute(relative);
        let content =
            std::fs::read(&path).or_not_found(|| format!("Unable to read file {}", relative))?;

        Ok(content.into())
    }

    /// Content hash of a file, `None` when the path is not a regular file
    pub fn hash_file(&self, relative: &str) -> anyhow::Result<Option<ObjectId>> {
        if !self.is_file(relative) {
            return Ok(None);
        }

        let content = self.read_file(relative)?;
        Ok(Some(ObjectId::hash_of(&content)))
    }

    /// Write a file, creating parent directories and clearing whatever is in
    /// the way
    pub fn write_file(&self, relative: &str, content: &[u8]) -> anyhow::Result<()> {
        let path = self.absolute(relative);

        if let Some(parent) = Path::new(relative).parent() {
            self.make_directories(parent)?;
        }
        if path.is_dir() {
            std::fs::remove_dir_all(&path)
                .io_context(|| format!("Unable to remove directory {}", relative))?;
        }

        std::fs::write(&path, content).io_context(|| format!("Unable to write file {}", relative))?;

        Ok(())
    }

    /// Remove a file and prune the directories it leaves empty
    pub fn remove_file(&self, relative: &str) -> anyhow::Result<()> {
        let path = self.absolute(relative);

        if path.is_file() {
            std::fs::remove_file(&path)
                .io_context(|| format!("Unable to remove file {}", relative))?;
        }

        let mut parent = Path::new(relative).parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            let dir_path = self.path.join(dir);
            let is_empty = std::fs::read_dir(&dir_path)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !is_empty {
                break;
            }
            std::fs::remove_dir(&dir_path)
                .io_context(|| format!("Unable to remove directory {}", dir.display()))?;
            parent = dir.parent();
        }

        Ok(())
    }

    /// Create every directory on the way to `relative`, replacing files that
    /// sit where a directory must go
    fn make_directories(&self, relative: &Path) -> anyhow::Result<()> {
        let mut current = self.path.to_path_buf();

        for component in relative.components() {
            current.push(component);
            if current.is_file() {
                std::fs::remove_file(&current)
                    .io_context(|| format!("Unable to remove file {}", current.display()))?;
            }
            if !current.is_dir() {
                std::fs::create_dir(&current)
                    .io_context(|| format!("Unable to create directory {}", current.display()))?;
            }
        }

        Ok(())
    }

    // Deletions run first so that a file replaced by a directory (or the
    // other way round) is out of the way before the writes
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for path in migration.deletions() {
            self.remove_file(path)?;
        }

        for (path, oid) in migration.writes() {
            let content = migration.load_blob_data(oid)?;
            self.write_file(path, &content)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dir() -> assert_fs::TempDir {
        assert_fs::TempDir::new().unwrap()
    }

    fn workspace(dir: &assert_fs::TempDir) -> Workspace {
        Workspace::new(dir.path().canonicalize().unwrap().into_boxed_path())
    }

    #[rstest]
    fn list_files_skips_metadata_directory(dir: assert_fs::TempDir) {
        dir.child("b.txt").write_str("b").unwrap();
        dir.child("a/c.txt").write_str("c").unwrap();
        dir.child(".twig/index").write_str("{}").unwrap();

        let files = workspace(&dir).list_files().unwrap();

        assert_eq!(files, vec!["a/c.txt", "b.txt"]);
    }

    #[rstest]
    #[case("./a/../b.txt", "b.txt")]
    #[case(".", "")]
    #[case("dir/sub/", "dir/sub")]
    fn normalize_strips_dots(dir: assert_fs::TempDir, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(workspace(&dir).normalize(input).unwrap(), expected);
    }

    #[rstest]
    fn normalize_rejects_escaping_paths(dir: assert_fs::TempDir) {
        let error = workspace(&dir).normalize("../outside.txt").unwrap_err();
        assert!(matches!(
            TwigError::kind_of(&error),
            Some(TwigError::NotFound(_))
        ));
    }

    #[rstest]
    fn remove_file_prunes_empty_directories(dir: assert_fs::TempDir) {
        let workspace = workspace(&dir);
        workspace.write_file("a/b/c.txt", b"c").unwrap();
        workspace.write_file("a/d.txt", b"d").unwrap();

        workspace.remove_file("a/b/c.txt").unwrap();

        dir.child("a/b").assert(predicates::path::missing());
        dir.child("a/d.txt").assert("d");
    }

    #[rstest]
    fn write_file_replaces_file_in_the_way_of_a_directory(dir: assert_fs::TempDir) {
        let workspace = workspace(&dir);
        workspace.write_file("a", b"file").unwrap();

        workspace.write_file("a/b.txt", b"nested").unwrap();

        dir.child("a/b.txt").assert("nested");
    }

    #[rstest]
    fn hash_file_is_none_for_missing_or_directory(dir: assert_fs::TempDir) {
        let workspace = workspace(&dir);
        workspace.write_file("d/f.txt", b"aaa").unwrap();

        assert_eq!(workspace.hash_file("missing").unwrap(), None);
        assert_eq!(workspace.hash_file("d").unwrap(), None);
        assert_eq!(
            workspace.hash_file("d/f.txt").unwrap(),
            Some(ObjectId::hash_of(b"aaa"))
        );
    }
}
