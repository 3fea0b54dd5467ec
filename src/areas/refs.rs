//! Branch refs and HEAD
//!
//! Layout under the metadata directory:
//!
//! - `HEAD`: `ref: refs/heads/<branch>` when attached, a raw commit id when detached
//! - `DETACHED_HEAD`: marker file, present only in detached mode
//! - `branch`: name of the current (or last attached) branch
//! - `refs/heads/<branch>`: commit id of the branch tip, empty for an unborn branch
//!
//! Every ref write takes an exclusive lock on the file being written.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{IoResultExt, TwigError};
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing the symbolic content of HEAD
const SYMREF_REGEX: &str = r"^ref: refs/heads/(.+)$";

pub const HEAD_REF_NAME: &str = "HEAD";
pub const DETACHED_MARKER: &str = "DETACHED_HEAD";
pub const BRANCH_FILE: &str = "branch";

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Attached(BranchName),
    Detached(ObjectId),
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (`.twig`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.path.join("refs").join("heads").into_boxed_path()
    }

    fn marker_path(&self) -> Box<Path> {
        self.path.join(DETACHED_MARKER).into_boxed_path()
    }

    fn branch_file_path(&self) -> Box<Path> {
        self.path.join(BRANCH_FILE).into_boxed_path()
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.heads_path().join(name.as_ref()).into_boxed_path()
    }

    /// Lay out HEAD, the current-branch file and an unborn default branch
    ///
    /// Existing refs are left untouched.
    pub fn init(&self, branch: &BranchName) -> anyhow::Result<()> {
        std::fs::create_dir_all(self.heads_path()).io_context(|| {
            format!("Unable to create refs directory {}", self.heads_path().display())
        })?;

        if !self.head_path().exists() {
            self.attach_head(branch)?;
        }
        if !self.branch_path(branch).exists() {
            self.update_ref_file(self.branch_path(branch), String::new())?;
        }

        Ok(())
    }

    pub fn is_detached(&self) -> bool {
        self.marker_path().exists()
    }

    pub fn read_head_state(&self) -> anyhow::Result<Head> {
        let content = Self::read_ref_file(&self.head_path())?.unwrap_or_default();

        let symref = regex::Regex::new(SYMREF_REGEX)
            .with_context(|| format!("invalid symref regex: {SYMREF_REGEX}"))?
            .captures(&content)
            .map(|caps| caps[1].to_string());

        match symref {
            Some(branch) => Ok(Head::Attached(BranchName::try_parse(branch)?)),
            None if self.is_detached() => Ok(Head::Detached(ObjectId::try_parse(content)?)),
            // a bare branch name, as written by older layouts
            None => Ok(Head::Attached(BranchName::try_parse(content)?)),
        }
    }

    /// Commit HEAD resolves to, `None` on an unborn branch
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match self.read_head_state()? {
            Head::Attached(branch) => match self.read_branch(&branch) {
                Ok(oid) => Ok(oid),
                Err(error) if matches!(TwigError::kind_of(&error), Some(TwigError::NotFound(_))) => {
                    Ok(None)
                }
                Err(error) => Err(error),
            },
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    /// Branch HEAD is attached to, `None` when detached
    pub fn current_branch(&self) -> anyhow::Result<Option<BranchName>> {
        match self.read_head_state()? {
            Head::Attached(branch) => Ok(Some(branch)),
            Head::Detached(_) => Ok(None),
        }
    }

    /// Last branch HEAD was attached to, as recorded in the `branch` file
    pub fn last_branch(&self) -> anyhow::Result<Option<BranchName>> {
        match Self::read_ref_file(&self.branch_file_path())? {
            Some(name) => Ok(Some(BranchName::try_parse(name)?)),
            None => Ok(None),
        }
    }

    pub fn attach_head(&self, branch: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(self.head_path(), format!("ref: refs/heads/{}", branch))?;
        self.update_ref_file(self.branch_file_path(), branch.to_string())?;

        let marker = self.marker_path();
        if marker.exists() {
            std::fs::remove_file(&marker)
                .io_context(|| format!("Unable to remove {}", marker.display()))?;
        }

        tracing::debug!(branch = %branch, "attached HEAD");
        Ok(())
    }

    pub fn detach_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(self.marker_path(), String::new())?;
        self.update_ref_file(self.head_path(), oid.to_string())?;

        tracing::debug!(oid = %oid, "detached HEAD");
        Ok(())
    }

    /// Move whatever HEAD points at: the current branch, or HEAD itself when
    /// detached
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.read_head_state()? {
            Head::Attached(branch) => self.update_branch(&branch, oid),
            Head::Detached(_) => self.update_ref_file(self.head_path(), oid.to_string()),
        }
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    /// Tip of a branch, `None` when the branch is unborn
    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        if !self.branch_exists(name) {
            anyhow::bail!(TwigError::not_found(format!("branch {} not found", name)));
        }

        match Self::read_ref_file(&self.branch_path(name))? {
            Some(content) => Ok(Some(ObjectId::try_parse(content)?)),
            None => Ok(None),
        }
    }

    pub fn update_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(self.branch_path(name), oid.to_string())?;

        tracing::debug!(branch = %name, oid = %oid, "updated branch");
        Ok(())
    }

    pub fn create_branch(&self, name: &BranchName, oid: Option<&ObjectId>) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            anyhow::bail!(TwigError::invalid_state(format!(
                "a branch named '{}' already exists",
                name
            )));
        }

        let content = oid.map(ObjectId::to_string).unwrap_or_default();
        self.update_ref_file(self.branch_path(name), content)
    }

    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let oid = self.read_branch(name)?;
        let branch_path = self.branch_path(name);

        std::fs::remove_file(&branch_path)
            .io_context(|| format!("Unable to delete branch file {}", branch_path.display()))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        Ok(oid)
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();
        let mut branches = Vec::new();

        for entry in WalkDir::new(&heads_path).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("Unable to list {}", heads_path.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&heads_path)
                .with_context(|| format!("Invalid ref path {}", entry.path().display()))?;
            let name = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            branches.push(BranchName::try_parse(name)?);
        }

        branches.sort();
        Ok(branches)
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    /// Trimmed content of a ref file, `None` when missing or empty
    fn read_ref_file(path: &Path) -> anyhow::Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .io_context(|| format!("Unable to read ref file {}", path.display()))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content.to_string()))
        }
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("Invalid ref path {}", path.display()))?;
        std::fs::create_dir_all(parent)
            .io_context(|| format!("Unable to create directory {}", parent.display()))?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .io_context(|| format!("Unable to open ref file {}", path.display()))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)
            .io_context(|| format!("Unable to lock ref file {}", path.display()))?;
        lock.deref_mut()
            .write_all(raw_ref.as_bytes())
            .io_context(|| format!("Unable to write ref file {}", path.display()))?;

        Ok(())
    }
}
