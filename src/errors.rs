//! Failure taxonomy
//!
//! Every core operation returns `anyhow::Result`. Failures that callers need to
//! tell apart are raised as a [`TwigError`] so they can be recovered with
//! `err.downcast_ref::<TwigError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwigError {
    /// Reading, writing or creating a repository file failed
    #[error("{message}")]
    IoFailure {
        message: String,
        #[source]
        source: std::io::Error,
    },
    /// Unknown branch, unknown object id or unresolvable revision
    #[error("{0}")]
    NotFound(String),
    /// The operation would discard uncommitted work or the repository is in
    /// the wrong mode for it
    #[error("{0}")]
    InvalidState(String),
    /// Both sides of a merge changed the same paths differently
    #[error("{}", render_conflict(paths))]
    MergeConflict { paths: Vec<String> },
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl TwigError {
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        TwigError::IoFailure {
            message: message.into(),
            source,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        TwigError::NotFound(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        TwigError::InvalidState(message.into())
    }

    /// Classify an `anyhow` error produced by the core
    pub fn kind_of(error: &anyhow::Error) -> Option<&TwigError> {
        error.downcast_ref::<TwigError>()
    }
}

/// Attach a message to an I/O failure, classifying it as [`TwigError::IoFailure`]
/// or, for a missing file, [`TwigError::NotFound`] when asked to
pub trait IoResultExt<T> {
    fn io_context<F>(self, message: F) -> Result<T, TwigError>
    where
        F: FnOnce() -> String;

    fn or_not_found<F>(self, message: F) -> Result<T, TwigError>
    where
        F: FnOnce() -> String;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn io_context<F>(self, message: F) -> Result<T, TwigError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|source| TwigError::io(message(), source))
    }

    fn or_not_found<F>(self, message: F) -> Result<T, TwigError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => TwigError::NotFound(message()),
            _ => TwigError::io(message(), source),
        })
    }
}

fn render_conflict(paths: &[String]) -> String {
    let mut message = String::from("Merge conflict in files:\n");
    for path in paths {
        message.push('\t');
        message.push_str(path);
        message.push('\n');
    }
    message.push_str("Automatic merge failed; fix conflicts and then commit the result.");
    message
}
