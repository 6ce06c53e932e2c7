//! Sink identities and openers
//!
//! A sink is any byte-oriented `AsyncWrite`. Its [`SinkId`] is the key the
//! registry uses to make sure one physical sink gets exactly one writer.

use crate::core::{LoggerError, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWrite;

/// Boxed sink handed to a destination writer.
pub type SinkHandle = Box<dyn AsyncWrite + Send + Unpin>;

/// Identity of a physical sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SinkId {
    Stdout,
    Stderr,
    /// Absolute path with a canonical parent directory
    File(PathBuf),
    /// Caller-supplied sink registered under a name
    Named(String),
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkId::Stdout => f.write_str("stdout"),
            SinkId::Stderr => f.write_str("stderr"),
            SinkId::File(path) => write!(f, "file:{}", path.display()),
            SinkId::Named(name) => write!(f, "named:{}", name),
        }
    }
}

/// Process standard stream used by a console appender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    pub fn sink_id(self) -> SinkId {
        match self {
            ConsoleTarget::Stdout => SinkId::Stdout,
            ConsoleTarget::Stderr => SinkId::Stderr,
        }
    }

    pub fn open(self) -> SinkHandle {
        match self {
            ConsoleTarget::Stdout => Box::new(tokio::io::stdout()),
            ConsoleTarget::Stderr => Box::new(tokio::io::stderr()),
        }
    }
}

/// Resolve `path` to the identity of the file it names.
///
/// Relative paths are resolved against the current directory and the parent
/// directory is canonicalized, so `logs/../logs/app.log` and `logs/app.log`
/// map to the same id. With `create_parent_dirs` missing directories are
/// created first; otherwise a missing parent is a configuration error.
pub fn resolve_file(path: &Path, create_parent_dirs: bool) -> Result<SinkId> {
    let file_name = path.file_name().ok_or_else(|| {
        LoggerError::file_destination(path.display().to_string(), "path does not name a file")
    })?;

    let absolute = std::path::absolute(path).map_err(|e| {
        LoggerError::io_operation("resolving log file path", path.display().to_string(), e)
    })?;
    let parent = match absolute.parent() {
        Some(parent) => parent.to_path_buf(),
        None => {
            return Err(LoggerError::file_destination(
                path.display().to_string(),
                "path has no parent directory",
            ))
        }
    };

    if create_parent_dirs {
        std::fs::create_dir_all(&parent).map_err(|e| {
            LoggerError::io_operation(
                "creating log directory",
                parent.display().to_string(),
                e,
            )
        })?;
    }

    let parent = parent.canonicalize().map_err(|e| {
        LoggerError::file_destination(
            path.display().to_string(),
            format!("parent directory is not accessible: {}", e),
        )
    })?;

    Ok(SinkId::File(parent.join(file_name)))
}

/// Open a resolved file path for appending, creating the file if needed.
pub fn open_file(path: &Path) -> Result<SinkHandle> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_destination(
                path.display().to_string(),
                format!("cannot open for append: {}", e),
            )
        })?;
    Ok(Box::new(tokio::fs::File::from_std(file)))
}
