//! Error types for the tree engine.
//!
//! The primary error type is `WalkError`. An error aborts the remainder of
//! the current walk and surfaces synchronously to the caller; whatever
//! counters were accumulated before the failure remain available for
//! diagnostics when the caller threaded its own PathCounters through.

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by tree operations.
///
/// Note: WalkError wraps io::Error and is not directly serializable
/// (io::Error itself is not Serialize).
#[derive(Debug)]
pub enum WalkError {
    /// Path vanished between listing and action
    NotFound { path: PathBuf, source: io::Error },

    /// Operation blocked by OS permissions
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Operation requires a directory but the path is not one
    NotADirectory { path: PathBuf },

    /// Operation requires a file but the path is a directory
    IsADirectory { path: PathBuf },

    /// Copy target already exists and replacement was not requested
    AlreadyExists { path: PathBuf, source: io::Error },

    /// Requested attribute view (POSIX/DOS) is unavailable on this platform
    UnsupportedAttributeView { path: PathBuf, view: &'static str },

    /// Internal invariant violated during content comparison; indicates a
    /// defect or concurrent external mutation, not a user error
    StructuralMismatch { path: PathBuf },

    /// Failed to read a file or its metadata
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write or delete a file
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to enumerate a directory
    ListFailed { path: PathBuf, source: io::Error },
}

impl Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path, .. } => {
                write!(f, "Path not found: {}", path.display())
            }
            Self::PermissionDenied { path, .. } => {
                write!(f, "Permission denied: {}", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Not a directory: {}", path.display())
            }
            Self::IsADirectory { path } => {
                write!(f, "Is a directory: {}", path.display())
            }
            Self::AlreadyExists { path, .. } => {
                write!(f, "Target already exists: {}", path.display())
            }
            Self::UnsupportedAttributeView { path, view } => {
                write!(
                    f,
                    "Attribute view '{}' unsupported for: {}",
                    view,
                    path.display()
                )
            }
            Self::StructuralMismatch { path } => {
                write!(
                    f,
                    "Tree structure changed during comparison: {}",
                    path.display()
                )
            }
            Self::ReadFailed { path, .. } => {
                write!(f, "Failed to read: {}", path.display())
            }
            Self::WriteFailed { path, .. } => {
                write!(f, "Failed to write: {}", path.display())
            }
            Self::CreateDirFailed { path, .. } => {
                write!(f, "Failed to create directory: {}", path.display())
            }
            Self::ListFailed { path, .. } => {
                write!(f, "Failed to enumerate directory: {}", path.display())
            }
        }
    }
}

impl Error for WalkError {}

impl WalkError {
    /// Map an io::Error from a read-side operation into the taxonomy.
    pub fn classify(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path, source },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path, source },
            _ => Self::ReadFailed { path, source },
        }
    }

    /// Map an io::Error from a write or delete operation into the taxonomy.
    pub fn classify_write(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path, source },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path, source },
            _ => Self::WriteFailed { path, source },
        }
    }

    /// True if this error reports a vanished path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True if this error reports an OS permission refusal.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// The path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. }
            | Self::PermissionDenied { path, .. }
            | Self::NotADirectory { path }
            | Self::IsADirectory { path }
            | Self::AlreadyExists { path, .. }
            | Self::UnsupportedAttributeView { path, .. }
            | Self::StructuralMismatch { path }
            | Self::ReadFailed { path, .. }
            | Self::WriteFailed { path, .. }
            | Self::CreateDirFailed { path, .. }
            | Self::ListFailed { path, .. } => path,
        }
    }

    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::NotFound { source, .. }
            | Self::PermissionDenied { source, .. }
            | Self::AlreadyExists { source, .. }
            | Self::ReadFailed { source, .. }
            | Self::WriteFailed { source, .. }
            | Self::CreateDirFailed { source, .. }
            | Self::ListFailed { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
