//! Filesystem primitives shared by the visitors.
//!
//! This module provides the low-level operations the tree engine builds on:
//! - Existence probes that see dangling symbolic links
//! - Deletion tolerant of vanished targets, with one permission-remediation
//!   retry
//! - Directory creation
//! - Byte copying with optional attribute preservation
//! - Streamed byte-for-byte file comparison

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;
use tracing::warn;

use crate::error::WalkError;

/// True if the path exists, without following symbolic links.
///
/// A dangling symbolic link is reported as present. Plain `Path::exists`
/// answers for the link *target* and would let a dangling link survive a
/// "delete if present" check.
pub fn exists_no_follow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// True if the directory has no entries.
pub fn is_empty_dir(dir: &Path) -> Result<bool, WalkError> {
    let mut entries = fs::read_dir(dir).map_err(|e| WalkError::ListFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    Ok(entries.next().is_none())
}

/// Delete a file or symbolic link.
///
/// A target that is already gone is not an error: the path may have vanished
/// between listing and this call, and deletion is idempotent. When
/// `override_read_only` is set, a permission refusal is retried exactly once
/// after remediating permissions on the file and its parent; the adjusted
/// permissions are left in place afterwards.
pub fn delete_file(file: &Path, override_read_only: bool) -> Result<(), WalkError> {
    match fs::remove_file(file) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && override_read_only => {
            warn!(file = %file.display(), "permission denied, remediating and retrying delete");
            make_deletable(file, true)?;
            match fs::remove_file(file) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(WalkError::classify_write(file, e)),
            }
        }
        Err(e) => Err(WalkError::classify_write(file, e)),
    }
}

/// Delete an empty directory, with the same vanished-target tolerance and
/// single remediation retry as [`delete_file`].
pub fn delete_dir(dir: &Path, override_read_only: bool) -> Result<(), WalkError> {
    match fs::remove_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && override_read_only => {
            warn!(dir = %dir.display(), "permission denied, remediating and retrying delete");
            make_deletable(dir, true)?;
            match fs::remove_dir(dir) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(WalkError::classify_write(dir, e)),
            }
        }
        Err(e) => Err(WalkError::classify_write(dir, e)),
    }
}

/// Adjust permissions so that `path` can be unlinked.
///
/// Clears the read-only attribute where that is the platform's model, and
/// adds owner write+execute where POSIX mode bits are available. POSIX
/// requires write+execute on the *parent* to unlink a child, so the parent
/// is adjusted too when `adjust_parent` is set. Adjusted permissions are not
/// restored.
fn make_deletable(path: &Path, adjust_parent: bool) -> Result<(), WalkError> {
    make_writable(path)?;
    if adjust_parent {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                make_writable(parent)?;
            }
        }
    }
    Ok(())
}

fn make_writable(path: &Path) -> Result<(), WalkError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        // Already gone; nothing left to remediate.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(WalkError::classify(path, e)),
    };
    let mut perms = meta.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() | 0o300);
    }
    #[cfg(not(unix))]
    {
        perms.set_readonly(false);
    }

    fs::set_permissions(path, perms).map_err(|e| WalkError::classify_write(path, e))
}

/// The POSIX mode bits of a path, where the platform has them.
///
/// Answers `None` on platforms without a POSIX attribute view; callers must
/// treat the view as optionally absent, not as an error. Use
/// [`require_posix_mode`] when the view is mandatory.
pub fn posix_mode(path: &Path) -> Result<Option<u32>, WalkError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let meta = fs::symlink_metadata(path).map_err(|e| WalkError::classify(path, e))?;
        Ok(Some(meta.permissions().mode()))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(None)
    }
}

/// The POSIX mode bits of a path, required.
///
/// Unlike [`posix_mode`], an absent POSIX attribute view is an error here,
/// for callers that explicitly demand the view rather than probing for it.
pub fn require_posix_mode(path: &Path) -> Result<u32, WalkError> {
    match posix_mode(path)? {
        Some(mode) => Ok(mode),
        None => Err(WalkError::UnsupportedAttributeView {
            path: path.to_path_buf(),
            view: "posix",
        }),
    }
}

/// Create a directory (and any missing ancestors) if it does not exist yet.
///
/// A path that exists but is not a directory is rejected.
pub fn ensure_dir_exists(dir: &Path) -> Result<(), WalkError> {
    match fs::metadata(dir) {
        Ok(meta) => {
            if meta.is_dir() {
                Ok(())
            } else {
                Err(WalkError::NotADirectory {
                    path: dir.to_path_buf(),
                })
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| WalkError::CreateDirFailed {
                path: dir.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(WalkError::classify(dir, e)),
    }
}

/// Copy a file's bytes from `src` to `dst`.
///
/// With `replace_existing` unset, an existing destination is an error. With
/// `copy_attributes` set, the source's modification time is carried over.
/// A source that is a directory is rejected. Returns the number of bytes
/// copied.
pub fn copy_file(
    src: &Path,
    dst: &Path,
    replace_existing: bool,
    copy_attributes: bool,
) -> Result<u64, WalkError> {
    // Opening a directory can succeed on some platforms; the copy would
    // then fail with an unhelpful error mid-stream.
    let src_meta = fs::metadata(src).map_err(|e| WalkError::classify(src, e))?;
    if src_meta.is_dir() {
        return Err(WalkError::IsADirectory {
            path: src.to_path_buf(),
        });
    }
    let mut src_file = File::open(src).map_err(|e| WalkError::classify(src, e))?;

    let mut open_opts = OpenOptions::new();
    open_opts.write(true);
    if replace_existing {
        open_opts.create(true).truncate(true);
    } else {
        open_opts.create_new(true);
    }
    let mut dst_file = open_opts
        .open(dst)
        .map_err(|e| WalkError::classify_write(dst, e))?;

    let bytes_copied = io::copy(&mut src_file, &mut dst_file).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            WalkError::classify_write(dst, e)
        } else {
            WalkError::classify(src, e)
        }
    })?;

    if copy_attributes {
        if let Ok(mtime) = src_meta.modified() {
            let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
        }
    }

    Ok(bytes_copied)
}

/// Compare two files byte for byte.
///
/// Short-circuits before touching file contents: two absent paths are equal,
/// one absent path is unequal, the same underlying file is equal to itself,
/// and differing sizes are unequal. Only then are the two streams read and
/// compared in fixed-size chunks.
pub fn content_equals_files(a: &Path, b: &Path) -> Result<bool, WalkError> {
    let a_exists = exists_no_follow(a);
    let b_exists = exists_no_follow(b);
    if !a_exists && !b_exists {
        return Ok(true);
    }
    if a_exists != b_exists {
        return Ok(false);
    }
    if a == b {
        return Ok(true);
    }

    let a_real = fs::canonicalize(a).map_err(|e| WalkError::classify(a, e))?;
    let b_real = fs::canonicalize(b).map_err(|e| WalkError::classify(b, e))?;
    if a_real == b_real {
        return Ok(true);
    }

    let a_meta = fs::metadata(a).map_err(|e| WalkError::classify(a, e))?;
    let b_meta = fs::metadata(b).map_err(|e| WalkError::classify(b, e))?;
    if a_meta.len() != b_meta.len() {
        return Ok(false);
    }

    let mut a_file = File::open(a).map_err(|e| WalkError::classify(a, e))?;
    let mut b_file = File::open(b).map_err(|e| WalkError::classify(b, e))?;
    let mut a_buf = [0u8; 8192];
    let mut b_buf = [0u8; 8192];
    loop {
        let read = a_file
            .read(&mut a_buf)
            .map_err(|e| WalkError::classify(a, e))?;
        if read == 0 {
            return Ok(true);
        }
        // Sizes already matched, so the second stream must yield as much.
        b_file
            .read_exact(&mut b_buf[..read])
            .map_err(|e| WalkError::classify(b, e))?;
        if a_buf[..read] != b_buf[..read] {
            return Ok(false);
        }
    }
}
