//! Facade operations.
//!
//! Each function here performs exactly one complete walk (two, for the
//! comparisons) and returns its counters or verdict. The lower modules do
//! the work; this module wires a fresh PathCounters and the right visitor
//! to the traversal engine. The `*_into` variants thread a caller-owned
//! PathCounters instead, for cumulative totals across several calls.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::compare;
use crate::copy::CopyOption;
use crate::counters::{CounterKind, PathCounters};
use crate::counting::CountingVisitor;
use crate::delete::DeleteOption;
use crate::error::WalkError;
use crate::fs_ops;
use crate::walk::{walk, WalkOptions};

/// Count the files, directories, and bytes under `root`.
///
/// Uses the default filters: symbolic links are not counted, every
/// directory is descended into. A file root yields a single-file count.
pub fn count<P: AsRef<Path>>(
    root: P,
    options: &WalkOptions,
    kind: CounterKind,
) -> Result<PathCounters, WalkError> {
    let root = root.as_ref();
    debug!(root = %root.display(), "count");
    let mut counters = PathCounters::new(kind);
    let mut visitor = CountingVisitor::new(&mut counters);
    walk(root, options, &mut visitor)?;
    Ok(counters)
}

/// Delete the file or tree at `path`, returning what was visited.
///
/// An absent path is not an error and yields zero counters, so deleting an
/// already-deleted tree a second time is harmless. Entries whose final name
/// is in `skip` are shielded from deletion (directories are pruned whole)
/// but files outside pruned subtrees are still counted. Symbolic links are
/// removed, never followed.
pub fn delete<P: AsRef<Path>>(
    path: P,
    skip: &[&str],
    options: &[DeleteOption],
    kind: CounterKind,
) -> Result<PathCounters, WalkError> {
    let mut counters = PathCounters::new(kind);
    delete_into(path.as_ref(), skip, options, &mut counters)?;
    Ok(counters)
}

/// [`delete`] accumulating into a caller-owned PathCounters. On failure the
/// counters hold whatever was accumulated before the walk aborted.
pub fn delete_into(
    path: &Path,
    skip: &[&str],
    options: &[DeleteOption],
    counters: &mut PathCounters,
) -> Result<(), WalkError> {
    debug!(path = %path.display(), "delete");
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        // Already gone; deletion is idempotent.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(WalkError::classify(path, e)),
    };

    if meta.is_dir() {
        let walk_options = WalkOptions::new();
        let mut visitor = CountingVisitor::deleter(counters, skip.iter().copied(), options);
        walk(path, &walk_options, &mut visitor)?;
        return Ok(());
    }

    // Single file or symbolic link.
    let shielded = path
        .file_name()
        .is_some_and(|name| skip.iter().any(|s| OsStr::new(s) == name));
    if !shielded {
        let override_read_only = options.contains(&DeleteOption::OverrideReadOnly);
        fs_ops::delete_file(path, override_read_only)?;
    }
    counters.files.increment();
    counters.bytes.add(meta.len());
    Ok(())
}

/// Delete the *contents* of `dir`, keeping the directory itself.
///
/// One PathCounters accumulates across the per-child deletions. Deleted
/// child directories are counted as visited, so cleaning a directory and
/// deleting the same contents report matching counters.
pub fn clean<P: AsRef<Path>>(
    dir: P,
    options: &[DeleteOption],
    kind: CounterKind,
) -> Result<PathCounters, WalkError> {
    let dir = dir.as_ref();
    debug!(dir = %dir.display(), "clean");
    let meta = fs::symlink_metadata(dir).map_err(|e| WalkError::classify(dir, e))?;
    if !meta.is_dir() {
        return Err(WalkError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut counters = PathCounters::new(kind);
    let entries = fs::read_dir(dir).map_err(|e| WalkError::ListFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| WalkError::ListFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let child = entry.path();
        let child_meta = match fs::symlink_metadata(&child) {
            Ok(meta) => meta,
            // Vanished since the listing; nothing was visited.
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(WalkError::classify(&child, e)),
        };
        delete_into(&child, &[], options, &mut counters)?;
        // Each child directory roots its own walk, and a walk never counts
        // its own root; count it here so the totals match a whole-tree
        // delete of the same contents.
        if child_meta.is_dir() {
            counters.directories.increment();
        }
    }
    Ok(counters)
}

/// Mirror-copy the tree at `src` under `dst`, returning what was copied.
///
/// `dst` (and any missing ancestors) is created first. Under the default
/// filters symbolic links are neither copied nor counted.
pub fn copy_directory<P: AsRef<Path>>(
    src: P,
    dst: P,
    walk_options: &WalkOptions,
    options: &[CopyOption],
    kind: CounterKind,
) -> Result<PathCounters, WalkError> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    debug!(src = %src.display(), dst = %dst.display(), "copy");
    let meta = fs::metadata(src).map_err(|e| WalkError::classify(src, e))?;
    if !meta.is_dir() {
        return Err(WalkError::NotADirectory {
            path: src.to_path_buf(),
        });
    }

    let mut counters = PathCounters::new(kind);
    let mut visitor = CountingVisitor::copier(&mut counters, src, dst, options);
    walk(src, walk_options, &mut visitor)?;
    Ok(counters)
}

/// True if the two trees have identical sets of relative file and directory
/// paths, ignoring content. See [`compare::shape_equals`].
pub fn shape_equals<P: AsRef<Path>>(
    a: P,
    b: P,
    options: &WalkOptions,
) -> Result<bool, WalkError> {
    compare::shape_equals(a.as_ref(), b.as_ref(), options)
}

/// True if the two trees have equal shape and equal file bytes. See
/// [`compare::content_equals`].
pub fn content_equals<P: AsRef<Path>>(
    a: P,
    b: P,
    options: &WalkOptions,
) -> Result<bool, WalkError> {
    compare::content_equals(a.as_ref(), b.as_ref(), options)
}
