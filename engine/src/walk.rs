//! The depth-first traversal engine.
//!
//! One concrete recursive walker drives a TreeVisitor through its three
//! callback points: enter-directory (pre-order), file, leave-directory
//! (post-order). Specializations plug in through the visitor, not through
//! subclassing; there is exactly one traversal implementation.
//!
//! Directory-listing handles are scoped to the recursive call and released
//! on every exit path, including filter errors and I/O failures.

use std::fs::{self, Metadata};
use std::path::Path;
use tracing::{debug, trace};

use crate::error::WalkError;
use crate::filter::VisitOutcome;

/// Per-walk traversal settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow symbolic links when reading metadata. Off by default; a link
    /// to a directory is then presented to the visitor as a file.
    pub follow_links: bool,

    /// Maximum number of directory levels below the root to visit. Entries
    /// deeper than this are pruned exactly like a SkipSubtree filter result:
    /// never visited, never counted. `None` means unlimited.
    pub max_depth: Option<usize>,
}

impl WalkOptions {
    pub fn new() -> Self {
        WalkOptions {
            follow_links: false,
            max_depth: None,
        }
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The three callback points of a tree walk.
///
/// `depth` is the number of directory levels below the walk root (the root
/// itself is at depth 0). Returning `Terminate` from any callback halts the
/// whole walk; `SkipSubtree` from `enter_directory` prunes that directory.
pub trait TreeVisitor {
    /// Called before a directory's entries are listed.
    fn enter_directory(
        &mut self,
        dir: &Path,
        meta: &Metadata,
        depth: usize,
    ) -> Result<VisitOutcome, WalkError>;

    /// Called for each non-directory entry.
    fn visit_file(
        &mut self,
        file: &Path,
        meta: &Metadata,
        depth: usize,
    ) -> Result<VisitOutcome, WalkError>;

    /// Called after all of a directory's children have been processed.
    /// Not called for directories pruned at `enter_directory`.
    fn leave_directory(&mut self, dir: &Path, depth: usize) -> Result<VisitOutcome, WalkError>;
}

/// Walk the tree rooted at `root`, driving `visitor` depth-first.
///
/// A root that is not a directory gets a single `visit_file` callback. The
/// first error aborts the remaining walk and propagates; a `Terminate`
/// returned by the visitor stops the walk without error.
pub fn walk<V: TreeVisitor>(
    root: &Path,
    options: &WalkOptions,
    visitor: &mut V,
) -> Result<(), WalkError> {
    let meta = stat(root, options)?;
    debug!(root = %root.display(), "starting walk");
    if meta.is_dir() {
        walk_dir(root, &meta, 0, options, visitor)?;
    } else {
        visitor.visit_file(root, &meta, 0)?;
    }
    debug!(root = %root.display(), "walk finished");
    Ok(())
}

fn stat(path: &Path, options: &WalkOptions) -> Result<Metadata, WalkError> {
    let result = if options.follow_links {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    };
    result.map_err(|e| WalkError::classify(path, e))
}

fn walk_dir<V: TreeVisitor>(
    dir: &Path,
    meta: &Metadata,
    depth: usize,
    options: &WalkOptions,
    visitor: &mut V,
) -> Result<VisitOutcome, WalkError> {
    match visitor.enter_directory(dir, meta, depth)? {
        VisitOutcome::Continue => {}
        VisitOutcome::SkipSubtree => {
            trace!(dir = %dir.display(), "subtree pruned");
            return Ok(VisitOutcome::Continue);
        }
        VisitOutcome::Terminate => return Ok(VisitOutcome::Terminate),
    }

    let entries = fs::read_dir(dir).map_err(|e| WalkError::ListFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| WalkError::ListFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        // The listing may already be stale; an entry that vanished before
        // its stat is treated as never seen.
        let meta = match stat(&path, options) {
            Ok(meta) => meta,
            Err(e) if e.is_not_found() => {
                trace!(path = %path.display(), "entry vanished before visit");
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(max) = options.max_depth {
            if depth + 1 > max {
                trace!(path = %path.display(), "pruned by depth limit");
                continue;
            }
        }

        let outcome = if meta.is_dir() {
            walk_dir(&path, &meta, depth + 1, options, visitor)?
        } else {
            visitor.visit_file(&path, &meta, depth + 1)?
        };
        if outcome == VisitOutcome::Terminate {
            return Ok(VisitOutcome::Terminate);
        }
    }

    visitor.leave_directory(dir, depth)
}
