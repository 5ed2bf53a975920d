//! Traversal flow control and path filtering.
//!
//! A filter is a stateless predicate over a path and its (optionally
//! withheld) metadata, answering with the tri-state VisitOutcome that drives
//! the walk: descend, prune the subtree, or halt entirely.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fmt;
use std::fs::Metadata;
use std::path::Path;

/// Tri-state signal returned from filters and visitor callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Include this entry and keep walking.
    Continue,
    /// Exclude this entry; for a directory, neither it nor its descendants
    /// are visited or counted.
    SkipSubtree,
    /// Halt the entire walk.
    Terminate,
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitOutcome::Continue => write!(f, "Continue"),
            VisitOutcome::SkipSubtree => write!(f, "SkipSubtree"),
            VisitOutcome::Terminate => write!(f, "Terminate"),
        }
    }
}

/// A stateless inclusion predicate over a path.
///
/// Metadata may be withheld by the caller when it was not needed to decide;
/// implementations must tolerate `None`.
pub trait PathFilter {
    fn accept(&self, path: &Path, meta: Option<&Metadata>) -> VisitOutcome;
}

impl<F> PathFilter for F
where
    F: Fn(&Path, Option<&Metadata>) -> VisitOutcome,
{
    fn accept(&self, path: &Path, meta: Option<&Metadata>) -> VisitOutcome {
        self(path, meta)
    }
}

/// Accepts everything. The default directory filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PathFilter for AcceptAll {
    fn accept(&self, _path: &Path, _meta: Option<&Metadata>) -> VisitOutcome {
        VisitOutcome::Continue
    }
}

/// Rejects symbolic links, accepts everything else. The default file filter:
/// counting a link and its target as separate entries would double-count.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectSymlinks;

impl PathFilter for RejectSymlinks {
    fn accept(&self, path: &Path, meta: Option<&Metadata>) -> VisitOutcome {
        let is_symlink = match meta {
            Some(meta) => meta.file_type().is_symlink(),
            None => path.is_symlink(),
        };
        if is_symlink {
            VisitOutcome::SkipSubtree
        } else {
            VisitOutcome::Continue
        }
    }
}

/// Rejects paths whose final name component is in a fixed name set.
///
/// The set holds bare names, not full paths, and is a genuine ordered set so
/// the sorted-membership invariant cannot be violated by callers.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    names: BTreeSet<OsString>,
}

impl NameFilter {
    /// Build a filter rejecting the given bare names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        NameFilter {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// True if the path's final name component is in the set.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.names.contains(name))
    }

    /// True if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PathFilter for NameFilter {
    fn accept(&self, path: &Path, _meta: Option<&Metadata>) -> VisitOutcome {
        if self.matches(path) {
            VisitOutcome::SkipSubtree
        } else {
            VisitOutcome::Continue
        }
    }
}
