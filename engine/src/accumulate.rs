//! The accumulating specialization.
//!
//! AccumulateHooks record every counted file and every exited directory into
//! two ordered lists. All paths are retained in memory, so this is meant for
//! trees of modest size; the directory-diff algorithm is its main consumer.

use std::cmp::Ordering;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::counting::{CountingVisitor, VisitHooks};
use crate::counters::PathCounters;
use crate::error::WalkError;

/// Hooks that record the visited paths.
#[derive(Debug, Default)]
pub struct AccumulateHooks {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl AccumulateHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The counted files, in visit order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The exited directories, in post-order (walk root last).
    pub fn directories(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// The recorded files, relativized against `root`.
    ///
    /// With `sort` set the result is ordered by `comparator`, or by the
    /// default path ordering when none is supplied. The sorted relative
    /// lists of two walks form a location-independent fingerprint of tree
    /// shape.
    pub fn relativize_files(
        &self,
        root: &Path,
        sort: bool,
        comparator: Option<fn(&PathBuf, &PathBuf) -> Ordering>,
    ) -> Vec<PathBuf> {
        Self::relativize(&self.files, root, sort, comparator)
    }

    /// The recorded directories, relativized against `root`; the walk root
    /// itself relativizes to the empty path.
    pub fn relativize_directories(
        &self,
        root: &Path,
        sort: bool,
        comparator: Option<fn(&PathBuf, &PathBuf) -> Ordering>,
    ) -> Vec<PathBuf> {
        Self::relativize(&self.dirs, root, sort, comparator)
    }

    fn relativize(
        paths: &[PathBuf],
        root: &Path,
        sort: bool,
        comparator: Option<fn(&PathBuf, &PathBuf) -> Ordering>,
    ) -> Vec<PathBuf> {
        let mut relative: Vec<PathBuf> = paths
            .iter()
            .map(|path| path.strip_prefix(root).unwrap_or(path).to_path_buf())
            .collect();
        if sort {
            match comparator {
                Some(compare) => relative.sort_by(compare),
                None => relative.sort(),
            }
        }
        relative
    }
}

impl VisitHooks for AccumulateHooks {
    fn on_file(&mut self, file: &Path, _meta: &Metadata) -> Result<bool, WalkError> {
        self.files.push(file.to_path_buf());
        Ok(true)
    }

    fn post_directory(&mut self, dir: &Path) -> Result<(), WalkError> {
        self.dirs.push(dir.to_path_buf());
        Ok(())
    }
}

impl<'a> CountingVisitor<'a, AccumulateHooks> {
    /// A visitor that records every visited path while counting, with the
    /// default filters.
    pub fn accumulator(counters: &'a mut PathCounters) -> Self {
        CountingVisitor::with_hooks(counters, AccumulateHooks::new())
    }
}
