//! The shared counting visitor.
//!
//! CountingVisitor is the one traversal behavior every operation reuses:
//! filter directories on entry, filter and count files, count directories
//! post-order on exit. The delete/copy/accumulate specializations do not
//! re-implement any of this; they plug effects into the two extension
//! points exposed by the VisitHooks trait.
//!
//! Counting contract:
//! - a directory is counted only on exit, after all children, so pruned
//!   subtrees are never counted;
//! - the walk root itself is not part of the directory count;
//! - a file is counted at most once, and only if it passes the file filter
//!   and still exists at visit time;
//! - counters never decrease.

use std::fs::{self, Metadata};
use std::path::Path;
use tracing::trace;

use crate::counters::PathCounters;
use crate::error::WalkError;
use crate::filter::{AcceptAll, PathFilter, RejectSymlinks, VisitOutcome};
use crate::walk::TreeVisitor;

/// Extension points injected into the counting traversal.
///
/// `pre_directory` runs after the directory filter accepted a directory and
/// may still prune it. `on_file` runs for each filter-accepted,
/// still-existing file and answers whether the file should be counted.
/// `post_directory` runs on directory exit, before the directory is counted.
pub trait VisitHooks {
    fn pre_directory(&mut self, _dir: &Path, _meta: &Metadata) -> Result<VisitOutcome, WalkError> {
        Ok(VisitOutcome::Continue)
    }

    fn on_file(&mut self, _file: &Path, _meta: &Metadata) -> Result<bool, WalkError> {
        Ok(true)
    }

    fn post_directory(&mut self, _dir: &Path) -> Result<(), WalkError> {
        Ok(())
    }
}

/// Hooks with no effects: plain counting.
#[derive(Debug, Default)]
pub struct CountOnly;

impl VisitHooks for CountOnly {}

/// The traversal engine's counting visitor.
///
/// Borrows the counters for the duration of one walk; the caller owns them
/// before and after, which is what lets a single PathCounters accumulate
/// across several walks.
pub struct CountingVisitor<'a, H: VisitHooks> {
    counters: &'a mut PathCounters,
    hooks: H,
    file_filter: Box<dyn PathFilter>,
    dir_filter: Box<dyn PathFilter>,
}

impl<'a> CountingVisitor<'a, CountOnly> {
    /// A plain counting visitor with the default filters.
    pub fn new(counters: &'a mut PathCounters) -> Self {
        Self::with_hooks(counters, CountOnly)
    }
}

impl<'a, H: VisitHooks> CountingVisitor<'a, H> {
    /// A counting visitor with injected hooks and the default filters
    /// (files: reject symlinks; directories: accept all).
    pub fn with_hooks(counters: &'a mut PathCounters, hooks: H) -> Self {
        CountingVisitor {
            counters,
            hooks,
            file_filter: Box::new(RejectSymlinks),
            dir_filter: Box::new(AcceptAll),
        }
    }

    /// Replace the file filter.
    pub fn file_filter(mut self, filter: impl PathFilter + 'static) -> Self {
        self.file_filter = Box::new(filter);
        self
    }

    /// Replace the directory filter.
    pub fn dir_filter(mut self, filter: impl PathFilter + 'static) -> Self {
        self.dir_filter = Box::new(filter);
        self
    }

    /// The counters as accumulated so far.
    pub fn counters(&self) -> &PathCounters {
        self.counters
    }

    /// The injected hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Give back the hooks, ending the walk borrow.
    pub fn into_hooks(self) -> H {
        self.hooks
    }
}

impl<H: VisitHooks> TreeVisitor for CountingVisitor<'_, H> {
    fn enter_directory(
        &mut self,
        dir: &Path,
        meta: &Metadata,
        _depth: usize,
    ) -> Result<VisitOutcome, WalkError> {
        match self.dir_filter.accept(dir, Some(meta)) {
            VisitOutcome::Continue => {}
            // A rejected directory is pruned: never visited, never counted.
            other => return Ok(other),
        }
        self.hooks.pre_directory(dir, meta)
    }

    fn visit_file(
        &mut self,
        file: &Path,
        meta: &Metadata,
        _depth: usize,
    ) -> Result<VisitOutcome, WalkError> {
        // The existence re-check defends against a listing gone stale
        // between enumeration and this visit.
        if self.file_filter.accept(file, Some(meta)) == VisitOutcome::Continue
            && fs::symlink_metadata(file).is_ok()
            && self.hooks.on_file(file, meta)?
        {
            self.counters.files.increment();
            self.counters.bytes.add(meta.len());
            trace!(file = %file.display(), size = meta.len(), "counted file");
        }
        // A filtered-out file never aborts the walk.
        Ok(VisitOutcome::Continue)
    }

    fn leave_directory(&mut self, dir: &Path, depth: usize) -> Result<VisitOutcome, WalkError> {
        self.hooks.post_directory(dir)?;
        if depth > 0 {
            self.counters.directories.increment();
        }
        Ok(VisitOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::PathCounters;
    use crate::filter::NameFilter;
    use crate::walk::{walk, WalkOptions};
    use std::fs;
    use std::path::PathBuf;

    fn scenario_a(root: &Path) {
        fs::create_dir(root.join("x")).expect("Failed to create x");
        fs::write(root.join("x").join("1.txt"), b"abc").expect("Failed to write 1.txt");
        fs::write(root.join("x").join("2.txt"), b"defgh").expect("Failed to write 2.txt");
        fs::create_dir(root.join("y")).expect("Failed to create y");
    }

    #[test]
    fn test_counts_files_directories_and_bytes() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        scenario_a(&root);

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::new(&mut counters);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert_eq!(counters.files.as_u128(), 2);
        assert_eq!(counters.directories.as_u128(), 2);
        assert_eq!(counters.bytes.as_u128(), 8);
    }

    #[test]
    fn test_pruned_subtree_is_not_counted() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        scenario_a(&root);

        let mut counters = PathCounters::exact();
        let mut visitor =
            CountingVisitor::new(&mut counters).dir_filter(NameFilter::new(["x"]));
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        // x and everything under it is pruned; only y remains.
        assert_eq!(counters.files.as_u128(), 0);
        assert_eq!(counters.directories.as_u128(), 1);
        assert_eq!(counters.bytes.as_u128(), 0);
    }

    #[test]
    fn test_file_filter_excludes_without_aborting() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("yes.txt"), b"1234").expect("Failed to write yes.txt");
        fs::write(root.join("no.bin"), b"123456").expect("Failed to write no.bin");

        let only_txt = |path: &Path, _meta: Option<&Metadata>| {
            if path.extension().is_some_and(|ext| ext == "txt") {
                VisitOutcome::Continue
            } else {
                VisitOutcome::SkipSubtree
            }
        };

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::new(&mut counters).file_filter(only_txt);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert_eq!(counters.files.as_u128(), 1);
        assert_eq!(counters.bytes.as_u128(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_not_counted_by_default() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("real.txt"), b"real").expect("Failed to write real.txt");
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt"))
            .expect("Failed to create symlink");

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::new(&mut counters);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert_eq!(counters.files.as_u128(), 1);
        assert_eq!(counters.bytes.as_u128(), 4);
    }

    #[test]
    fn test_hooks_can_veto_counting() {
        struct SkipLarge;
        impl VisitHooks for SkipLarge {
            fn on_file(&mut self, _file: &Path, meta: &Metadata) -> Result<bool, WalkError> {
                Ok(meta.len() <= 3)
            }
        }

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("small.txt"), b"abc").expect("Failed to write small.txt");
        fs::write(root.join("large.txt"), b"abcdef").expect("Failed to write large.txt");

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::with_hooks(&mut counters, SkipLarge);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert_eq!(counters.files.as_u128(), 1);
        assert_eq!(counters.bytes.as_u128(), 3);
    }

    #[test]
    fn test_counters_accumulate_across_walks() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("f.txt"), b"12").expect("Failed to write f.txt");

        let mut counters = PathCounters::exact();
        for _ in 0..2 {
            let mut visitor = CountingVisitor::new(&mut counters);
            walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");
        }
        assert_eq!(counters.files.as_u128(), 2);
        assert_eq!(counters.bytes.as_u128(), 4);
    }

    #[test]
    fn test_post_directory_hook_runs_before_directory_count() {
        struct Observer {
            dirs_seen: Vec<PathBuf>,
        }
        impl VisitHooks for Observer {
            fn post_directory(&mut self, dir: &Path) -> Result<(), WalkError> {
                self.dirs_seen.push(dir.to_path_buf());
                Ok(())
            }
        }

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        fs::create_dir(root.join("x")).expect("Failed to create x");

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::with_hooks(
            &mut counters,
            Observer {
                dirs_seen: Vec::new(),
            },
        );
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");
        let hooks = visitor.into_hooks();

        // The hook sees every exited directory, root included, even though
        // the root is excluded from the directory count.
        assert_eq!(hooks.dirs_seen, vec![root.join("x"), root.clone()]);
        assert_eq!(counters.directories.as_u128(), 1);
    }
}
