//! The deleting specialization.
//!
//! DeleteHooks plug tree deletion into the counting visitor. Children are
//! always removed before their parent: files go during the file callback,
//! directories only in the post-order exit callback, and only when empty at
//! that point.
//!
//! The skip-set holds bare final-name components. A matched directory is
//! pruned (never descended into); a matched file is shielded from deletion
//! but still counted if it passes the counting filter. Skipping affects
//! deletion only, never counting: the returned counters describe what was
//! visited, not what was removed.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::Metadata;
use std::path::Path;
use tracing::trace;

use crate::counting::{CountingVisitor, VisitHooks};
use crate::counters::PathCounters;
use crate::error::WalkError;
use crate::filter::{AcceptAll, VisitOutcome};
use crate::fs_ops;

/// Optional deletion behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOption {
    /// Before deleting, clear the read-only attribute or add owner
    /// write+execute to the target and its parent, then retry once.
    /// Adjusted permissions are left in place afterwards. Without this
    /// option a permission refusal propagates unhandled.
    OverrideReadOnly,
}

/// Hooks that delete every visited entry not shielded by the skip-set.
#[derive(Debug)]
pub struct DeleteHooks {
    skip: BTreeSet<OsString>,
    override_read_only: bool,
}

impl DeleteHooks {
    /// Build delete hooks from a skip-set of bare names and option flags.
    pub fn new<I, S>(skip: I, options: &[DeleteOption]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        DeleteHooks {
            skip: skip.into_iter().map(Into::into).collect(),
            override_read_only: options.contains(&DeleteOption::OverrideReadOnly),
        }
    }

    /// Membership test against the path's final name component.
    pub fn skipped(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.skip.contains(name))
    }

    /// Whether permission remediation is enabled.
    pub fn overrides_read_only(&self) -> bool {
        self.override_read_only
    }
}

impl VisitHooks for DeleteHooks {
    fn pre_directory(&mut self, dir: &Path, _meta: &Metadata) -> Result<VisitOutcome, WalkError> {
        if self.skipped(dir) {
            trace!(dir = %dir.display(), "directory in skip-set, pruning");
            return Ok(VisitOutcome::SkipSubtree);
        }
        Ok(VisitOutcome::Continue)
    }

    fn on_file(&mut self, file: &Path, _meta: &Metadata) -> Result<bool, WalkError> {
        if self.skipped(file) {
            trace!(file = %file.display(), "file in skip-set, not deleting");
        } else {
            fs_ops::delete_file(file, self.override_read_only)?;
        }
        // Counted either way; the skip-set shields from deletion only.
        Ok(true)
    }

    fn post_directory(&mut self, dir: &Path) -> Result<(), WalkError> {
        // A directory still holding shielded children stays in place.
        if fs_ops::is_empty_dir(dir)? {
            fs_ops::delete_dir(dir, self.override_read_only)?;
        }
        Ok(())
    }
}

impl<'a> CountingVisitor<'a, DeleteHooks> {
    /// A visitor that deletes the walked tree while counting it.
    ///
    /// Both filters accept everything: deletion must reach entries (symbolic
    /// links included) that the default counting filters would exclude, or
    /// parent directories could never become empty.
    pub fn deleter<I, S>(
        counters: &'a mut PathCounters,
        skip: I,
        options: &[DeleteOption],
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        CountingVisitor::with_hooks(counters, DeleteHooks::new(skip, options))
            .file_filter(AcceptAll)
            .dir_filter(AcceptAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::{walk, WalkOptions};
    use std::fs;

    fn scenario_a(root: &Path) {
        fs::create_dir(root.join("x")).expect("Failed to create x");
        fs::write(root.join("x").join("1.txt"), b"abc").expect("Failed to write 1.txt");
        fs::write(root.join("x").join("2.txt"), b"defgh").expect("Failed to write 2.txt");
        fs::create_dir(root.join("y")).expect("Failed to create y");
    }

    fn empty_skip() -> Vec<OsString> {
        Vec::new()
    }

    #[test]
    fn test_delete_removes_tree_and_counts_it() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        scenario_a(&root);

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::deleter(&mut counters, empty_skip(), &[]);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert_eq!(counters.files.as_u128(), 2);
        assert_eq!(counters.directories.as_u128(), 2);
        assert_eq!(counters.bytes.as_u128(), 8);
        assert!(!root.exists(), "root should be removed");
    }

    #[test]
    fn test_skip_set_shields_file_but_still_counts_it() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("keep.txt"), b"keep").expect("Failed to write keep.txt");
        fs::write(root.join("drop1.txt"), b"d1").expect("Failed to write drop1.txt");
        fs::write(root.join("drop2.txt"), b"d2").expect("Failed to write drop2.txt");

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::deleter(&mut counters, ["keep.txt"], &[]);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        // Exactly the shielded file survives; its parent necessarily stays.
        assert!(root.join("keep.txt").exists());
        assert!(!root.join("drop1.txt").exists());
        assert!(!root.join("drop2.txt").exists());
        assert!(root.exists());

        // All three files were counted; skipping affects deletion only.
        assert_eq!(counters.files.as_u128(), 3);
        assert_eq!(counters.bytes.as_u128(), 8);
    }

    #[test]
    fn test_skip_set_prunes_directory() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        fs::create_dir(root.join("keepdir")).expect("Failed to create keepdir");
        fs::write(root.join("keepdir").join("held.txt"), b"held")
            .expect("Failed to write held.txt");
        fs::write(root.join("loose.txt"), b"loose").expect("Failed to write loose.txt");

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::deleter(&mut counters, ["keepdir"], &[]);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert!(root.join("keepdir").join("held.txt").exists());
        assert!(!root.join("loose.txt").exists());

        // The pruned subtree is neither deleted nor counted.
        assert_eq!(counters.files.as_u128(), 1);
        assert_eq!(counters.directories.as_u128(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_deleted_not_followed() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let outside = temp_dir.path().join("outside");
        fs::create_dir(&outside).expect("Failed to create outside");
        fs::write(outside.join("precious.txt"), b"precious")
            .expect("Failed to write precious.txt");

        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        std::os::unix::fs::symlink(&outside, root.join("portal"))
            .expect("Failed to create symlink");

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::deleter(&mut counters, empty_skip(), &[]);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert!(!root.exists(), "root should be removed");
        assert!(
            outside.join("precious.txt").exists(),
            "the link target must be untouched"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_deleted() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        std::os::unix::fs::symlink(root.join("nowhere"), root.join("dangling"))
            .expect("Failed to create symlink");

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::deleter(&mut counters, empty_skip(), &[]);
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Walk failed");

        assert!(!root.exists(), "root should be removed");
    }

    #[cfg(unix)]
    #[test]
    fn test_override_read_only_remediates_and_deletes() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("a");
        fs::create_dir(&root).expect("Failed to create root");
        let locked = root.join("locked");
        fs::create_dir(&locked).expect("Failed to create locked");
        fs::write(locked.join("held.txt"), b"held").expect("Failed to write held.txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o500))
            .expect("Failed to lock dir");

        // Without the option the denial propagates.
        {
            let mut counters = PathCounters::exact();
            let mut visitor = CountingVisitor::deleter(&mut counters, empty_skip(), &[]);
            match walk(&root, &WalkOptions::new(), &mut visitor) {
                // Root bypasses permission checks; nothing to verify then.
                Ok(()) => return,
                Err(err) => assert!(err.is_permission_denied()),
            }
        }

        let mut counters = PathCounters::exact();
        let mut visitor = CountingVisitor::deleter(
            &mut counters,
            empty_skip(),
            &[DeleteOption::OverrideReadOnly],
        );
        walk(&root, &WalkOptions::new(), &mut visitor).expect("Override walk failed");
        assert!(!root.exists(), "root should be removed");
    }
}
