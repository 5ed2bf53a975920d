//! The copying specialization.
//!
//! CopyHooks mirror the walked source tree under a target root. Target
//! directories are created pre-order, before any of their files are copied;
//! file bytes are copied under the caller's options. Only files that were
//! accepted by the filter and actually copied are counted.
//!
//! Path translation routes through the bare relative suffix: the current
//! source path is relativized against the recorded source root and the
//! suffix re-joined onto the target root. The two roots are never resolved
//! against each other, so they may belong to different filesystems.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::counting::{CountingVisitor, VisitHooks};
use crate::counters::PathCounters;
use crate::error::WalkError;
use crate::filter::VisitOutcome;
use crate::fs_ops;

/// Optional copy behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOption {
    /// Overwrite existing target files; without this an existing target is
    /// an error.
    ReplaceExisting,
    /// Carry the source's modification time over to the copy.
    CopyAttributes,
}

/// Hooks that mirror the walked tree under a target root.
#[derive(Debug)]
pub struct CopyHooks {
    source_root: PathBuf,
    target_root: PathBuf,
    replace_existing: bool,
    copy_attributes: bool,
}

impl CopyHooks {
    /// Build copy hooks mirroring `source_root` under `target_root`.
    pub fn new(source_root: &Path, target_root: &Path, options: &[CopyOption]) -> Self {
        CopyHooks {
            source_root: source_root.to_path_buf(),
            target_root: target_root.to_path_buf(),
            replace_existing: options.contains(&CopyOption::ReplaceExisting),
            copy_attributes: options.contains(&CopyOption::CopyAttributes),
        }
    }

    /// Translate a source path to its target counterpart via the relative
    /// suffix.
    fn translate(&self, path: &Path) -> Result<PathBuf, WalkError> {
        // The walk only hands out descendants of the source root; anything
        // else is an internal defect.
        let suffix = path
            .strip_prefix(&self.source_root)
            .map_err(|_| WalkError::StructuralMismatch {
                path: path.to_path_buf(),
            })?;
        Ok(self.target_root.join(suffix))
    }
}

impl VisitHooks for CopyHooks {
    fn pre_directory(&mut self, dir: &Path, _meta: &Metadata) -> Result<VisitOutcome, WalkError> {
        // The target directory must exist before any of its files arrive.
        let target = self.translate(dir)?;
        fs_ops::ensure_dir_exists(&target)?;
        Ok(VisitOutcome::Continue)
    }

    fn on_file(&mut self, file: &Path, _meta: &Metadata) -> Result<bool, WalkError> {
        let target = self.translate(file)?;
        let bytes = fs_ops::copy_file(file, &target, self.replace_existing, self.copy_attributes)?;
        trace!(file = %file.display(), target = %target.display(), bytes, "copied file");
        // Counted because it was actually copied; a failed copy aborts.
        Ok(true)
    }
}

impl<'a> CountingVisitor<'a, CopyHooks> {
    /// A visitor that mirror-copies the walked tree while counting it.
    /// Uses the default counting filters, so symbolic links are neither
    /// copied nor counted.
    pub fn copier(
        counters: &'a mut PathCounters,
        source_root: &Path,
        target_root: &Path,
        options: &[CopyOption],
    ) -> Self {
        CountingVisitor::with_hooks(counters, CopyHooks::new(source_root, target_root, options))
    }
}
