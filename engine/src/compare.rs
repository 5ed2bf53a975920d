//! Two-phase directory-tree comparison.
//!
//! Shape equality walks both trees independently and compares their
//! counters and sorted relative path lists; content equality runs only
//! after shapes match and compares the paired files byte for byte. The
//! two-phase split means no file contents are ever read for trees that
//! already differ structurally.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::accumulate::AccumulateHooks;
use crate::counting::CountingVisitor;
use crate::counters::PathCounters;
use crate::error::WalkError;
use crate::fs_ops;
use crate::walk::{walk, WalkOptions};

/// One tree's shape: counters plus sorted relative path lists.
struct Survey {
    counters: PathCounters,
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

fn survey(root: &Path, options: &WalkOptions) -> Result<Survey, WalkError> {
    let mut counters = PathCounters::exact();
    let mut visitor = CountingVisitor::accumulator(&mut counters);
    walk(root, options, &mut visitor)?;
    let hooks = visitor.into_hooks();
    Ok(Survey {
        files: hooks.relativize_files(root, true, None),
        dirs: hooks.relativize_directories(root, true, None),
        counters,
    })
}

/// Resolve the cases decidable without walking: simultaneous absence is
/// equality, one-sided absence is inequality, and an existing root that is
/// not a directory is an input error. `None` means both trees must be
/// walked.
fn check_roots(a: &Path, b: &Path) -> Result<Option<bool>, WalkError> {
    let a_exists = fs_ops::exists_no_follow(a);
    let b_exists = fs_ops::exists_no_follow(b);
    if !a_exists && !b_exists {
        return Ok(Some(true));
    }
    if a_exists != b_exists {
        return Ok(Some(false));
    }
    for root in [a, b] {
        if !root.is_dir() {
            return Err(WalkError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
    }
    Ok(None)
}

fn shapes_match(a: &Survey, b: &Survey) -> bool {
    a.counters.files.as_u128() == b.counters.files.as_u128()
        && a.counters.directories.as_u128() == b.counters.directories.as_u128()
        && a.dirs == b.dirs
        && a.files == b.files
}

/// True if the two trees have identical sets of relative file and directory
/// paths, ignoring file content. Symmetric in its arguments.
pub fn shape_equals(a: &Path, b: &Path, options: &WalkOptions) -> Result<bool, WalkError> {
    if let Some(verdict) = check_roots(a, b)? {
        return Ok(verdict);
    }
    let a_survey = survey(a, options)?;
    let b_survey = survey(b, options)?;
    let verdict = shapes_match(&a_survey, &b_survey);
    debug!(a = %a.display(), b = %b.display(), verdict, "shape comparison");
    Ok(verdict)
}

/// True if the two trees have equal shape and every paired file has equal
/// bytes.
///
/// Shape is checked first; trees that differ structurally are reported
/// unequal without a single content read. After shape equality, every
/// relative file path from one tree is binary-searched in the other's sorted
/// list. A missing pairing can only mean the filesystem mutated between the
/// walks and the pairing step; it surfaces as `StructuralMismatch`, a
/// defensive assertion rather than an expected condition.
pub fn content_equals(a: &Path, b: &Path, options: &WalkOptions) -> Result<bool, WalkError> {
    if let Some(verdict) = check_roots(a, b)? {
        return Ok(verdict);
    }
    let a_survey = survey(a, options)?;
    let b_survey = survey(b, options)?;
    if !shapes_match(&a_survey, &b_survey) {
        debug!(a = %a.display(), b = %b.display(), "shapes differ, skipping content phase");
        return Ok(false);
    }

    for relative in &a_survey.files {
        if b_survey.files.binary_search(relative).is_err() {
            return Err(WalkError::StructuralMismatch {
                path: relative.clone(),
            });
        }
        let a_file = a.join(relative);
        let b_file = b.join(relative);
        if !fs_ops::content_equals_files(&a_file, &b_file)? {
            debug!(file = %relative.display(), "content differs");
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build_tree(root: &Path) {
        fs::create_dir_all(root.join("x")).expect("Failed to create x");
        fs::write(root.join("x").join("1.txt"), b"abc").expect("Failed to write 1.txt");
        fs::write(root.join("x").join("2.txt"), b"defgh").expect("Failed to write 2.txt");
        fs::create_dir(root.join("y")).expect("Failed to create y");
    }

    #[test]
    fn test_both_absent_roots_are_equal() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("nope_a");
        let b = temp_dir.path().join("nope_b");
        let options = WalkOptions::new();
        assert!(shape_equals(&a, &b, &options).expect("Compare failed"));
        assert!(content_equals(&a, &b, &options).expect("Compare failed"));
    }

    #[test]
    fn test_one_absent_root_is_unequal() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        fs::create_dir(&a).expect("Failed to create a");
        let b = temp_dir.path().join("nope");
        let options = WalkOptions::new();
        assert!(!shape_equals(&a, &b, &options).expect("Compare failed"));
        assert!(!content_equals(&a, &b, &options).expect("Compare failed"));
    }

    #[test]
    fn test_file_root_is_rejected() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        fs::create_dir(&a).expect("Failed to create a");
        let b = temp_dir.path().join("b.txt");
        fs::write(&b, b"file").expect("Failed to write b.txt");

        let err = shape_equals(&a, &b, &WalkOptions::new()).expect_err("Expected an error");
        assert!(matches!(err, WalkError::NotADirectory { .. }));
    }

    #[test]
    fn test_shape_equality_is_symmetric() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::create_dir(&a).expect("Failed to create a");
        fs::create_dir(&b).expect("Failed to create b");
        build_tree(&a);
        build_tree(&b);
        // Perturb one side.
        fs::write(b.join("extra.txt"), b"extra").expect("Failed to write extra.txt");

        let options = WalkOptions::new();
        let ab = shape_equals(&a, &b, &options).expect("Compare failed");
        let ba = shape_equals(&b, &a, &options).expect("Compare failed");
        assert_eq!(ab, ba);
        assert!(!ab);
    }

    #[test]
    fn test_same_shape_different_location() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("deep").join("b");
        fs::create_dir(&a).expect("Failed to create a");
        fs::create_dir_all(&b).expect("Failed to create b");
        build_tree(&a);
        build_tree(&b);

        assert!(shape_equals(&a, &b, &WalkOptions::new()).expect("Compare failed"));
    }

    #[test]
    fn test_content_difference_keeps_shape_equal() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::create_dir(&a).expect("Failed to create a");
        fs::create_dir(&b).expect("Failed to create b");
        build_tree(&a);
        build_tree(&b);

        let options = WalkOptions::new();
        assert!(shape_equals(&a, &b, &options).expect("Compare failed"));
        assert!(content_equals(&a, &b, &options).expect("Compare failed"));

        // Same length, one byte flipped: shape holds, content does not.
        fs::write(b.join("x").join("1.txt"), b"abd").expect("Failed to modify 1.txt");
        assert!(shape_equals(&a, &b, &options).expect("Compare failed"));
        assert!(!content_equals(&a, &b, &options).expect("Compare failed"));
    }

    #[cfg(unix)]
    #[test]
    fn test_structural_difference_skips_content_phase() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::create_dir(&a).expect("Failed to create a");
        fs::create_dir(&b).expect("Failed to create b");
        fs::write(a.join("1.txt"), b"one").expect("Failed to write a/1.txt");
        fs::write(b.join("1.txt"), b"one").expect("Failed to write b/1.txt");
        fs::write(b.join("2.txt"), b"two").expect("Failed to write b/2.txt");

        // Make the files unreadable: any content read would error, so a
        // clean `false` proves the byte comparator never ran.
        for file in [a.join("1.txt"), b.join("1.txt"), b.join("2.txt")] {
            fs::set_permissions(&file, fs::Permissions::from_mode(0o000))
                .expect("Failed to chmod file");
        }

        let verdict =
            content_equals(&a, &b, &WalkOptions::new()).expect("Compare should not read files");
        assert!(!verdict);
    }
}
