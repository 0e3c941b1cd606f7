//! # Discovery Module
//!
//! Finds the project files to patch. Discovery is split in two stages:
//!
//! 1. **Traversal**: walk the vendored package directory recursively and yield
//!    every file it contains, irrespective of name or extension.
//! 2. **Filtering**: keep only files whose name contains the project token and
//!    carries the Visual Studio project extension. Both checks are
//!    case-insensitive because NuGet-style package layouts mix casings freely.
//!
//! Filtering never happens during traversal; the walker's output is the raw
//! file list and the caller decides what survives.

use std::path::{Path, PathBuf};
use anyhow::Result;
use log::debug;
use walkdir::WalkDir;

/// One file seen during traversal, as a (directory, file name) pair.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The directory containing the file.
    pub dir: PathBuf,
    /// The file's name within that directory.
    pub file_name: String,
}

impl Candidate {
    /// The full path of the file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Walks `base` recursively and returns every file underneath it, including
/// files in `base` itself.
///
/// A missing (or non-directory) base yields an empty list rather than an error,
/// so an installer tree without this package is simply a no-op run. Once the
/// base exists, any traversal failure underneath it (an unreadable
/// subdirectory, a vanished entry) is fatal and propagates to the caller.
pub fn collect_files(base: &Path) -> Result<Vec<Candidate>> {
    if !base.is_dir() {
        debug!("Base directory {:?} does not exist, nothing to scan", base);
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(base) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let dir = entry.path().parent().unwrap_or(base).to_path_buf();
        found.push(Candidate {
            dir,
            file_name: entry.file_name().to_string_lossy().to_string(),
        });
    }
    Ok(found)
}

/// Returns true if `file_name` belongs to the target project.
///
/// The name must contain the project token as a substring AND end with the
/// project-file extension, both compared lowercase.
pub fn is_candidate(file_name: &str, project: &str, extension: &str) -> bool {
    let name = file_name.to_lowercase();
    name.contains(&project.to_lowercase()) && name.ends_with(&extension.to_lowercase())
}

/// Walks `base` and keeps only the files that pass [`is_candidate`].
pub fn discover_candidates(base: &Path, project: &str, extension: &str) -> Result<Vec<Candidate>> {
    let all = collect_files(base)?;
    let candidates: Vec<Candidate> = all
        .into_iter()
        .filter(|c| is_candidate(&c.file_name, project, extension))
        .collect();
    debug!(
        "{} candidate file(s) for project {:?} under {:?}",
        candidates.len(),
        project,
        base
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn filter_matches_token_and_extension_case_insensitively() {
        assert!(is_candidate("reactphysics3d.vcxproj", "reactphysics3d", ".vcxproj"));
        assert!(is_candidate("Foo.ReactPhysics3D.VCXPROJ", "reactphysics3d", ".vcxproj"));
        assert!(is_candidate("libREACTPHYSICS3D-static.vcxProj", "reactphysics3d", ".vcxproj"));
    }

    #[test]
    fn filter_rejects_wrong_token_or_extension() {
        // right extension, token missing
        assert!(!is_candidate("OtherLib.vcxproj", "reactphysics3d", ".vcxproj"));
        // right token, wrong extension
        assert!(!is_candidate("reactphysics3d.vcxproj.filters", "reactphysics3d", ".vcxproj"));
        assert!(!is_candidate("reactphysics3d.sln", "reactphysics3d", ".vcxproj"));
        assert!(!is_candidate("other.txt", "reactphysics3d", ".vcxproj"));
    }

    #[test]
    fn walks_base_and_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub").join("inner")).unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join("ReactPhysics3D.vcxproj"), "p").unwrap();
        fs::write(tmp.path().join("sub").join("reactphysics3d.tests.VcxProj"), "t").unwrap();
        fs::write(tmp.path().join("sub").join("inner").join("notes.md"), "n").unwrap();

        let all = collect_files(tmp.path()).unwrap();
        assert_eq!(all.len(), 4);

        let candidates =
            discover_candidates(tmp.path(), "reactphysics3d", ".vcxproj").unwrap();
        assert_eq!(candidates.len(), 2);
        for c in &candidates {
            assert!(c.path().is_file());
        }
    }

    #[test]
    fn missing_base_directory_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("no-such-package");
        assert!(collect_files(&gone).unwrap().is_empty());
        assert!(discover_candidates(&gone, "reactphysics3d", ".vcxproj")
            .unwrap()
            .is_empty());
    }
}
