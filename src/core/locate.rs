// Nexus Shell - core/locate.rs
//
// Backend executable location: first existing candidate wins.
//
// The candidate list is ordered by preference. Existence is the only test;
// a later candidate is never chosen while an earlier one exists, even if the
// earlier one later turns out not to be executable (spawn reports that).

use std::path::{Path, PathBuf};

/// Return the first path in `candidates` that exists on disk.
pub fn first_existing(candidates: &[PathBuf]) -> Option<&Path> {
    candidates.iter().map(PathBuf::as_path).find(|p| {
        let exists = p.is_file();
        tracing::trace!(candidate = %p.display(), exists, "Checking backend candidate");
        exists
    })
}

/// Directory the backend should run in: the one containing the executable.
///
/// A bare file name has an empty parent; that maps to `.` so the child
/// inherits a usable working directory.
pub fn working_dir_for(executable: &Path) -> PathBuf {
    match executable.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_candidates() {
        assert!(first_existing(&[]).is_none());
    }

    #[test]
    fn test_none_exist() {
        let dir = TempDir::new().unwrap();
        let candidates = vec![dir.path().join("a"), dir.path().join("b")];
        assert!(first_existing(&candidates).is_none());
    }

    #[test]
    fn test_first_existing_wins_over_later_existing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::write(&first, "x").unwrap();
        fs::write(&second, "x").unwrap();

        let candidates = vec![missing, first.clone(), second];
        assert_eq!(first_existing(&candidates), Some(first.as_path()));
    }

    #[test]
    fn test_directories_are_not_executables() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("backend");
        fs::create_dir(&sub).unwrap();
        let file = dir.path().join("real");
        fs::write(&file, "x").unwrap();

        let candidates = vec![sub, file.clone()];
        assert_eq!(first_existing(&candidates), Some(file.as_path()));
    }

    #[test]
    fn test_working_dir_is_parent() {
        assert_eq!(
            working_dir_for(Path::new("/opt/app/backend/server")),
            PathBuf::from("/opt/app/backend")
        );
        assert_eq!(working_dir_for(Path::new("server")), PathBuf::from("."));
    }
}
