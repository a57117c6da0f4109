//! Directory walking implementation using walkdir.

use super::filter::MediaFilter;
use crate::error::ScanError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily enumerates candidate media paths under a source root
#[derive(Debug, Clone)]
pub struct PathEnumerator {
    root: PathBuf,
    recursive: bool,
    filter: MediaFilter,
}

impl PathEnumerator {
    /// Create an enumerator for `root`.
    ///
    /// Non-recursive enumerators only look at the entries directly in the root.
    pub fn new(root: impl Into<PathBuf>, recursive: bool, filter: MediaFilter) -> Self {
        Self {
            root: root.into(),
            recursive,
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filter(&self) -> &MediaFilter {
        &self.filter
    }

    /// Start the traversal.
    ///
    /// Fails only if the root itself cannot be read. Unreadable
    /// subdirectories below it are skipped. Exclusion patterns are tested
    /// against paths relative to the root, so neither the root nor its
    /// parent directories can exclude anything.
    pub fn paths(&self) -> Result<impl Iterator<Item = PathBuf> + '_, ScanError> {
        fs::read_dir(&self.root).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ScanError::DirectoryNotFound {
                    path: self.root.clone(),
                }
            } else {
                ScanError::ReadDirectory {
                    path: self.root.clone(),
                    source,
                }
            }
        })?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let filter = &self.filter;
        let root = self.root.as_path();

        let paths = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            // Returning false for a directory prunes its whole subtree
            .filter_entry(move |entry| {
                // Patterns only see the part of the path below the root
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                entry.depth() == 0 || !filter.is_excluded(relative)
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir())
            .filter(move |entry| filter.accepts(entry.path()))
            .map(|entry| entry.into_path());

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn filter() -> MediaFilter {
        MediaFilter::new(&[".jpg", ".png"], &[".mp4"], &[".*"])
    }

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap().write_all(b"data").unwrap();
        path
    }

    fn relative_set(root: &Path, enumerator: &PathEnumerator) -> HashSet<PathBuf> {
        enumerator
            .paths()
            .unwrap()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect()
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let enumerator = PathEnumerator::new(temp_dir.path(), true, filter());
        assert_eq!(enumerator.paths().unwrap().count(), 0);
    }

    #[test]
    fn recursive_walk_finds_nested_media() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "root.jpg");
        touch(temp_dir.path(), "a/b/deep.png");
        touch(temp_dir.path(), "c/clip.mp4");
        touch(temp_dir.path(), "c/notes.txt");

        let enumerator = PathEnumerator::new(temp_dir.path(), true, filter());
        let found = relative_set(temp_dir.path(), &enumerator);

        let expected: HashSet<PathBuf> = ["root.jpg", "a/b/deep.png", "c/clip.mp4"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn non_recursive_walk_stays_in_root() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "top.jpg");
        touch(temp_dir.path(), "sub/nested.jpg");

        let enumerator = PathEnumerator::new(temp_dir.path(), false, filter());
        let found = relative_set(temp_dir.path(), &enumerator);

        assert_eq!(found, HashSet::from([PathBuf::from("top.jpg")]));
    }

    #[test]
    fn hidden_directories_are_pruned() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), ".git/x.jpg");
        touch(temp_dir.path(), "photos/y.jpg");

        let enumerator = PathEnumerator::new(temp_dir.path(), true, filter());
        let found = relative_set(temp_dir.path(), &enumerator);

        assert_eq!(found, HashSet::from([PathBuf::from("photos/y.jpg")]));
    }

    #[test]
    fn hidden_root_is_still_walked() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join(".library");
        touch(&root, "a.jpg");

        let enumerator = PathEnumerator::new(&root, true, filter());
        assert_eq!(enumerator.paths().unwrap().count(), 1);
    }

    #[test]
    fn excluded_files_are_skipped_in_flat_mode() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "keep.jpg");
        touch(temp_dir.path(), ".skip.jpg");

        let enumerator = PathEnumerator::new(temp_dir.path(), false, filter());
        let found = relative_set(temp_dir.path(), &enumerator);

        assert_eq!(found, HashSet::from([PathBuf::from("keep.jpg")]));
    }

    #[test]
    fn patterns_ignore_the_directories_above_the_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("backup-2024").join("library");
        touch(&root, "photos/a.jpg");
        touch(&root, "backup/b.jpg");

        let filter = MediaFilter::new(&[".jpg"], &[], &["backup"]);
        let enumerator = PathEnumerator::new(&root, true, filter);
        let found = relative_set(&root, &enumerator);

        assert_eq!(found, HashSet::from([PathBuf::from("photos/a.jpg")]));
    }

    #[test]
    fn substring_patterns_match_below_the_root() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Attmpdir/a.jpg");
        touch(temp_dir.path(), "keep/b.jpg");

        let filter = MediaFilter::new(&[".jpg"], &[], &["tmp"]);
        let enumerator = PathEnumerator::new(temp_dir.path(), true, filter);
        let found = relative_set(temp_dir.path(), &enumerator);

        assert_eq!(found, HashSet::from([PathBuf::from("keep/b.jpg")]));
    }

    #[test]
    fn missing_root_is_an_error() {
        let enumerator = PathEnumerator::new("/nonexistent/path/12345", true, filter());
        let error = enumerator.paths().err().unwrap();
        assert!(matches!(error, ScanError::DirectoryNotFound { .. }));
    }
}
