//! Builds a [`FileRecord`] for one discovered path.

use super::MetadataSource;
use crate::core::scanner::{MediaFilter, MediaKind};
use crate::error::ScanError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One successfully scanned media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative_path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Recovered creation time, if any
    pub creation_time: Option<NaiveDateTime>,
    /// Base name without extension, shared by every duplicate
    pub group_key: String,
    /// Image or video, by extension
    pub kind: MediaKind,
}

impl FileRecord {
    /// Whether a creation time was recovered
    pub fn has_metadata(&self) -> bool {
        self.creation_time.is_some()
    }

    pub fn is_image(&self) -> bool {
        self.kind.is_image()
    }
}

/// Result of extracting one path
#[derive(Debug, Clone)]
pub struct Extracted {
    pub record: FileRecord,
    /// Why no creation time was recovered, when metadata checking was on
    pub diagnostic: Option<String>,
}

/// Stats and classifies files, consulting a metadata source when enabled
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    root: PathBuf,
    filter: MediaFilter,
    check_metadata: bool,
}

impl MetadataExtractor {
    pub fn new(root: impl Into<PathBuf>, filter: MediaFilter, check_metadata: bool) -> Self {
        Self {
            root: root.into(),
            filter,
            check_metadata,
        }
    }

    pub fn checks_metadata(&self) -> bool {
        self.check_metadata
    }

    /// Extract a record for `path`.
    ///
    /// Only a failed stat is an error. Metadata problems are folded into
    /// a record without a creation time.
    pub fn extract<S>(&self, path: &Path, source: &mut S) -> Result<Extracted, ScanError>
    where
        S: MetadataSource + ?Sized,
    {
        let stat = fs::metadata(path).map_err(|source| ScanError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

        if !stat.is_file() {
            return Err(ScanError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let relative_path = match path.strip_prefix(&self.root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
        };

        let group_key = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let kind = self.filter.classify(path).unwrap_or(MediaKind::Video);

        let (creation_time, diagnostic) = if self.check_metadata {
            let lookup = source.lookup(path);
            match lookup.creation_time() {
                Some(time) => (Some(time), None),
                None => (
                    None,
                    Some(
                        lookup
                            .error
                            .unwrap_or_else(|| "no parseable creation time".to_string()),
                    ),
                ),
            }
        } else {
            (None, None)
        };

        Ok(Extracted {
            record: FileRecord {
                path: path.to_path_buf(),
                relative_path,
                size: stat.len(),
                creation_time,
                group_key,
                kind,
            },
            diagnostic,
        })
    }
}
