//! Run configuration consumed by the pipeline.

use crate::core::scanner::MediaFilter;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".heic", ".heif"];
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".mov", ".avi", ".mkv", ".m4v"];
/// Hidden files and directories
pub const DEFAULT_EXCLUDE_PATTERNS: [&str; 1] = [".*"];

pub const DEFAULT_COPY_CONCURRENCY: usize = 4;
pub const DEFAULT_PATH_QUEUE_CAPACITY: usize = 1000;
pub const DEFAULT_RESULT_QUEUE_CAPACITY: usize = 100;

/// Number of scan workers when none is configured
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Configuration for one deduplication run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory to scan
    pub source: PathBuf,
    /// Directory survivors are copied into
    pub destination: PathBuf,
    /// Scan workers (CPU-bound)
    pub workers: usize,
    /// Parallel copies (I/O-bound)
    pub copy_concurrency: usize,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    /// Base-name globs / path substrings to skip
    pub exclude_patterns: Vec<String>,
    pub recursive: bool,
    /// Recover creation times and prefer files that have one
    pub check_metadata: bool,
    /// Group by base name; when off every file survives
    pub dedup: bool,
    /// Scan and reduce only, skip copying
    pub plan_only: bool,
    /// Copy everything directly into the destination root
    pub flatten: bool,
    /// Pending paths before the walker blocks
    pub path_queue_capacity: usize,
    /// Pending records before workers block
    pub result_queue_capacity: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            destination: PathBuf::from("MEDIADUPES"),
            workers: default_workers(),
            copy_concurrency: DEFAULT_COPY_CONCURRENCY,
            image_extensions: to_strings(&DEFAULT_IMAGE_EXTENSIONS),
            video_extensions: to_strings(&DEFAULT_VIDEO_EXTENSIONS),
            exclude_patterns: to_strings(&DEFAULT_EXCLUDE_PATTERNS),
            recursive: true,
            check_metadata: true,
            dedup: true,
            plan_only: false,
            flatten: false,
            path_queue_capacity: DEFAULT_PATH_QUEUE_CAPACITY,
            result_queue_capacity: DEFAULT_RESULT_QUEUE_CAPACITY,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl RunConfig {
    /// Check everything that must hold before a run starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source_root()?;

        for (name, value) in [
            ("workers", self.workers),
            ("copy concurrency", self.copy_concurrency),
            ("path queue capacity", self.path_queue_capacity),
            ("result queue capacity", self.result_queue_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        let has_extension = self
            .image_extensions
            .iter()
            .chain(&self.video_extensions)
            .any(|ext| !ext.trim().trim_start_matches('.').is_empty());
        if !has_extension {
            return Err(ConfigError::NoExtensions);
        }

        Ok(())
    }

    /// Absolute, canonical source root
    pub fn source_root(&self) -> Result<PathBuf, ConfigError> {
        let root = self.source.canonicalize().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::SourceNotFound {
                path: self.source.clone(),
            },
            _ => ConfigError::InvalidValue {
                name: "source",
                reason: format!("{}: {}", self.source.display(), e),
            },
        })?;

        if !root.is_dir() {
            return Err(ConfigError::SourceNotDirectory {
                path: self.source.clone(),
            });
        }

        Ok(root)
    }

    /// Filter built from the extension and exclusion settings
    pub fn filter(&self) -> MediaFilter {
        MediaFilter::new(
            &self.image_extensions,
            &self.video_extensions,
            &self.exclude_patterns,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> RunConfig {
        RunConfig {
            source: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = RunConfig::default();
        assert_eq!(config.copy_concurrency, 4);
        assert_eq!(config.exclude_patterns, vec![".*".to_string()]);
        assert!(config.recursive && config.check_metadata && config.dedup);
        assert!(!config.plan_only && !config.flatten);
        assert!(config.workers >= 1);
    }

    #[test]
    fn existing_source_validates() {
        let dir = TempDir::new().unwrap();
        assert!(config_for(&dir).validate().is_ok());
    }

    #[test]
    fn missing_source_is_rejected() {
        let config = RunConfig {
            source: PathBuf::from("/nonexistent/source/12345"),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn file_as_source_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.jpg");
        std::fs::write(&file, b"x").unwrap();

        let config = RunConfig {
            source: file,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SourceNotDirectory { .. })
        ));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = RunConfig {
            workers: 0,
            ..config_for(&dir)
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name: "workers", .. })
        ));
    }

    #[test]
    fn empty_extension_sets_are_rejected() {
        let dir = TempDir::new().unwrap();
        let config = RunConfig {
            image_extensions: vec![],
            video_extensions: vec![".".to_string()],
            ..config_for(&dir)
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoExtensions)));
    }

    #[test]
    fn parse_list_trims_and_drops_blanks() {
        assert_eq!(
            parse_list(" .jpg, .PNG ,,"),
            vec![".jpg".to_string(), ".PNG".to_string()]
        );
        assert!(parse_list("").is_empty());
    }
}
