//! Extension and exclusion filtering for the scanner.

use super::MediaKind;
use glob::Pattern;
use std::collections::HashSet;
use std::path::Path;

/// Normalize an extension to lowercase without a leading dot
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Exclusion patterns, each tested as a base-name glob and as a path substring
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<(String, Option<Pattern>)>,
}

impl ExcludeSet {
    /// Compile exclusion patterns.
    ///
    /// A pattern that is not valid glob syntax still applies as a substring.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .map(|raw| raw.as_ref().trim())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let glob = match Pattern::new(raw) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::warn!("Invalid glob pattern '{}': {}", raw, e);
                        None
                    }
                };
                (raw.to_string(), glob)
            })
            .collect();
        Self { patterns }
    }

    /// Check whether any pattern excludes this path.
    ///
    /// The enumerator passes paths relative to the source root.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let name = path.file_name().map(|n| n.to_string_lossy());
        let full = path.to_string_lossy();

        self.patterns.iter().any(|(raw, glob)| {
            let name_matches = match (glob, &name) {
                (Some(glob), Some(name)) => glob.matches(name),
                _ => false,
            };
            name_matches || full.contains(raw.as_str())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Decides which files are media candidates and what kind they are
#[derive(Debug, Clone)]
pub struct MediaFilter {
    image_extensions: HashSet<String>,
    video_extensions: HashSet<String>,
    excludes: ExcludeSet,
}

impl MediaFilter {
    /// Create a filter from extension lists (with or without leading dots)
    pub fn new<S: AsRef<str>>(images: &[S], videos: &[S], excludes: &[S]) -> Self {
        let collect = |exts: &[S]| -> HashSet<String> {
            exts.iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect()
        };

        Self {
            image_extensions: collect(images),
            video_extensions: collect(videos),
            excludes: ExcludeSet::new(excludes),
        }
    }

    /// Classify a path by extension, or None if it is not a candidate type
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        let ext = normalize_extension(path.extension()?.to_str()?);
        if self.image_extensions.contains(&ext) {
            Some(MediaKind::Image)
        } else if self.video_extensions.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Check if the extension is accepted
    pub fn accepts(&self, path: &Path) -> bool {
        self.classify(path).is_some()
    }

    /// Check if an exclusion pattern matches
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excludes.is_excluded(path)
    }

    /// A file is a candidate when it is accepted and not excluded
    pub fn should_include(&self, path: &Path) -> bool {
        self.accepts(path) && !self.is_excluded(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_filter() -> MediaFilter {
        MediaFilter::new(
            &[".jpg", ".jpeg", ".png", ".heic", ".heif"],
            &[".mp4", ".mov", ".avi", ".mkv", ".m4v"],
            &[".*"],
        )
    }

    #[test]
    fn extensions_are_case_insensitive() {
        let filter = default_filter();
        assert_eq!(filter.classify(Path::new("/p/IMG_1.JPG")), Some(MediaKind::Image));
        assert_eq!(filter.classify(Path::new("/p/clip.MoV")), Some(MediaKind::Video));
    }

    #[test]
    fn unlisted_extensions_are_rejected() {
        let filter = default_filter();
        assert!(!filter.accepts(Path::new("/p/notes.txt")));
        assert!(!filter.accepts(Path::new("/p/no_extension")));
    }

    #[test]
    fn dot_prefix_is_optional_in_configuration() {
        let filter = MediaFilter::new(&["JPG"], &["mp4"], &[]);
        assert!(filter.accepts(Path::new("/p/a.jpg")));
        assert!(filter.accepts(Path::new("/p/a.MP4")));
    }

    #[test]
    fn extension_in_both_sets_is_an_image() {
        let filter = MediaFilter::new(&[".gif"], &[".gif"], &[]);
        assert_eq!(filter.classify(Path::new("/p/a.gif")), Some(MediaKind::Image));
    }

    #[test]
    fn default_pattern_excludes_hidden_names() {
        let filter = default_filter();
        assert!(filter.is_excluded(Path::new("/photos/.git")));
        assert!(filter.is_excluded(Path::new("/photos/.hidden.jpg")));
        assert!(!filter.is_excluded(Path::new("/photos/visible.jpg")));
    }

    #[test]
    fn patterns_also_match_path_substrings() {
        let excludes = ExcludeSet::new(&["tmp"]);
        assert!(excludes.is_excluded(Path::new("/data/Attmpdir/a.jpg")));
        assert!(!excludes.is_excluded(Path::new("/data/photos/a.jpg")));
    }

    #[test]
    fn glob_patterns_match_base_names() {
        let excludes = ExcludeSet::new(&["*_thumb.jpg"]);
        assert!(excludes.is_excluded(Path::new("/p/a_thumb.jpg")));
        assert!(!excludes.is_excluded(Path::new("/p/a.jpg")));
    }

    #[test]
    fn invalid_glob_still_matches_as_substring() {
        let excludes = ExcludeSet::new(&["[broken"]);
        assert!(excludes.is_excluded(Path::new("/p/[broken/a.jpg")));
        assert!(!excludes.is_excluded(Path::new("/p/a.jpg")));
    }

    #[test]
    fn blank_patterns_are_ignored() {
        let excludes = ExcludeSet::new(&["", "  "]);
        assert!(excludes.is_empty());
        assert!(!excludes.is_excluded(Path::new("/p/a.jpg")));
    }
}
