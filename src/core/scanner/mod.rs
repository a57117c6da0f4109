//! # Scanner Module
//!
//! Discovers candidate media files under a source root.
//!
//! ## Filtering
//! A path is a candidate when its extension is one of the configured
//! image or video extensions (case-insensitive) and no exclusion pattern
//! matches it. A pattern matches when it glob-matches the base name or
//! appears anywhere in the path below the source root. An excluded
//! directory is pruned without being descended into.
//!
//! ## Example
//! ```rust,ignore
//! use media_dedup::core::scanner::{MediaFilter, PathEnumerator};
//!
//! let filter = MediaFilter::new(&[".jpg"], &[".mp4"], &[".*"]);
//! let enumerator = PathEnumerator::new("/photos", true, filter);
//! for path in enumerator.paths()? {
//!     println!("{}", path.display());
//! }
//! ```

mod filter;
mod walker;

pub use filter::{ExcludeSet, MediaFilter};
pub use walker::PathEnumerator;

use serde::{Deserialize, Serialize};

/// Media classification derived from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn is_image(&self) -> bool {
        matches!(self, MediaKind::Image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_report_is_image() {
        assert!(MediaKind::Image.is_image());
        assert!(!MediaKind::Video.is_image());
    }
}
