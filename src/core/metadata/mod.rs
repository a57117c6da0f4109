//! # Metadata Module
//!
//! Turns a discovered path into a [`FileRecord`].
//!
//! ## Creation times
//! A metadata source reports raw field/value pairs for a file. The first
//! field, in [`CREATION_FIELDS`] order, whose value parses with one of
//! [`CREATION_FORMATS`] (also tried in order) becomes the creation time.
//! Lookups are best effort: a source that fails, or returns nothing
//! parseable, yields a record without metadata.
//!
//! ## Sources
//! - [`ExifSource`] - in-process EXIF reader (JPEG, TIFF, HEIF, PNG, WebP)
//! - [`ExiftoolSource`] - a persistent `exiftool` process, one per worker
//!
//! Each worker owns its own source, created through a
//! [`MetadataSourceFactory`], so lookups run in parallel.

mod exif_reader;
mod exiftool;
mod extractor;

pub use exif_reader::{ExifSource, ExifSourceFactory};
pub use exiftool::{ExiftoolSource, ExiftoolSourceFactory};
pub use extractor::{Extracted, FileRecord, MetadataExtractor};

use chrono::NaiveDateTime;
use std::path::Path;

/// Fields that may hold a creation time, highest priority first
pub const CREATION_FIELDS: [&str; 4] = [
    "DateTimeOriginal",
    "CreateDate",
    "CreationDate",
    "MediaCreateDate",
];

/// Accepted timestamp layouts, highest priority first
pub const CREATION_FORMATS: [&str; 3] = [
    "%Y:%m:%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Raw answer from a metadata source for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataLookup {
    /// Field name / value pairs, in the order the source reported them
    pub fields: Vec<(String, String)>,
    /// Per-file failure reported by the source
    pub error: Option<String>,
}

impl MetadataLookup {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            fields: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Look up a field value by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Resolve the creation time using the fixed field and format priority
    pub fn creation_time(&self) -> Option<NaiveDateTime> {
        if self.error.is_some() {
            return None;
        }

        CREATION_FIELDS
            .iter()
            .filter_map(|name| self.field(name))
            .find_map(parse_timestamp)
    }
}

/// Parse a timestamp with the first matching accepted layout
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim_end_matches('\0').trim();
    CREATION_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// A client that can read embedded metadata from files.
///
/// Instances are owned by a single worker and never shared.
pub trait MetadataSource: Send {
    /// Query metadata for one file. Never fails; errors go in the lookup.
    fn lookup(&mut self, path: &Path) -> MetadataLookup;
}

/// Creates one metadata source per worker
pub trait MetadataSourceFactory: Send + Sync {
    /// Create a fresh client. Failure aborts the run before scanning.
    fn create(&self) -> Result<Box<dyn MetadataSource>, String>;
}

/// Source used when metadata checking is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn lookup(&mut self, _path: &Path) -> MetadataLookup {
        MetadataLookup::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(fields: &[(&str, &str)]) -> MetadataLookup {
        MetadataLookup {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            error: None,
        }
    }

    #[test]
    fn exif_layout_parses() {
        let parsed = parse_timestamp("2024:01:15 10:30:00").unwrap();
        assert_eq!(parsed.to_string(), "2024-01-15 10:30:00");
    }

    #[test]
    fn iso_layouts_parse() {
        assert!(parse_timestamp("2024-01-15T10:30:00").is_some());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_some());
    }

    #[test]
    fn zoned_or_garbage_values_do_not_parse() {
        assert!(parse_timestamp("2024:01:15 10:30:00+02:00").is_none());
        assert!(parse_timestamp("0000:00:00 00:00:00").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn fields_are_tried_in_priority_order() {
        let meta = lookup(&[
            ("MediaCreateDate", "2020:01:01 00:00:00"),
            ("CreateDate", "2021:01:01 00:00:00"),
            ("DateTimeOriginal", "2022:01:01 00:00:00"),
        ]);
        assert_eq!(
            meta.creation_time().unwrap().to_string(),
            "2022-01-01 00:00:00"
        );
    }

    #[test]
    fn unparseable_field_falls_through_to_next() {
        let meta = lookup(&[
            ("DateTimeOriginal", "not a date"),
            ("CreationDate", "2019-06-01T12:00:00"),
        ]);
        assert_eq!(
            meta.creation_time().unwrap().to_string(),
            "2019-06-01 12:00:00"
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let meta = lookup(&[("ModifyDate", "2024:01:15 10:30:00")]);
        assert!(meta.creation_time().is_none());
    }

    #[test]
    fn failed_lookup_has_no_creation_time() {
        let meta = MetadataLookup::failed("boom");
        assert!(meta.creation_time().is_none());
    }
}
