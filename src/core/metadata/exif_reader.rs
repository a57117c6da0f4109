//! In-process EXIF metadata source using kamadak-exif.

use super::{MetadataLookup, MetadataSource, MetadataSourceFactory};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF tags reported by this source, under their exiftool names
const REPORTED_TAGS: [(Tag, &str); 2] = [
    (Tag::DateTimeOriginal, "DateTimeOriginal"),
    (Tag::DateTimeDigitized, "CreateDate"),
];

/// Reads creation times straight from the EXIF block of a file
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifSource;

impl ExifSource {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataSource for ExifSource {
    fn lookup(&mut self, path: &Path) -> MetadataLookup {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => return MetadataLookup::failed(e.to_string()),
        };

        let mut bufreader = BufReader::new(&file);
        let exif = match Reader::new().read_from_container(&mut bufreader) {
            Ok(exif) => exif,
            Err(e) => return MetadataLookup::failed(e.to_string()),
        };

        let fields = REPORTED_TAGS
            .iter()
            .filter_map(|(tag, name)| {
                let field = exif.get_field(*tag, In::PRIMARY)?;
                get_string_value(&field.value).map(|value| (name.to_string(), value))
            })
            .collect();

        MetadataLookup {
            fields,
            error: None,
        }
    }
}

/// Creates an [`ExifSource`] per worker. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifSourceFactory;

impl MetadataSourceFactory for ExifSourceFactory {
    fn create(&self) -> Result<Box<dyn MetadataSource>, String> {
        Ok(Box::new(ExifSource::new()))
    }
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
