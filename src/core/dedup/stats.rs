//! Running size and type totals kept in step with the survivor map.

use crate::core::metadata::FileRecord;
use serde::{Deserialize, Serialize};

/// Totals over every reduced record and over the current survivors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Records reduced
    pub total_files: u64,
    /// Bytes across every record reduced
    pub total_size: u64,
    /// Records currently surviving
    pub unique_files: u64,
    /// Bytes across the current survivors
    pub unique_size: u64,
    pub total_images: u64,
    pub total_videos: u64,
    pub unique_images: u64,
    pub unique_videos: u64,
    pub unique_image_size: u64,
    pub unique_video_size: u64,
    /// Records with a recovered creation time
    pub with_metadata: u64,
    pub without_metadata: u64,
}

impl AggregateStats {
    /// Count a record that entered the reducer
    pub(crate) fn record_seen(&mut self, record: &FileRecord) {
        self.total_files += 1;
        self.total_size += record.size;

        if record.is_image() {
            self.total_images += 1;
        } else {
            self.total_videos += 1;
        }

        if record.has_metadata() {
            self.with_metadata += 1;
        } else {
            self.without_metadata += 1;
        }
    }

    /// Add a survivor's contribution
    pub(crate) fn add_survivor(&mut self, record: &FileRecord) {
        self.unique_files += 1;
        self.unique_size += record.size;

        if record.is_image() {
            self.unique_images += 1;
            self.unique_image_size += record.size;
        } else {
            self.unique_videos += 1;
            self.unique_video_size += record.size;
        }
    }

    /// Remove the contribution of a survivor that was replaced
    pub(crate) fn remove_survivor(&mut self, record: &FileRecord) {
        self.unique_files -= 1;
        self.unique_size -= record.size;

        if record.is_image() {
            self.unique_images -= 1;
            self.unique_image_size -= record.size;
        } else {
            self.unique_videos -= 1;
            self.unique_video_size -= record.size;
        }
    }

    /// Records that lost to a survivor
    pub fn duplicates(&self) -> u64 {
        self.total_files - self.unique_files
    }

    /// Bytes that will not be copied
    pub fn savings(&self) -> u64 {
        self.total_size - self.unique_size
    }

    /// Savings as a percentage of the total size
    pub fn savings_percent(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            self.savings() as f64 / self.total_size as f64 * 100.0
        }
    }
}
