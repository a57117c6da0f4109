//! # Reporter Module
//!
//! Renders the final run summary for humans.
//!
//! A full run reports processed, unique, copied and failed counts. A
//! plan-only run reports what a copy would achieve: sizes, savings, the
//! image/video split and how many files carried a creation time.

use crate::events::RunSummary;
use std::fmt;

/// Format a byte count in 1024 units with one decimal
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.copied {
            Some(copied) => {
                writeln!(f, "Complete!")?;
                writeln!(f, "   Processed: {} files", self.processed)?;
                writeln!(f, "   Unique: {} files", self.unique)?;
                writeln!(f, "   Copied: {} files", copied)?;
                write!(
                    f,
                    "   Failed: {} files ({} scan, {} copy)",
                    self.failed(),
                    self.failed_scan,
                    self.failed_copy
                )
            }
            None => self.fmt_plan(f),
        }
    }
}

impl RunSummary {
    fn fmt_plan(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;

        writeln!(f, "Summary")?;
        writeln!(f)?;
        writeln!(f, "Files:")?;
        writeln!(
            f,
            "  Total: {} ({})",
            self.processed,
            format_bytes(stats.total_size)
        )?;
        writeln!(
            f,
            "  Unique: {} ({})",
            self.unique,
            format_bytes(stats.unique_size)
        )?;
        writeln!(f, "  Duplicates: {}", self.duplicates)?;
        writeln!(
            f,
            "  Savings: {} ({:.1}%)",
            format_bytes(stats.savings()),
            stats.savings_percent()
        )?;
        writeln!(f)?;
        writeln!(f, "By Type:")?;
        writeln!(
            f,
            "  Images: {} files ({})",
            stats.total_images,
            format_bytes(stats.unique_image_size)
        )?;
        writeln!(
            f,
            "  Videos: {} files ({})",
            stats.total_videos,
            format_bytes(stats.unique_video_size)
        )?;
        writeln!(f)?;
        writeln!(f, "Metadata:")?;
        writeln!(f, "  With EXIF: {} files", stats.with_metadata)?;
        writeln!(f, "  Without EXIF: {} files", stats.without_metadata)?;
        writeln!(f)?;
        writeln!(f, "Performance:")?;
        writeln!(f, "  Workers: {}", self.workers)?;
        write!(f, "  Time: {:.1}s", self.duration_ms as f64 / 1000.0)
    }
}
