//! # Media Dedup
//!
//! Copies a photo and video library into a fresh destination, keeping one
//! file per base name.
//!
//! ## How a survivor is chosen
//! Files sharing a base name (extension stripped) form a duplicate group.
//! The survivor of a group is the file with a recoverable creation time,
//! and among files with the same metadata status, the largest one. Exact
//! ties keep whichever file was seen first.
//!
//! ## Architecture
//! The library is split into a GUI-agnostic core and presentation layers:
//! - `core` - The scan, reduce and copy pipeline
//! - `events` - Non-blocking progress reporting
//! - `error` - Error taxonomy
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MediaDedupError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Falls back to `warn` when `RUST_LOG` is unset.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
