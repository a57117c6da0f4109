//! # mediadupes CLI
//!
//! Copies one copy of every photo and video into a destination tree.
//!
//! ## Usage
//! ```bash
//! mediadupes -s ~/Pictures -d ~/Sorted
//! mediadupes -s ~/Pictures --plan --output json
//! ```

mod cli;

use media_dedup::Result;

fn main() -> Result<()> {
    cli::run()
}
