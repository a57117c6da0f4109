//! # Events Module
//!
//! Event-driven progress reporting for the pipeline.
//!
//! ## Design
//! Every stage emits events through a channel, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. Sending never
//! blocks, so a slow or absent listener cannot stall a stage.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Scan(ScanEvent::Progress(p)) => println!("Scanned {}/{}", p.current, p.total),
//!             Event::Copy(CopyEvent::Error { path, message }) => eprintln!("{}: {}", path.display(), message),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
