//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to send events from the pipeline
//! to any UI layer without ever stalling a stage.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};

use super::Event;

/// Sends events from the core library.
///
/// This is a thin wrapper around crossbeam's Sender that can be
/// cloned and shared across worker threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Create a new EventSender from a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Send an event without blocking.
    ///
    /// If the channel is full or the receiver is dropped, the event is
    /// discarded. Progress reporting is optional and never applies
    /// backpressure to the pipeline.
    pub fn send(&self, event: Event) {
        match self.inner.try_send(event) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => {
                tracing::trace!("progress channel full, dropping event");
            }
        }
    }
}

/// Receives events from the core library.
///
/// Used by UI layers to subscribe to progress updates.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Drain every event currently buffered
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// A bidirectional event channel for communication between
/// the core library and UI layers.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    ///
    /// Use this for most cases - events are small and fast.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Create a bounded event channel with the specified capacity.
    ///
    /// Events that arrive while the channel is full are dropped.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}

/// A no-op event sender for when you don't need progress reporting.
///
/// This is useful for tests or when running without a UI.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, ScanEvent, StageProgress};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Scan(ScanEvent::Progress(StageProgress {
                current: 5,
                total: 25,
                current_path: PathBuf::from("/test/a.jpg"),
            })));
        });

        handle.join().unwrap();

        let event = receiver.recv().unwrap();
        match event {
            Event::Scan(ScanEvent::Progress(p)) => {
                assert_eq!(p.total, 25);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started));
    }

    #[test]
    fn full_bounded_channel_drops_instead_of_blocking() {
        let (sender, receiver) = EventChannel::bounded(2);

        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.send(Event::Pipeline(PipelineEvent::Started));
        // Would block with a plain send; must return immediately here
        sender.send(Event::Pipeline(PipelineEvent::Started));

        assert_eq!(receiver.drain().len(), 2);
        assert!(receiver.try_recv().is_none());
    }
}
