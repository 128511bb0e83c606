//! Notification sink contract.
//!
//! The sink is an external collaborator: probes call it synchronously, on
//! the returning thread, once per normal method exit. Buffering or async
//! dispatch is the sink's concern, not the engine's. The sink is passed into
//! the executing environment explicitly and must be live before any
//! instrumented code runs.

use parking_lot::Mutex;
use std::sync::Arc;

/// One timing measurement from an instrumented method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeEvent {
    /// Profiling-session identifier.
    pub run_id: Arc<str>,
    /// Internal name of the owning class.
    pub class_name: Arc<str>,
    /// Resolved method signature label.
    pub method_signature: Arc<str>,
    /// Name of the thread that executed the invocation.
    pub thread_name: Arc<str>,
    /// Entry timestamp, monotonic nanoseconds.
    pub start_nanos: i64,
    /// Exit timestamp, monotonic nanoseconds.
    pub end_nanos: i64,
}

impl ProbeEvent {
    /// Wall-clock duration of the invocation in nanoseconds.
    #[inline]
    pub fn duration_nanos(&self) -> i64 {
        self.end_nanos - self.start_nanos
    }
}

/// Receiver for probe events.
///
/// Called concurrently from every thread executing instrumented methods.
pub trait Notifier: Send + Sync {
    /// Receive one measurement. Runs inline on the returning thread.
    fn notify(&self, event: &ProbeEvent);
}

/// Sink that appends every event to an in-memory list.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProbeEvent>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events received so far.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events have been received.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.lock().clone()
    }
}

impl Notifier for RecordingSink {
    fn notify(&self, event: &ProbeEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Sink that emits each event through the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl Notifier for LogSink {
    fn notify(&self, event: &ProbeEvent) {
        log::info!(
            "run={} {}.{} thread={} start={} end={} duration_ns={}",
            event.run_id,
            event.class_name,
            event.method_signature,
            event.thread_name,
            event.start_nanos,
            event.end_nanos,
            event.duration_nanos(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start: i64, end: i64) -> ProbeEvent {
        ProbeEvent {
            run_id: "run".into(),
            class_name: "com/example/Foo".into(),
            method_signature: "bar()".into(),
            thread_name: "main".into(),
            start_nanos: start,
            end_nanos: end,
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(event(10, 35).duration_nanos(), 25);
    }

    #[test]
    fn test_recording_sink_accumulates() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());
        sink.notify(&event(1, 2));
        sink.notify(&event(3, 4));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[1].start_nanos, 3);
    }

    #[test]
    fn test_recording_sink_is_shareable() {
        let sink = Arc::new(RecordingSink::new());
        let threads: Vec<_> = (0..4)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || sink.notify(&event(i, i + 1)))
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(sink.len(), 4);
    }
}
