//! # Event Notifier
//!
//! Publishes one [`RegistryEvent`] per successful top-level mutation. The
//! event carries how many records the call added; per-row events are never
//! emitted, and nothing is emitted for a rejected call.
//!
//! The notifier holds no registry state. It fans each event out to its
//! subscribed [`EventSink`]s. A [`TracingSink`] is always subscribed first,
//! so every event reaches the log even with no other observer attached.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A change notification for off-system observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum RegistryEvent {
    /// Certifiers were registered.
    CertifiersAdded { count: usize },
    /// Approved applicants were registered.
    ApplicantsAdded { count: usize },
    /// Applications were granted.
    ApplicationsAdded { count: usize },
}

impl RegistryEvent {
    /// Number of records the mutation added.
    pub fn count(&self) -> usize {
        match self {
            Self::CertifiersAdded { count }
            | Self::ApplicantsAdded { count }
            | Self::ApplicationsAdded { count } => *count,
        }
    }

    /// The event name as observers know it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CertifiersAdded { .. } => "CertifiersAdded",
            Self::ApplicantsAdded { .. } => "ApplicantsAdded",
            Self::ApplicationsAdded { .. } => "ApplicationsAdded",
        }
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.count())
    }
}

/// Receives published events.
///
/// Sinks are called after the registry has released its lock, so a sink may
/// read the registry. A sink must not block for long: publication is
/// synchronous with the mutating call.
///
/// Delivery order is not commit order. Two mutations committed back to
/// back on different threads may reach a sink in either order, and a sink
/// reading the registry may already see the later commit.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RegistryEvent);
}

/// Sink that logs each event at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: &RegistryEvent) {
        tracing::info!(event = event.name(), count = event.count(), "registry event");
    }
}

/// Sink that records every event in memory, oldest first.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<RegistryEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event received so far.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().clone()
    }

    /// Remove and return every event received so far.
    pub fn drain(&self) -> Vec<RegistryEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for EventLog {
    fn publish(&self, event: &RegistryEvent) {
        self.events.lock().push(*event);
    }
}

/// Fans events out to subscribed sinks.
#[derive(Clone)]
pub struct Notifier {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Notifier {
    /// A notifier with only the [`TracingSink`] attached.
    pub fn new() -> Self {
        Self {
            sinks: vec![Arc::new(TracingSink)],
        }
    }

    /// Add a sink. Sinks receive events in subscription order.
    pub fn subscribe(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver the event to every sink.
    pub fn publish(&self, event: RegistryEvent) {
        for sink in &self.sinks {
            sink.publish(&event);
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors_and_display() {
        let e = RegistryEvent::ApplicantsAdded { count: 3 };
        assert_eq!(e.count(), 3);
        assert_eq!(e.name(), "ApplicantsAdded");
        assert_eq!(e.to_string(), "ApplicantsAdded(3)");
    }

    #[test]
    fn test_event_serialization() {
        let e = RegistryEvent::CertifiersAdded { count: 1 };
        let json = serde_json::to_value(e).unwrap();
        assert_eq!(json, serde_json::json!({"event": "CertifiersAdded", "count": 1}));
        let back: RegistryEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_notifier_delivers_to_every_sink() {
        let first = Arc::new(EventLog::new());
        let second = Arc::new(EventLog::new());
        let mut notifier = Notifier::new();
        notifier.subscribe(first.clone());
        notifier.subscribe(second.clone());
        assert_eq!(notifier.sink_count(), 3);

        notifier.publish(RegistryEvent::ApplicationsAdded { count: 2 });

        assert_eq!(first.events(), vec![RegistryEvent::ApplicationsAdded { count: 2 }]);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_event_log_drain() {
        let log = EventLog::new();
        log.publish(&RegistryEvent::CertifiersAdded { count: 1 });
        log.publish(&RegistryEvent::CertifiersAdded { count: 4 });
        assert_eq!(log.drain().len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_notifier_starts_with_tracing_sink() {
        let notifier = Notifier::default();
        assert_eq!(notifier.sink_count(), 1);
        notifier.publish(RegistryEvent::CertifiersAdded { count: 0 });
    }
}
