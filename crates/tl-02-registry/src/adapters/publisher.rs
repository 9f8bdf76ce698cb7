//! Event publisher adapters.

use crate::events::EventEnvelope;
use crate::ports::outbound::{PublishError, RegistryEventPublisher};
use parking_lot::Mutex;
use tracing::info;

/// Publisher that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPublisher;

impl RegistryEventPublisher for NoOpPublisher {
    fn publish(&self, _event: &EventEnvelope) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Publisher that writes each event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPublisher;

impl RegistryEventPublisher for LoggingPublisher {
    fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
        let payload = serde_json::to_string(&envelope.event)
            .map_err(|e| PublishError::SerializationError(e.to_string()))?;
        info!(
            event = envelope.event.name(),
            event_id = %envelope.event_id,
            tx_id = %envelope.tx_id,
            asset_id = envelope.event.asset_id(),
            %payload,
            "Registry event"
        );
        Ok(())
    }
}

/// Publisher that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far, oldest first.
    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().clone()
    }

    /// Names of the events published so far.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.event.name()).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl RegistryEventPublisher for RecordingPublisher {
    fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
        self.events.lock().push(envelope.clone());
        Ok(())
    }
}
