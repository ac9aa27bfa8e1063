use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for an event published by one editing session.
///
/// - `session_id` scopes the event to a single editor instance (a host may run
///   several editors side by side).
/// - `sequence_number` is monotonically increasing per session, so subscribers
///   can discard stale notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    session_id: Uuid,

    /// Monotonically increasing position in the session stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(session_id: Uuid, sequence_number: u64, payload: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            session_id,
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
