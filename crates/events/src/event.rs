use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **named** (stable `event_type` for routing and logging)
/// - **timestamped** (when the fact became true in the session)
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "editor.baseline.captured").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (session time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
