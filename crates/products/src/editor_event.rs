//! Facts the editing session publishes to its host.

use chrono::{DateTime, Duration, Utc};

use storefront_core::ProductId;
use storefront_events::{Event, EventEnvelope};

use crate::collaborators::UploadProgress;

/// Transient warning shown for a rejected edit. Hosts hide it once expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub reason: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(reason: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            reason: reason.into(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Prefetches for an existing product started; dirty checks are suppressed.
    HydrationStarted {
        product_id: ProductId,
        at: DateTime<Utc>,
    },
    /// Every prefetch resolved and the baseline was taken.
    BaselineCaptured {
        product_id: ProductId,
        at: DateTime<Utc>,
    },
    Edited {
        command: &'static str,
        dirty: bool,
        primary_image_url: Option<String>,
        at: DateTime<Utc>,
    },
    EditRejected {
        command: &'static str,
        notice: Notice,
    },
    UploadProgress {
        progress: UploadProgress,
        at: DateTime<Utc>,
    },
    Submitted {
        product_id: ProductId,
        created: bool,
        at: DateTime<Utc>,
    },
    SubmissionFailed {
        reason: String,
        at: DateTime<Utc>,
    },
    Cancelled {
        at: DateTime<Utc>,
    },
}

impl Event for EditorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EditorEvent::HydrationStarted { .. } => "editor.hydration.started",
            EditorEvent::BaselineCaptured { .. } => "editor.baseline.captured",
            EditorEvent::Edited { .. } => "editor.edited",
            EditorEvent::EditRejected { .. } => "editor.edit.rejected",
            EditorEvent::UploadProgress { .. } => "editor.upload.progress",
            EditorEvent::Submitted { .. } => "editor.submitted",
            EditorEvent::SubmissionFailed { .. } => "editor.submission.failed",
            EditorEvent::Cancelled { .. } => "editor.cancelled",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EditorEvent::EditRejected { notice, .. } => notice.issued_at,
            EditorEvent::HydrationStarted { at, .. }
            | EditorEvent::BaselineCaptured { at, .. }
            | EditorEvent::Edited { at, .. }
            | EditorEvent::UploadProgress { at, .. }
            | EditorEvent::Submitted { at, .. }
            | EditorEvent::SubmissionFailed { at, .. }
            | EditorEvent::Cancelled { at } => *at,
        }
    }
}

pub type EditorEnvelope = EventEnvelope<EditorEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_ttl() {
        let now = Utc::now();
        let notice = Notice::new("nope", now, Duration::milliseconds(4000));

        assert!(!notice.is_expired(now));
        assert!(!notice.is_expired(now + Duration::milliseconds(3999)));
        assert!(notice.is_expired(now + Duration::milliseconds(4000)));
    }

    #[test]
    fn rejected_event_is_timestamped_by_its_notice() {
        let now = Utc::now();
        let event = EditorEvent::EditRejected {
            command: "toggle_sales_channel",
            notice: Notice::new("last channel", now, Duration::seconds(4)),
        };
        assert_eq!(event.event_type(), "editor.edit.rejected");
        assert_eq!(event.occurred_at(), now);
    }
}
