use chrono::{DateTime, Utc};
use strum_macros::{AsRefStr, EnumString};

use crate::errors::error::{HarnessError, HarnessErrorKind, HarnessResult};

/// Lifecycle events a scenario can record. The vocabulary is closed so
/// assertions on event names are checked at compile time.
#[derive(Copy, Clone, Debug, AsRefStr, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum EventKind {
    Offered,
    Requested,
    Issued,
    Stored,
    Rejected,
    TimedOut,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<String>,
}

/// Append-only log of lifecycle events, owned by a single scenario.
/// Must be reset between scenarios so events never leak across tests.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<Event>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: EventKind) {
        self.record_correlated(kind, None);
    }

    pub fn record_correlated(&mut self, kind: EventKind, correlation_id: Option<String>) {
        trace!(
            "EventRecorder::record >>> kind: {}, correlation_id: {:?}",
            kind.as_ref(),
            correlation_id
        );
        self.events.push(Event {
            kind,
            timestamp: Utc::now(),
            correlation_id,
        });
    }

    /// Fails with an assertion error if no event of the given kind has
    /// been recorded. This is the primary user-visible pass/fail signal.
    pub fn assert_event(&self, kind: EventKind) -> HarnessResult<()> {
        if self.events.iter().any(|event| event.kind == kind) {
            Ok(())
        } else {
            Err(HarnessError::from_msg(
                HarnessErrorKind::Assertion,
                format!("event {} was not recorded", kind.as_ref()),
            ))
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|event| event.kind == kind).count()
    }

    pub fn reset(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_assert() {
        let mut recorder = EventRecorder::new();
        recorder.record(EventKind::Offered);
        recorder.record_correlated(EventKind::Issued, Some("offer-1".to_owned()));

        recorder.assert_event(EventKind::Offered).unwrap();
        recorder.assert_event(EventKind::Issued).unwrap();
        assert_eq!(recorder.count(EventKind::Issued), 1);
        assert_eq!(recorder.events()[1].correlation_id.as_deref(), Some("offer-1"));
    }

    #[test]
    fn test_assert_missing_event_fails() {
        let recorder = EventRecorder::new();
        let err = recorder.assert_event(EventKind::Stored).unwrap_err();
        assert_eq!(err.kind(), HarnessErrorKind::Assertion);
    }

    #[test]
    fn test_reset_clears_previously_recorded_events() {
        let mut recorder = EventRecorder::new();
        for kind in [EventKind::Offered, EventKind::Requested, EventKind::Stored] {
            recorder.record(kind);
        }
        recorder.reset();
        for kind in [EventKind::Offered, EventKind::Requested, EventKind::Stored] {
            let err = recorder.assert_event(kind).unwrap_err();
            assert_eq!(err.kind(), HarnessErrorKind::Assertion);
        }
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::TimedOut.as_ref(), "timed-out");
        assert_eq!(EventKind::Stored.as_ref(), "stored");
    }
}
