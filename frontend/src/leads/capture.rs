use chrono::{DateTime, Utc};

use crate::analytics::{LeadRecord, ResourceRequest, SubmitError};
use crate::experiments::tracker::{EventSink, Tracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("email is empty")]
    Empty,
    #[error("email address is malformed")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl LeadError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LeadError::Validation(_) => "Please enter a valid email address.",
            LeadError::Submit(SubmitError::Network(_)) => {
                "We couldn't reach the server. Check your connection and try again."
            }
            LeadError::Submit(SubmitError::Server { .. }) => {
                "Something went wrong on our side. Please try again."
            }
        }
    }
}

// Trimmed, non-empty, exactly one `@` with something on both sides.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(ValidationError::Empty);
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_string())
        }
        _ => Err(ValidationError::Malformed),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub attempt: AttemptId,
    pub record: LeadRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Ignored,
    Rejected(AttemptId),
    Dispatch(PendingSubmission),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub experiment_id: String,
    pub variant_id: String,
}

pub struct LeadCapture<K: EventSink> {
    tracker: Tracker<K>,
    attribution: Attribution,
    source_page: String,
    state: SubmissionState,
    email: String,
    error: Option<LeadError>,
    attempt: u64,
    requested: Option<ResourceRequest>,
}

impl<K: EventSink> LeadCapture<K> {
    pub fn new(tracker: Tracker<K>, attribution: Attribution, source_page: impl Into<String>) -> Self {
        Self {
            tracker,
            attribution,
            source_page: source_page.into(),
            state: SubmissionState::Idle,
            email: String::new(),
            error: None,
            attempt: 0,
            requested: None,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn error(&self) -> Option<&LeadError> {
        self.error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn request_submit(&mut self, resource: ResourceRequest, now: DateTime<Utc>) -> SubmitOutcome {
        if self.state == SubmissionState::Submitting {
            log::debug!("Ignoring lead submission while one is in flight");
            return SubmitOutcome::Ignored;
        }

        self.attempt += 1;
        let attempt = AttemptId(self.attempt);
        self.requested = Some(resource.clone());

        match validate_email(&self.email) {
            Err(e) => {
                self.fail(e.into());
                SubmitOutcome::Rejected(attempt)
            }
            Ok(email) => {
                self.state = SubmissionState::Submitting;
                self.error = None;
                SubmitOutcome::Dispatch(PendingSubmission {
                    attempt,
                    record: LeadRecord {
                        email,
                        resource,
                        source_page: self.source_page.clone(),
                        timestamp: now,
                    },
                })
            }
        }
    }

    // `None` when the result belongs to an attempt that is no longer current.
    pub fn complete(&mut self, attempt: AttemptId, result: Result<(), SubmitError>) -> Option<SubmissionState> {
        if !self.is_current(attempt) || self.state != SubmissionState::Submitting {
            log::debug!("Discarding stale lead result for {:?}", attempt);
            return None;
        }
        match result {
            Ok(()) => {
                self.state = SubmissionState::Success;
                self.error = None;
                self.email.clear();
                self.record_conversion();
            }
            Err(e) => {
                log::warn!("Lead submission failed: {}", e);
                self.fail(e.into());
            }
        }
        Some(self.state)
    }

    pub fn reset(&mut self, attempt: AttemptId) -> bool {
        if !self.is_current(attempt)
            || !matches!(self.state, SubmissionState::Success | SubmissionState::Error)
        {
            return false;
        }
        self.state = SubmissionState::Idle;
        self.error = None;
        true
    }

    fn is_current(&self, attempt: AttemptId) -> bool {
        attempt.0 == self.attempt
    }

    fn fail(&mut self, error: LeadError) {
        self.state = SubmissionState::Error;
        self.error = Some(error);
        self.record_conversion();
    }

    // The click is the conversion, whatever happened to the delivery.
    fn record_conversion(&self) {
        let resource = self.requested.as_ref().map_or("unknown", ResourceRequest::wire_id);
        self.tracker.record_conversion(
            &self.attribution.experiment_id,
            &self.attribution.variant_id,
            &format!("download:{}", resource),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::tracker::testing::RecordingSink;
    use crate::experiments::tracker::EventKind;

    fn controller() -> (LeadCapture<RecordingSink>, RecordingSink) {
        let sink = RecordingSink::default();
        let capture = LeadCapture::new(
            Tracker::new(sink.clone(), "visitor-1"),
            Attribution {
                experiment_id: "resources-lead-capture".into(),
                variant_id: "control".into(),
            },
            "resources-page",
        );
        (capture, sink)
    }

    fn guide() -> ResourceRequest {
        ResourceRequest::Single("agent-architecture-guide".into())
    }

    fn dispatch(capture: &mut LeadCapture<RecordingSink>) -> PendingSubmission {
        match capture.request_submit(guide(), Utc::now()) {
            SubmitOutcome::Dispatch(pending) => pending,
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    #[test]
    fn email_validation() {
        assert_eq!(validate_email("  a@b.com "), Ok("a@b.com".to_string()));
        assert_eq!(validate_email(""), Err(ValidationError::Empty));
        assert_eq!(validate_email("   "), Err(ValidationError::Empty));
        for bad in ["plain", "@b.com", "a@", "a@@b.com", "a@b@c.com", "@"] {
            assert_eq!(validate_email(bad), Err(ValidationError::Malformed), "{bad}");
        }
    }

    #[test]
    fn invalid_email_errors_without_dispatch() {
        for bad in ["", "   ", "no-at-sign", "a@", "@b.com"] {
            let (mut capture, _) = controller();
            capture.set_email(bad);
            let outcome = capture.request_submit(guide(), Utc::now());
            assert!(matches!(outcome, SubmitOutcome::Rejected(_)), "{bad}");
            assert_eq!(capture.state(), SubmissionState::Error);
            assert!(matches!(capture.error(), Some(LeadError::Validation(_))));
        }
    }

    #[test]
    fn successful_submission_clears_email_and_resets() {
        let (mut capture, sink) = controller();
        capture.set_email("a@b.com");

        let pending = dispatch(&mut capture);
        assert_eq!(capture.state(), SubmissionState::Submitting);
        assert_eq!(pending.record.email, "a@b.com");
        assert_eq!(pending.record.resource, guide());
        assert_eq!(pending.record.source_page, "resources-page");

        assert_eq!(capture.complete(pending.attempt, Ok(())), Some(SubmissionState::Success));
        assert_eq!(capture.email(), "");

        assert!(capture.reset(pending.attempt));
        assert_eq!(capture.state(), SubmissionState::Idle);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Conversion);
        assert_eq!(events[0].label.as_deref(), Some("download:agent-architecture-guide"));
    }

    #[test]
    fn server_error_keeps_email_and_resets() {
        let (mut capture, sink) = controller();
        capture.set_email("a@b.com");
        let pending = dispatch(&mut capture);

        let state = capture.complete(pending.attempt, Err(SubmitError::Server { status: 500 }));
        assert_eq!(state, Some(SubmissionState::Error));
        assert_eq!(capture.email(), "a@b.com");
        assert_eq!(
            capture.error().map(LeadError::user_message),
            Some("Something went wrong on our side. Please try again.")
        );

        assert!(capture.reset(pending.attempt));
        assert_eq!(capture.state(), SubmissionState::Idle);
        assert_eq!(capture.error(), None);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn second_request_while_submitting_is_ignored() {
        let (mut capture, _) = controller();
        capture.set_email("a@b.com");
        let pending = dispatch(&mut capture);

        assert_eq!(capture.request_submit(ResourceRequest::All, Utc::now()), SubmitOutcome::Ignored);
        assert_eq!(capture.state(), SubmissionState::Submitting);
        assert!(capture.is_busy());

        assert_eq!(capture.complete(pending.attempt, Ok(())), Some(SubmissionState::Success));
    }

    #[test]
    fn stale_reset_does_not_touch_a_newer_attempt() {
        let (mut capture, _) = controller();
        capture.set_email("a@b.com");
        let first = dispatch(&mut capture);
        capture.complete(first.attempt, Err(SubmitError::Network("offline".into())));

        let second = dispatch(&mut capture);
        assert!(!capture.reset(first.attempt));
        assert_eq!(capture.state(), SubmissionState::Submitting);
        assert_eq!(capture.complete(first.attempt, Ok(())), None);
        assert_eq!(capture.complete(second.attempt, Ok(())), Some(SubmissionState::Success));
    }

    #[test]
    fn late_result_after_reset_is_discarded() {
        let (mut capture, _) = controller();
        capture.set_email("a@b.com");
        let pending = dispatch(&mut capture);
        capture.complete(pending.attempt, Ok(()));
        capture.reset(pending.attempt);

        assert_eq!(capture.complete(pending.attempt, Err(SubmitError::Server { status: 502 })), None);
        assert_eq!(capture.state(), SubmissionState::Idle);
    }

    #[test]
    fn typing_during_feedback_does_not_reset() {
        let (mut capture, _) = controller();
        capture.set_email("a@b.com");
        let pending = dispatch(&mut capture);
        capture.complete(pending.attempt, Err(SubmitError::Network("offline".into())));

        capture.set_email("a@b.co");
        assert_eq!(capture.state(), SubmissionState::Error);
        assert!(capture.reset(pending.attempt));
    }

    #[test]
    fn all_resources_request_carries_the_sentinel() {
        let (mut capture, sink) = controller();
        capture.set_email("a@b.com");
        let pending = match capture.request_submit(ResourceRequest::All, Utc::now()) {
            SubmitOutcome::Dispatch(p) => p,
            other => panic!("expected dispatch, got {:?}", other),
        };
        assert_eq!(pending.record.resource.wire_id(), "all");
        capture.complete(pending.attempt, Ok(()));
        assert_eq!(sink.events()[0].label.as_deref(), Some("download:all"));
    }
}
