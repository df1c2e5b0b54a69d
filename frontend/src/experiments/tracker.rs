use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Exposure,
    Conversion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub kind: EventKind,
    pub experiment_id: String,
    pub variant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    pub visitor_id: String,
    pub timestamp: DateTime<Utc>,
}

pub trait EventSink {
    fn send(&self, event: TrackingEvent);
}

impl<K: EventSink + ?Sized> EventSink for Rc<K> {
    fn send(&self, event: TrackingEvent) {
        (**self).send(event)
    }
}

// One latch per mount.
#[derive(Debug, Default)]
pub struct ExposureLatch {
    fired: Cell<bool>,
}

impl ExposureLatch {
    fn trip(&self) -> bool {
        !self.fired.replace(true)
    }
}

#[derive(Clone)]
pub struct Tracker<K: EventSink> {
    sink: K,
    visitor_id: String,
}

impl<K: EventSink> Tracker<K> {
    pub fn new(sink: K, visitor_id: impl Into<String>) -> Self {
        Self {
            sink,
            visitor_id: visitor_id.into(),
        }
    }

    pub fn record_exposure(&self, experiment_id: &str, variant_id: &str) {
        self.emit(EventKind::Exposure, experiment_id, variant_id, None, None);
    }

    pub fn record_exposure_once(&self, latch: &ExposureLatch, experiment_id: &str, variant_id: &str) -> bool {
        if !latch.trip() {
            return false;
        }
        self.record_exposure(experiment_id, variant_id);
        true
    }

    pub fn record_conversion(&self, experiment_id: &str, variant_id: &str, label: &str) {
        self.emit(EventKind::Conversion, experiment_id, variant_id, Some(label), None);
    }

    pub fn record_cta_click(&self, experiment_id: &str, variant_id: &str, label: &str, placement: &str) {
        self.emit(EventKind::Conversion, experiment_id, variant_id, Some(label), Some(placement));
    }

    fn emit(
        &self,
        kind: EventKind,
        experiment_id: &str,
        variant_id: &str,
        label: Option<&str>,
        placement: Option<&str>,
    ) {
        log::debug!("Tracking {:?} for {}/{}", kind, experiment_id, variant_id);
        self.sink.send(TrackingEvent {
            kind,
            experiment_id: experiment_id.to_string(),
            variant_id: variant_id.to_string(),
            label: label.map(str::to_string),
            placement: placement.map(str::to_string),
            visitor_id: self.visitor_id.clone(),
            timestamp: Utc::now(),
        });
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[test]
    fn one_mount_emits_one_exposure_across_rerenders() {
        let sink = RecordingSink::default();
        let tracker = Tracker::new(sink.clone(), "visitor-1");
        let latch = ExposureLatch::default();

        assert!(tracker.record_exposure_once(&latch, "hero", "B"));
        for _ in 0..5 {
            assert!(!tracker.record_exposure_once(&latch, "hero", "B"));
        }

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Exposure);
        assert_eq!(events[0].variant_id, "B");
        assert_eq!(events[0].visitor_id, "visitor-1");
    }

    #[test]
    fn remount_gets_a_fresh_exposure() {
        let sink = RecordingSink::default();
        let tracker = Tracker::new(sink.clone(), "visitor-1");
        tracker.record_exposure_once(&ExposureLatch::default(), "hero", "A");
        tracker.record_exposure_once(&ExposureLatch::default(), "hero", "A");
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn conversions_fire_per_action() {
        let sink = RecordingSink::default();
        let tracker = Tracker::new(sink.clone(), "visitor-1");
        tracker.record_cta_click("hero", "A", "Start Building Free", "hero");
        tracker.record_conversion("hero", "A", "Start Building Free");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == EventKind::Conversion));
        assert_eq!(events[0].placement.as_deref(), Some("hero"));
        assert_eq!(events[1].placement, None);
        assert_eq!(events[1].label.as_deref(), Some("Start Building Free"));
    }

    #[test]
    fn event_serializes_with_camel_case_fields() {
        let sink = RecordingSink::default();
        Tracker::new(sink.clone(), "v").record_exposure("hero", "C");
        let json = serde_json::to_value(&sink.events()[0]).unwrap();
        assert_eq!(json["kind"], "exposure");
        assert_eq!(json["experimentId"], "hero");
        assert_eq!(json["variantId"], "C");
        assert!(json.get("label").is_none());
    }
}
