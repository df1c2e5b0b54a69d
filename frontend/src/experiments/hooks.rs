use std::rc::Rc;

use yew::prelude::*;

use super::assignment::{Experiment, VariantResolver};
use super::identity::VisitorIdentityStore;
use super::storage::BrowserStorage;
use super::tracker::{EventSink, ExposureLatch, Tracker};
use crate::analytics::AnalyticsClient;

pub type SharedTracker = Rc<Tracker<Rc<dyn EventSink>>>;

// Overrides the browser tracker for everything below a `ContextProvider`.
#[derive(Clone)]
pub struct TrackerHandle(pub SharedTracker);

impl PartialEq for TrackerHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn browser_visitor_id() -> String {
    let storage = BrowserStorage::local();
    VisitorIdentityStore::new(&storage).visitor_id()
}

pub fn browser_tracker() -> Tracker<AnalyticsClient> {
    Tracker::new(AnalyticsClient::from_config(), browser_visitor_id())
}

fn shared_browser_tracker() -> SharedTracker {
    let sink: Rc<dyn EventSink> = Rc::new(AnalyticsClient::from_config());
    Rc::new(Tracker::new(sink, browser_visitor_id()))
}

// One tracker per mount, so all events from a component share a visitor id
// even when storage can't keep one.
#[hook]
pub fn use_tracker() -> SharedTracker {
    let injected = use_context::<TrackerHandle>();
    let tracker = use_memo(
        move |_| injected.map_or_else(shared_browser_tracker, |handle| handle.0),
        (),
    );
    (*tracker).clone()
}

#[hook]
pub fn use_assigned_variant(experiment: &Experiment) -> String {
    let experiment = experiment.clone();
    let variant = use_state(move || {
        let storage = BrowserStorage::local();
        VariantResolver::new(&storage).assign(&experiment)
    });
    (*variant).clone()
}

#[hook]
pub fn use_variant_tracking(tracker: &SharedTracker, experiment_id: &str, variant_id: &str) {
    let latch = use_mut_ref(ExposureLatch::default);
    let tracker = tracker.clone();
    let experiment_id = experiment_id.to_string();
    let variant_id = variant_id.to_string();

    use_effect(move || {
        tracker.record_exposure_once(&latch.borrow(), &experiment_id, &variant_id);
        || ()
    });
}

// Callback takes `(label, placement)`.
#[hook]
pub fn use_cta_tracking(
    tracker: &SharedTracker,
    experiment_id: &str,
    variant_id: &str,
) -> Callback<(&'static str, &'static str)> {
    let tracker = tracker.clone();
    let experiment_id = experiment_id.to_string();
    let variant_id = variant_id.to_string();

    Callback::from(move |(label, placement): (&'static str, &'static str)| {
        tracker.record_cta_click(&experiment_id, &variant_id, label, placement);
    })
}
