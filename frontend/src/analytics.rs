use chrono::{DateTime, SecondsFormat, Utc};
use gloo_net::http::Request;
use serde::{Serialize, Serializer};
use wasm_bindgen_futures::spawn_local;

use crate::config;
use crate::experiments::tracker::{EventSink, TrackingEvent};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {status}")]
    Server { status: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRequest {
    All,
    Single(String),
}

impl ResourceRequest {
    pub const ALL_SENTINEL: &'static str = "all";

    pub fn wire_id(&self) -> &str {
        match self {
            ResourceRequest::All => Self::ALL_SENTINEL,
            ResourceRequest::Single(id) => id,
        }
    }
}

impl Serialize for ResourceRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadRecord {
    pub email: String,
    pub resource: ResourceRequest,
    #[serde(rename = "source")]
    pub source_page: String,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

fn iso_millis<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn check_status(status: u16) -> Result<(), SubmitError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(SubmitError::Server { status })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsClient {
    lead_url: String,
    events_url: String,
}

impl AnalyticsClient {
    pub fn new(lead_url: impl Into<String>, events_url: impl Into<String>) -> Self {
        Self {
            lead_url: lead_url.into(),
            events_url: events_url.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::lead_endpoint(), config::analytics_endpoint())
    }

    // One POST, no retry.
    pub async fn submit_lead(&self, record: &LeadRecord) -> Result<(), SubmitError> {
        post_json(&self.lead_url, record).await
    }
}

impl EventSink for AnalyticsClient {
    fn send(&self, event: TrackingEvent) {
        // Failures are logged and dropped, never surfaced.
        let url = self.events_url.clone();
        spawn_local(async move {
            if let Err(e) = post_json(&url, &event).await {
                log::debug!("Dropped {:?} event for {}: {}", event.kind, event.experiment_id, e);
            }
        });
    }
}

async fn post_json<T: Serialize>(url: &str, body: &T) -> Result<(), SubmitError> {
    let request = Request::post(url)
        .json(body)
        .map_err(|e| SubmitError::Network(format!("could not encode request: {}", e)))?;
    let response = request
        .send()
        .await
        .map_err(|e| SubmitError::Network(e.to_string()))?;
    check_status(response.status())
}
