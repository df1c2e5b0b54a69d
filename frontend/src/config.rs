
#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    "http://localhost:3001"  // Development URL when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    ""  // Production URL
}

pub fn lead_endpoint() -> String {
    format!("{}/api/lead", get_backend_url())
}

pub fn analytics_endpoint() -> String {
    format!("{}/api/analytics/events", get_backend_url())
}

/// How long success/error feedback stays on a form before it returns to idle.
pub const FEEDBACK_RESET_MS: u32 = 3_000;

pub const VISITOR_ID_KEY: &str = "visitor_id";
pub const ASSIGNMENTS_KEY: &str = "experiment_assignments";

pub const CONTACT_HREF: &str = "/#contact";

pub const RESOURCES_SOURCE: &str = "resources-page";
