use chrono::Utc;
use gloo_timers::callback::Timeout;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::analytics::{AnalyticsClient, ResourceRequest, SubmitError};
use crate::config;
use crate::experiments::hooks::browser_tracker;
use crate::leads::capture::{AttemptId, Attribution, LeadCapture, SubmissionState, SubmitOutcome};

pub const LEAD_EXPERIMENT_ID: &str = "resources-lead-capture";
pub const LEAD_VARIANT_ID: &str = "control";

pub struct LeadMagnet {
    pub title: &'static str,
    pub description: &'static str,
    pub benefit: &'static str,
    pub kind: &'static str,
    pub download: &'static str,
}

pub const LEAD_MAGNETS: &[LeadMagnet] = &[
    LeadMagnet {
        title: "AI Agent Architecture Guide",
        description: "Complete blueprint for designing multi-agent systems. Covers tool integration, memory, and swarm patterns.",
        benefit: "Build production-ready agents in 1/3 the time",
        kind: "Guide",
        download: "agent-architecture-guide",
    },
    LeadMagnet {
        title: "Agentic Workflow Template",
        description: "End-to-end workflow template for autonomous agents. Includes error handling, retries, and monitoring.",
        benefit: "Deploy agents that actually stay reliable",
        kind: "Template",
        download: "agentic-workflow-template",
    },
    LeadMagnet {
        title: "Multi-Agent Coordination Framework",
        description: "Orchestration patterns for 2-100 agents. Manager, worker, and swarm topologies.",
        benefit: "Scale from solo agent to 100-agent swarms",
        kind: "Framework",
        download: "multi-agent-framework",
    },
    LeadMagnet {
        title: "Agent Testing & Validation Checklist",
        description: "27-point checklist to validate agent behavior before production deployment.",
        benefit: "Catch failures before they cost you",
        kind: "Checklist",
        download: "agent-validation-checklist",
    },
    LeadMagnet {
        title: "Tool Integration Patterns",
        description: "How to safely integrate 10+ external tools with agents. Best practices from production deployments.",
        benefit: "Connect agents to anything safely",
        kind: "Patterns",
        download: "tool-integration-patterns",
    },
    LeadMagnet {
        title: "Agent Monitoring & Observability",
        description: "Setup guide for tracking agent performance, errors, and cost. Includes dashboards and alerts.",
        benefit: "Know what your agents are actually doing",
        kind: "Guide",
        download: "agent-monitoring-guide",
    },
];

pub enum ResourcesMsg {
    SetEmail(String),
    Download(ResourceRequest),
    Submitted(AttemptId, Result<(), SubmitError>),
    ResetFeedback(AttemptId),
}

pub struct Resources {
    lead: LeadCapture<AnalyticsClient>,
    client: AnalyticsClient,
    // Dropping the handle cancels the pending reset.
    reset_timer: Option<Timeout>,
}

impl Resources {
    fn schedule_reset(&mut self, ctx: &Context<Self>, attempt: AttemptId) {
        let link = ctx.link().clone();
        self.reset_timer = Some(Timeout::new(config::FEEDBACK_RESET_MS, move || {
            link.send_message(ResourcesMsg::ResetFeedback(attempt));
        }));
    }

    fn render_feedback(&self) -> Html {
        match self.lead.state() {
            SubmissionState::Success => html! {
                <p class="success-message">{"Check your email for the download link!"}</p>
            },
            SubmissionState::Error => {
                let message = self
                    .lead
                    .error()
                    .map_or("Please enter a valid email address.", |e| e.user_message());
                html! { <p class="error-message">{message}</p> }
            }
            SubmissionState::Idle | SubmissionState::Submitting => html! {},
        }
    }

    fn render_magnet(&self, ctx: &Context<Self>, item: &LeadMagnet) -> Html {
        let download = item.download;
        let onclick = ctx
            .link()
            .callback(move |_: MouseEvent| ResourcesMsg::Download(ResourceRequest::Single(download.to_string())));

        html! {
            <div class="resource-card">
                <div class="resource-card-header">
                    <span class="resource-kind">{item.kind}</span>
                </div>
                <h3>{item.title}</h3>
                <p class="resource-description">{item.description}</p>
                <div class="resource-benefit">
                    <p>{"💡 "}{item.benefit}</p>
                </div>
                <button class="resource-download" {onclick} disabled={self.lead.is_busy()}>
                    {"Download Free"}
                </button>
            </div>
        }
    }
}

impl Component for Resources {
    type Message = ResourcesMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let attribution = Attribution {
            experiment_id: LEAD_EXPERIMENT_ID.to_string(),
            variant_id: LEAD_VARIANT_ID.to_string(),
        };
        Self {
            lead: LeadCapture::new(browser_tracker(), attribution, config::RESOURCES_SOURCE),
            client: AnalyticsClient::from_config(),
            reset_timer: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ResourcesMsg::SetEmail(email) => {
                self.lead.set_email(email);
                true
            }
            ResourcesMsg::Download(resource) => match self.lead.request_submit(resource, Utc::now()) {
                SubmitOutcome::Ignored => false,
                SubmitOutcome::Rejected(attempt) => {
                    self.schedule_reset(ctx, attempt);
                    true
                }
                SubmitOutcome::Dispatch(pending) => {
                    self.reset_timer = None;
                    let client = self.client.clone();
                    ctx.link().send_future(async move {
                        let result = client.submit_lead(&pending.record).await;
                        ResourcesMsg::Submitted(pending.attempt, result)
                    });
                    true
                }
            },
            ResourcesMsg::Submitted(attempt, result) => match self.lead.complete(attempt, result) {
                Some(_) => {
                    self.schedule_reset(ctx, attempt);
                    true
                }
                None => false,
            },
            ResourcesMsg::ResetFeedback(attempt) => {
                let reset = self.lead.reset(attempt);
                if reset {
                    self.reset_timer = None;
                }
                reset
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let oninput = ctx.link().callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            ResourcesMsg::SetEmail(input.value())
        });
        let download_all = ctx
            .link()
            .callback(|_: MouseEvent| ResourcesMsg::Download(ResourceRequest::All));
        let busy = self.lead.is_busy();

        html! {
            <main class="resources-page">
                <section class="resources-hero">
                    <h1>{"AI Agent Development Resources"}</h1>
                    <p class="hero-subtitle">
                        {"The templates and frameworks we use to build production AI agents. Used by 500+ teams building autonomous systems."}
                    </p>
                    <p class="resources-note">
                        {"Covers architecture, testing, monitoring, and scaling. Learn what separates working prototypes from production systems."}
                    </p>
                </section>

                <section class="email-capture">
                    <h2>{"Get All Resources Free"}</h2>
                    <p>{"Enter your email to download instantly. No credit card required."}</p>
                    <div class="email-capture-row">
                        <input
                            type="email"
                            placeholder="your@email.com"
                            value={self.lead.email().to_string()}
                            {oninput}
                        />
                        <button onclick={download_all} disabled={busy}>
                            { if busy { "Sending..." } else { "Download Now" } }
                        </button>
                    </div>
                    { self.render_feedback() }
                </section>

                <section class="resources-grid">
                    { for LEAD_MAGNETS.iter().map(|item| self.render_magnet(ctx, item)) }
                </section>

                <section class="trust-signals">
                    <h3>{"Trusted by AI Teams"}</h3>
                    <div class="trust-grid">
                        <div><p class="trust-number">{"500+"}</p><p>{"Teams Using Our Framework"}</p></div>
                        <div><p class="trust-number">{"1000+"}</p><p>{"Production Agents Built"}</p></div>
                        <div><p class="trust-number">{"99.9%"}</p><p>{"Uptime Achievement"}</p></div>
                    </div>
                    <a href={config::CONTACT_HREF} class="trust-cta">
                        {"Ready to Build? Schedule a Project Call →"}
                    </a>
                </section>
            </main>
        }
    }
}
