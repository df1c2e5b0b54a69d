use yew::prelude::*;

use crate::experiments::assignment::Experiment;
use crate::experiments::hooks::{use_assigned_variant, use_cta_tracking, use_tracker, use_variant_tracking};

pub const HERO_EXPERIMENT_ID: &str = "agentic-dev-hero-message";

pub fn hero_experiment() -> Experiment {
    Experiment::from_static(HERO_EXPERIMENT_ID, &["A", "B", "C"])
}

struct HeroCopy {
    class: &'static str,
    headline: &'static str,
    body: &'static str,
    cta: &'static str,
    fine_print: &'static str,
    icon: &'static str,
    tagline: &'static str,
}

fn copy_for(variant: &str) -> HeroCopy {
    match variant {
        // Speed/benefit focused
        "B" => HeroCopy {
            class: "hero-message-variant-b",
            headline: "Ship Features 3x Faster with AI",
            body: "Your engineering team moves 3x faster. Reduce development cycles from months to weeks. AI handles the heavy lifting, you ship the value.",
            cta: "Get Your API Key",
            fine_print: "Free tier includes $100 in credits. No credit card required.",
            icon: "🚀",
            tagline: "3x faster feature shipping",
        },
        // Capability/innovation focused
        "C" => HeroCopy {
            class: "hero-message-variant-c",
            headline: "Build Autonomous Agents in Hours",
            body: "Autonomous agents used to take months. Now build multi-agent systems with reasoning, tools, and memory, fully production-ready in hours.",
            cta: "Explore Autonomous Agents",
            fine_print: "Join 1,000+ builders. Free tier. No credit card.",
            icon: "🤖",
            tagline: "Autonomous agents in hours",
        },
        // Control
        _ => HeroCopy {
            class: "hero-message-variant-a",
            headline: "Rapid AI Development Platform",
            body: "Build production-grade AI applications in days, not months. Our platform handles infrastructure, fine-tuning, and deployment.",
            cta: "Start Building Free",
            fine_print: "Get $100 in free API credits. No credit card required.",
            icon: "⚡",
            tagline: "See the power of rapid AI development",
        },
    }
}

#[derive(Properties, PartialEq)]
pub struct HeroVariantProps {
    pub variant: AttrValue,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(HeroMessageVariant)]
pub fn hero_message_variant(props: &HeroVariantProps) -> Html {
    let variant: &str = &props.variant;
    let tracker = use_tracker();
    use_variant_tracking(&tracker, HERO_EXPERIMENT_ID, variant);
    let track_click = use_cta_tracking(&tracker, HERO_EXPERIMENT_ID, variant);
    let copy = copy_for(variant);

    let onclick = {
        let cta = copy.cta;
        Callback::from(move |_: MouseEvent| track_click.emit((cta, "hero")))
    };

    html! {
        <section class={classes!("hero-message", copy.class, props.class.clone())}>
            <div class="hero-message-grid">
                <div>
                    <h1>{copy.headline}</h1>
                    <p class="hero-subtitle">{copy.body}</p>
                    <button class="hero-cta" {onclick}>{copy.cta}</button>
                    <p class="hero-fine-print">{copy.fine_print}</p>
                </div>
                <div class="hero-visual">
                    <div class="hero-icon">{copy.icon}</div>
                    <p>{copy.tagline}</p>
                </div>
            </div>
        </section>
    }
}

#[function_component(HeroMessage)]
pub fn hero_message() -> Html {
    let experiment = use_memo(|_| hero_experiment(), ());
    let variant = use_assigned_variant(&experiment);

    html! { <HeroMessageVariant variant={AttrValue::from(variant)} /> }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_experiment_has_three_variants() {
        let experiment = hero_experiment();
        assert_eq!(experiment.id(), HERO_EXPERIMENT_ID);
        assert_eq!(experiment.variants(), ["A", "B", "C"]);
        assert_eq!(Experiment::new(HERO_EXPERIMENT_ID, ["A", "B", "C"]), Ok(experiment));
    }

    #[test]
    fn every_variant_has_distinct_copy() {
        let ctas: Vec<_> = hero_experiment()
            .variants()
            .iter()
            .map(|v| copy_for(v).cta)
            .collect();
        assert_eq!(ctas, ["Start Building Free", "Get Your API Key", "Explore Autonomous Agents"]);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use std::rc::Rc;

    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;

    use super::*;
    use crate::experiments::hooks::TrackerHandle;
    use crate::experiments::tracker::testing::RecordingSink;
    use crate::experiments::tracker::{EventKind, EventSink, Tracker};

    wasm_bindgen_test_configure!(run_in_browser);

    #[derive(Properties, PartialEq)]
    struct HarnessProps {
        handle: TrackerHandle,
    }

    // Re-renders the same mounted variant a few times by changing its class.
    #[function_component(Harness)]
    fn harness(props: &HarnessProps) -> Html {
        let renders = use_state(|| 0u32);
        {
            let renders = renders.clone();
            use_effect(move || {
                if *renders < 3 {
                    renders.set(*renders + 1);
                }
                || ()
            });
        }

        html! {
            <ContextProvider<TrackerHandle> context={props.handle.clone()}>
                <HeroMessageVariant variant="B" class={format!("render-{}", *renders)} />
            </ContextProvider<TrackerHandle>>
        }
    }

    #[wasm_bindgen_test]
    async fn rerendered_variant_reports_one_exposure() {
        let sink = RecordingSink::default();
        let shared: Rc<dyn EventSink> = Rc::new(sink.clone());
        let handle = TrackerHandle(Rc::new(Tracker::new(shared, "visitor-test")));

        let document = web_sys::window().unwrap().document().unwrap();
        let root = document.create_element("div").unwrap();
        document.body().unwrap().append_child(&root).unwrap();
        yew::Renderer::<Harness>::with_root_and_props(root.clone(), HarnessProps { handle }).render();

        TimeoutFuture::new(100).await;

        assert!(root.query_selector(".render-3").unwrap().is_some());
        let exposures: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.kind == EventKind::Exposure)
            .collect();
        assert_eq!(exposures.len(), 1);
        assert_eq!(exposures[0].variant_id, "B");
        assert_eq!(exposures[0].visitor_id, "visitor-test");
    }
}
