use yew::prelude::*;
use yew_router::prelude::*;
use crate::Route;
use crate::components::hero::HeroMessage;

#[function_component]
pub fn Home() -> Html {
    html! {
        <div class="landing-page">
            <HeroMessage />

            <section class="features">
                <h2>{"From Prototype to Production Agents"}</h2>
                <p>{"We design, build, and operate AI agents that hold up under real traffic."}</p>
                <div class="features-grid">
                    <div class="feature-item">
                        <h3>{"Agent Architecture"}</h3>
                        <p>{"Multi-agent systems with tool use, memory, and clear failure boundaries."}</p>
                    </div>
                    <div class="feature-item">
                        <h3>{"Workflow Automation"}</h3>
                        <p>{"Autonomous workflows with retries, monitoring, and human checkpoints."}</p>
                    </div>
                    <div class="feature-item">
                        <h3>{"Observability"}</h3>
                        <p>{"Know what your agents are doing, what they cost, and when they fail."}</p>
                    </div>
                </div>
            </section>

            <section id="contact" class="contact">
                <h2>{"Not ready for a call yet?"}</h2>
                <p>{"Start with the guides and templates we use on client projects."}</p>
                <Link<Route> to={Route::Resources} classes="forward-link">
                    {"Browse Free Resources"}
                </Link<Route>>
            </section>
        </div>
    }
}
