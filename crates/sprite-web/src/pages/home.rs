//! Home Page

use leptos::prelude::*;

use crate::components::use_app;

#[component]
pub fn HomePage() -> impl IntoView {
    let app = use_app();
    let signed_in = move || app.account.with(Option::is_some);
    let cta_href = move || if signed_in() { "/dashboard" } else { "/signup" };
    let cta_label = move || if signed_in() { "Go to dashboard" } else { "Start for free" };

    view! {
        <div class="home">
            <header class="hero">
                <h1>"Sprite Sheet Generator"</h1>
                <p class="tagline">"Turn frames into game-ready sprite sheets in seconds"</p>
                <div class="cta">
                    <a href=cta_href class="btn btn-primary">{cta_label}</a>
                    <a href="/pricing" class="btn">"View Plans"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"🎞️ Pack"</h3>
                    <p>"Drop in frames or a video clip and get a tightly packed atlas."</p>
                </div>
                <div class="feature">
                    <h3>"🎮 Export"</h3>
                    <p>"JSON metadata ready for Unity, Godot, Phaser and friends."</p>
                </div>
                <div class="feature">
                    <h3>"⚡ Credits"</h3>
                    <p>"Every plan includes monthly credits. Top up with a credit pack anytime."</p>
                </div>
            </section>
        </div>
    }
}
