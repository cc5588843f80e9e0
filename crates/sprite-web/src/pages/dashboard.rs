//! Dashboard Page

use leptos::prelude::*;
use leptos_router::{
    NavigateOptions,
    hooks::{use_navigate, use_query_map},
};
use sprite_core::TierId;

use crate::api::Account;
use crate::components::use_app;

fn plan_name(account: &Account) -> String {
    if let Some(name) = account
        .subscription
        .as_ref()
        .and_then(|s| s.product_name.clone())
    {
        return name;
    }

    match account.plan.tier_id {
        TierId::Free => "Free".into(),
        TierId::Basic => "Basic".into(),
        TierId::Indie => "Indie".into(),
        TierId::Studio => "Studio".into(),
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();
    let query = use_query_map();

    // Signed-out visitors go to the login page once the session check is done
    Effect::new(move |_| {
        if app.session().needs_login() {
            navigate(
                "/login",
                NavigateOptions {
                    replace: true,
                    ..NavigateOptions::default()
                },
            );
        }
    });

    let checkout_done =
        move || query.with(|q| q.get("checkout").is_some_and(|v| v == "success"));

    view! {
        <div class="dashboard">
            {move || match app.account.get() {
                Some(account) => view! { <AccountSummary account=account /> }.into_any(),
                None => view! { <p class="loading">"Loading..."</p> }.into_any(),
            }}
            <Show when=checkout_done>
                <p class="checkout-success">
                    "Thanks for your purchase! Your plan and credits update as soon as Stripe confirms the payment."
                </p>
            </Show>
        </div>
    }
}

#[component]
fn AccountSummary(account: Account) -> impl IntoView {
    let name = account.display_name();
    let plan = plan_name(&account);
    let interval = account
        .subscription
        .is_some()
        .then(|| account.plan.interval.as_str());
    let renews = account
        .subscription
        .as_ref()
        .and_then(|s| s.current_period_end)
        .map(|end| end.format("%B %-d, %Y").to_string());
    let upgrade_label = if account.plan.tier_id == TierId::Free {
        "Upgrade plan"
    } else {
        "Change plan"
    };

    view! {
        <header class="dashboard-header">
            <h1>"Welcome, " {name}</h1>
        </header>

        <section class="plan-card">
            <h2>"Your plan"</h2>
            <p class="plan-name">
                {plan}
                {interval.map(|i| view! { <span class="plan-interval">" (" {i} ")"</span> })}
            </p>
            {renews.map(|date| view! { <p class="plan-renews">"Renews on " {date}</p> })}
            <a href="/pricing" class="btn btn-primary">{upgrade_label}</a>
        </section>
    }
}
