//! Pricing Page

use leptos::{prelude::*, task::spawn_local};
use leptos_router::{NavigateOptions, hooks::use_navigate};
use sprite_core::{
    BillingInterval, CreditPack, CreditPackAction, Notice, PricingPageView, PricingTier,
    PurchaseMode, TierAction, format_price, tier_price_label,
};

use crate::api;
use crate::components::{AppContext, use_app};

/// Page-wide purchase state: the price id whose checkout is being created
#[derive(Clone, Copy)]
struct Checkout {
    app: AppContext,
    pending: RwSignal<Option<String>>,
    authenticated: bool,
}

impl Checkout {
    fn is_pending(self, price_id: &str) -> bool {
        self.pending.with(|p| p.as_deref() == Some(price_id))
    }

    /// Send signed-out visitors to login, everyone else to Stripe
    fn start(self, price_id: String, mode: PurchaseMode, navigate: impl Fn(&str, NavigateOptions)) {
        if !self.authenticated {
            navigate("/login", NavigateOptions::default());
            return;
        }
        if self.pending.with(Option::is_some) {
            return;
        }

        let app = self.app;
        self.pending.set(Some(price_id.clone()));
        let pending = self.pending;

        spawn_local(async move {
            match api::create_checkout(&price_id, mode).await {
                Ok(url) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href(&url);
                    }
                }
                Err(e) => {
                    leptos::logging::error!("checkout for {price_id} failed: {:?}", e.message);
                    app.notify(Notice::from_message(
                        e.message.as_deref(),
                        "Something went wrong",
                    ));
                    pending.set(None);
                }
            }
        });
    }
}

#[component]
pub fn PricingPage() -> impl IntoView {
    let (view_data, set_view_data) = signal(None::<Result<PricingPageView, String>>);
    let interval = RwSignal::new(BillingInterval::Monthly);

    spawn_local(async move {
        let loaded = api::fetch_pricing().await.map_err(|e| {
            e.message
                .unwrap_or_else(|| "Could not load pricing".into())
        });
        if let Ok(view) = &loaded {
            interval.set(view.initial_interval);
        }
        set_view_data.set(Some(loaded));
    });

    view! {
        <div class="pricing">
            <h1>"Pricing"</h1>
            <p class="subtitle">"Pick a plan, or top up with credits whenever you need them"</p>

            <BillingToggle interval=interval />

            {move || match view_data.get() {
                None => view! { <p class="loading">"Loading plans..."</p> }.into_any(),
                Some(Err(message)) => view! { <p class="error">{message}</p> }.into_any(),
                Some(Ok(page)) => view! { <PricingContent page=page interval=interval /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn BillingToggle(interval: RwSignal<BillingInterval>) -> impl IntoView {
    let yearly = move || interval.get() == BillingInterval::Yearly;

    view! {
        <div class="billing-toggle">
            <span class:active=move || !yearly()>"Monthly"</span>
            <button
                type="button"
                role="switch"
                class="switch"
                aria-checked=move || yearly().to_string()
                on:click=move |_| interval.update(|i| *i = i.toggled())
            >
                <span class="knob" class:on=yearly></span>
            </button>
            <span class:active=yearly>"Yearly" <em class="save">"Save up to 15%"</em></span>
        </div>
    }
}

#[component]
fn PricingContent(page: PricingPageView, interval: RwSignal<BillingInterval>) -> impl IntoView {
    let checkout = Checkout {
        app: use_app(),
        pending: RwSignal::new(None),
        authenticated: page.authenticated,
    };
    let page = StoredValue::new(page);

    let tiers = move || {
        page.with_value(|page| {
            page.tiers
                .iter()
                .map(|tier| {
                    let action = page.tier_action(tier, interval.get());
                    view! {
                        <TierCard
                            tier=tier.clone()
                            interval=interval.get()
                            action=action
                            checkout=checkout
                        />
                    }
                })
                .collect_view()
        })
    };

    let packs = page.with_value(|page| {
        page.credit_packs
            .iter()
            .map(|pack| {
                let action = page.credit_pack_action(pack);
                view! { <CreditPackCard pack=pack.clone() action=action checkout=checkout /> }
            })
            .collect_view()
    });

    view! {
        <div class="plans">{tiers}</div>

        <section class="credit-packs">
            <h2>"Credit packs"</h2>
            <p class="subtitle">"One-time top-ups that never expire"</p>
            <div class="packs">{packs}</div>
        </section>
    }
}

#[component]
fn TierCard(
    tier: PricingTier,
    interval: BillingInterval,
    action: TierAction,
    checkout: Checkout,
) -> impl IntoView {
    let navigate = use_navigate();
    let price = tier.price(interval).clone();
    let amount = tier_price_label(price.amount);
    let discount = (interval == BillingInterval::Yearly)
        .then_some(price.discount)
        .flatten()
        .map(|d| view! { <span class="discount">"Save " {d} "%"</span> });
    let class = if tier.popular { "plan featured" } else { "plan" };

    let label = action.label().to_string();
    let button = match action {
        TierAction::Link { href, .. } => view! { <a href=href class="btn">{label}</a> }.into_any(),
        TierAction::CurrentPlan => {
            view! { <button class="btn" disabled=true>{label}</button> }.into_any()
        }
        TierAction::ChangePlan { price_id } | TierAction::Subscribe { price_id } => {
            let busy = {
                let price_id = price_id.clone();
                move || checkout.is_pending(&price_id)
            };
            let disabled = busy.clone();
            view! {
                <button
                    class="btn btn-primary"
                    disabled=disabled
                    on:click=move |_| {
                        checkout.start(price_id.clone(), PurchaseMode::Subscription, navigate.clone())
                    }
                >
                    {move || if busy() { "Redirecting...".to_string() } else { label.clone() }}
                </button>
            }
                .into_any()
        }
    };

    view! {
        <div class=class>
            {tier.popular.then(|| view! { <span class="badge">"Popular"</span> })}
            <h2>{tier.name}</h2>
            <p class="description">{tier.description}</p>
            <div class="price">{amount} <span>"/" {interval.suffix()}</span></div>
            {discount}
            <p class="credits">{tier.credits} " credits / month"</p>
            <ul>
                {tier.features.into_iter().map(|f| view! { <li>{f}</li> }).collect_view()}
            </ul>
            {button}
        </div>
    }
}

#[component]
fn CreditPackCard(pack: CreditPack, action: CreditPackAction, checkout: Checkout) -> impl IntoView {
    let navigate = use_navigate();
    let label = action.label();

    let button = match action {
        CreditPackAction::SignIn => view! { <a href="/login" class="btn">{label}</a> }.into_any(),
        CreditPackAction::Unavailable => {
            view! { <button class="btn" disabled=true>{label}</button> }.into_any()
        }
        CreditPackAction::Purchase { price_id } => {
            let busy = {
                let price_id = price_id.clone();
                move || checkout.is_pending(&price_id)
            };
            let disabled = busy.clone();
            view! {
                <button
                    class="btn btn-primary"
                    disabled=disabled
                    on:click=move |_| {
                        checkout.start(price_id.clone(), PurchaseMode::Payment, navigate.clone())
                    }
                >
                    {move || if busy() { "Redirecting..." } else { label }}
                </button>
            }
                .into_any()
        }
    };

    view! {
        <div class="pack">
            <h3>{pack.name}</h3>
            <p class="description">{pack.description}</p>
            <div class="price">{format_price(pack.price)}</div>
            <p class="credits">{pack.credits} " credits"</p>
            {button}
        </div>
    }
}
