//! Signup Page

use leptos::{ev::SubmitEvent, prelude::*, task::spawn_local};
use leptos_router::{NavigateOptions, hooks::use_navigate};
use sprite_core::{FormErrors, Notice, SignupForm};

use crate::api;
use crate::components::{AuthLayout, FieldError, use_app};

#[component]
pub fn SignupPage() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();

    let (full_name, set_full_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (errors, set_errors) = signal(FormErrors::new());
    let (loading, set_loading) = signal(false);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if loading.get() {
            return;
        }

        let form = SignupForm {
            email: email.get(),
            password: password.get(),
            full_name: full_name.get(),
        };
        if let Err(field_errors) = form.validate() {
            set_errors.set(field_errors);
            return;
        }
        set_errors.set(FormErrors::new());
        set_loading.set(true);

        let navigate = navigate.clone();
        spawn_local(async move {
            match api::signup(&form).await {
                Ok(outcome) if outcome.session.is_some() => {
                    app.notify(Notice::success("Account created successfully"));
                    app.load_account().await;
                    navigate("/dashboard", NavigateOptions::default());
                }
                Ok(_) => {
                    app.notify(Notice::success(
                        "Account created. Check your email to confirm it, then sign in.",
                    ));
                    navigate("/login", NavigateOptions::default());
                }
                Err(e) => {
                    app.notify(Notice::from_message(
                        e.message.as_deref(),
                        "Failed to create account",
                    ));
                    set_loading.set(false);
                }
            }
        });
    };

    view! {
        <AuthLayout title="Create an account" subtitle="Start generating sprite sheets">
            <form class="auth-form" on:submit=submit>
                <label for="full-name">"Full name"</label>
                <input
                    id="full-name"
                    type="text"
                    placeholder="Ada Lovelace"
                    prop:value=move || full_name.get()
                    on:input=move |ev| set_full_name.set(event_target_value(&ev))
                />
                <FieldError errors=errors field="fullName" />

                <label for="email">"Email"</label>
                <input
                    id="email"
                    type="email"
                    placeholder="you@example.com"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <FieldError errors=errors field="email" />

                <label for="password">"Password"</label>
                <input
                    id="password"
                    type="password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <FieldError errors=errors field="password" />

                <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                    {move || if loading.get() { "Creating account..." } else { "Create account" }}
                </button>
            </form>
            <p class="auth-switch">
                "Already have an account? " <a href="/login">"Sign in"</a>
            </p>
        </AuthLayout>
    }
}
