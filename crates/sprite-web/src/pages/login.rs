//! Login Page

use leptos::{ev::SubmitEvent, prelude::*, task::spawn_local};
use leptos_router::{NavigateOptions, hooks::use_navigate};
use sprite_core::{FormErrors, LoginForm, Notice};

use crate::api;
use crate::components::{AuthLayout, FieldError, use_app};

#[component]
pub fn LoginPage() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (errors, set_errors) = signal(FormErrors::new());
    let (loading, set_loading) = signal(false);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if loading.get() {
            return;
        }

        let form = LoginForm {
            email: email.get(),
            password: password.get(),
        };
        if let Err(field_errors) = form.validate() {
            set_errors.set(field_errors);
            return;
        }
        set_errors.set(FormErrors::new());
        set_loading.set(true);

        let navigate = navigate.clone();
        spawn_local(async move {
            match api::login(&form).await {
                Ok(_) => {
                    app.notify(Notice::success("Logged in successfully"));
                    app.load_account().await;
                    navigate("/dashboard", NavigateOptions::default());
                }
                Err(e) => {
                    app.notify(Notice::from_message(e.message.as_deref(), "Failed to login"));
                    set_loading.set(false);
                }
            }
        });
    };

    view! {
        <AuthLayout title="Welcome back" subtitle="Sign in to your account">
            <form class="auth-form" on:submit=submit>
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
                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                </button>
            </form>
            <p class="auth-switch">
                "Don't have an account? " <a href="/signup">"Sign up"</a>
            </p>
        </AuthLayout>
    }
}
