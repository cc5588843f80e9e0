//! UI Components

use std::time::Duration;

use leptos::{prelude::*, task::spawn_local};
use leptos_router::{NavigateOptions, hooks::use_navigate};
use sprite_core::{FormErrors, Notice, SessionState};

use crate::api::{self, Account};

const NOTICE_DURATION: Duration = Duration::from_secs(4);

/// State shared by every page
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Signed-in account, `None` when signed out or not loaded yet
    pub account: RwSignal<Option<Account>>,

    /// Cleared while an account lookup is in flight
    pub account_checked: RwSignal<bool>,

    pub notice: RwSignal<Option<Notice>>,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            account: RwSignal::new(None),
            account_checked: RwSignal::new(false),
            notice: RwSignal::new(None),
        }
    }

    /// Show a toast; it clears itself unless replaced in the meantime
    pub fn notify(self, notice: Notice) {
        self.notice.set(Some(notice.clone()));
        let slot = self.notice;
        set_timeout(
            move || {
                slot.update(|current| {
                    if current.as_ref() == Some(&notice) {
                        *current = None;
                    }
                });
            },
            NOTICE_DURATION,
        );
    }

    /// Reload the signed-in account from the server
    pub async fn load_account(self) {
        self.account_checked.set(false);
        let account = match api::current_account().await {
            Ok(account) => account,
            Err(e) => {
                leptos::logging::warn!("account lookup failed: {:?}", e.message);
                None
            }
        };
        self.account.set(account);
        self.account_checked.set(true);
    }

    /// Background [`Self::load_account`]; the session reads as checking right away
    pub fn refresh_account(self) {
        self.account_checked.set(false);
        spawn_local(self.load_account());
    }

    pub fn session(self) -> SessionState {
        SessionState::new(
            self.account_checked.get(),
            self.account.with(Option::is_some),
        )
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

/// Transient success / error message
#[component]
pub fn Toaster() -> impl IntoView {
    let app = use_app();

    move || {
        app.notice.get().map(|notice| {
            let class = if notice.is_error() {
                "toast toast-error"
            } else {
                "toast toast-success"
            };
            view! {
                <div class=class role="status" on:click=move |_| app.notice.set(None)>
                    {notice.message}
                </div>
            }
        })
    }
}

#[component]
pub fn Navbar() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();

    let logout = move |_| {
        let navigate = navigate.clone();
        spawn_local(async move {
            api::logout().await;
            app.account.set(None);
            app.notify(Notice::success("Logged out"));
            navigate("/", NavigateOptions::default());
        });
    };

    view! {
        <nav class="navbar">
            <a href="/" class="brand">"Sprite Sheet Generator"</a>
            <div class="nav-links">
                <a href="/pricing">"Pricing"</a>
                {move || match app.account.get() {
                    Some(account) => {
                        let initials = account
                            .profile
                            .as_ref()
                            .map(|p| p.initials())
                            .unwrap_or_else(|| "U".into());
                        view! {
                            <a href="/dashboard">"Dashboard"</a>
                            <span class="avatar" title=account.display_name()>{initials}</span>
                            <button class="btn btn-link" on:click=logout.clone()>"Log out"</button>
                        }
                            .into_any()
                    }
                    None => {
                        view! {
                            <a href="/login">"Sign in"</a>
                            <a href="/signup" class="btn btn-primary">"Get started"</a>
                        }
                            .into_any()
                    }
                }}
            </div>
        </nav>
    }
}

/// Centered card used by the login and signup pages
#[component]
pub fn AuthLayout(title: &'static str, subtitle: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="auth-layout">
            <div class="auth-card">
                <h1>{title}</h1>
                <p class="subtitle">{subtitle}</p>
                {children()}
            </div>
        </div>
    }
}

/// Validation message of one form field
#[component]
pub fn FieldError(errors: ReadSignal<FormErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors
            .with(|e| e.get(field).map(str::to_string))
            .map(|message| view! { <p class="field-error">{message}</p> })
    }
}
