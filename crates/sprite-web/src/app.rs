//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::components::{AppContext, Navbar, Toaster};
use crate::pages::{DashboardPage, HomePage, LoginPage, PricingPage, SignupPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let app = AppContext::new();
    provide_context(app);
    app.refresh_account();

    view! {
        <Router>
            <Navbar />
            <Toaster />
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/pricing") view=PricingPage />
                    <Route path=path!("/login") view=LoginPage />
                    <Route path=path!("/signup") view=SignupPage />
                    <Route path=path!("/dashboard") view=DashboardPage />
                </Routes>
            </main>
        </Router>
    }
}
