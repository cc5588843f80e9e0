//! Page Components

mod dashboard;
mod home;
mod login;
mod pricing;
mod signup;

pub use dashboard::DashboardPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use pricing::PricingPage;
pub use signup::SignupPage;
