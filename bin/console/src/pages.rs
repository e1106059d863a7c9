//! Page components for the application.
//!
//! Each page is a Leptos component that renders a specific route. The login
//! page is rendered by the session controller rather than by a route.

pub mod home;
pub mod login;
pub mod profile;
pub mod upgrade;

// Re-export all page components for convenient access
pub use home::HomePage;
pub use login::LoginPage;
pub use profile::ProfilePage;
pub use upgrade::UpgradePage;
