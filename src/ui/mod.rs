//! Terminal user interface.
//!
//! The login and sign-up screens plus the task dashboard, built from
//! components that turn key events into actions.

pub mod app_component;
pub mod components;
pub mod core;
pub mod layout;
pub mod renderer;

pub use app_component::AppComponent;
pub use layout::LayoutManager;
pub use renderer::run_app;
