//! Reusable UI components

pub mod auth_component;
pub mod dialog_component;
pub mod dialogs;
pub mod sidebar_component;
pub mod status_bar;
pub mod task_card;
pub mod task_form;
pub mod task_list_component;
pub mod text_input;

pub use auth_component::AuthComponent;
pub use dialog_component::DialogComponent;
pub use sidebar_component::SidebarComponent;
pub use status_bar::StatusBar;
pub use task_card::TaskCard;
pub use task_form::TaskForm;
pub use task_list_component::TaskListComponent;
pub use text_input::TextInput;
