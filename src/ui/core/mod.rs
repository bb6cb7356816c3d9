//! Core UI functionality for the taskdeck application.
//!
//! This module contains the building blocks every view shares: the action
//! vocabulary, the component trait, the service context, terminal event
//! polling, and the background task manager.
//!
//! # Module Components
//!
//! - [`actions`] - Action definitions and UI state transitions
//! - [`component`] - Base component trait
//! - [`context`] - Services shared by the views
//! - [`event_handler`] - Keyboard and resize polling
//! - [`task_manager`] - Background operations reporting back as actions
//!
//! # Architecture
//!
//! Components turn key events into [`Action`]s. The app component performs
//! the ones that need services by spawning work on the [`TaskManager`], which
//! sends its results back through an unbounded channel drained on every tick.

pub mod actions;
pub mod component;
pub mod context;
pub mod event_handler;
pub mod task_manager;

pub use actions::{Action, DialogType, FormField, Screen};
pub use component::Component;
pub use context::AppContext;
pub use event_handler::{EventHandler, EventType};
pub use task_manager::{TaskId, TaskManager};
