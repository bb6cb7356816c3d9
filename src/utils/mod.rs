//! Utility modules for the taskdeck application.
//!
//! - [`datetime`] - Task date parsing, formatting, and the serde adapter for
//!   optional dates

pub mod datetime;
