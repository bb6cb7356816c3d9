//! Local storage module for task persistence
//!
//! This module provides SeaORM database operations for:
//! - The local task store used by the `local` backend
//! - The optional on-disk mirror of the task cache

pub mod db;
pub mod tasks;

pub use db::LocalStorage;
