//! taskdeck - a terminal task manager
//!
//! Tasks live behind a hosted REST API (or a local SQLite store) and are
//! grouped into Pending, In Progress and Completed lists. Users sign in
//! through an identity provider, get a login notification, and can dictate
//! task titles and descriptions.
//!
//! # Modules
//!
//! * [`auth`] - Sign-up, sign-in and session handling
//! * [`backend`] - Task backends (REST API and local store)
//! * [`config`] - Application configuration management
//! * [`notify`] - Login notifications
//! * [`speech`] - Streaming dictation
//! * [`storage`] - Local database and data persistence
//! * [`sync`] - Task cache and operations shared by the views
//! * [`ui`] - Terminal user interface components
//! * [`utils`] - Utility functions and helpers

/// Identity provider client and session management
pub mod auth;

/// Request signing and credentials for AWS services
pub mod aws;

/// Backend abstraction over where tasks are stored
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and user-facing messages
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Logging utilities for debugging and error tracking
pub mod logger;

/// Login notification publishing
pub mod notify;

/// Repository layer for database operations
pub mod repositories;

/// Speech capture and transcription
pub mod speech;

/// Local storage layer for the task database
pub mod storage;

/// Task cache and operations
pub mod sync;

/// Terminal user interface components and rendering
pub mod ui;

/// Utility functions for date handling
pub mod utils;

/// Form validation rules
pub mod validation;
