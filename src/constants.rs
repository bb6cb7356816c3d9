//! Constants used throughout the application
//!
//! This module centralizes user-facing messages, log strings, and layout values
//! so views and services report the same wording.

// Login status messages
pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const LOGIN_PASSWORD_UPDATE_REQUIRED: &str = "Password update required.";

// Sign-up messages
pub const SIGNUP_SUCCESS: &str = "Account created successfully! Please check your email to verify your account.";
pub const SIGNUP_FAILED_FALLBACK: &str = "An error occurred during sign up.";

// Login notification
pub const LOGIN_NOTIFICATION_TEMPLATE: &str = "User {} logged in successfully.";

// Success Messages
pub const SUCCESS_TASK_ADDED: &str = "Task added successfully!";
pub const SUCCESS_TASK_COMPLETED: &str = "Task marked as completed!";
pub const SUCCESS_TASK_STARTED: &str = "Task moved to in progress!";
pub const SUCCESS_TASK_REOPENED: &str = "Task moved back to pending!";
pub const SUCCESS_TASK_DELETED: &str = "Task deleted successfully!";
pub const SUCCESS_TASK_UPDATED: &str = "Task updated successfully!";
pub const SUCCESS_LOGGED_OUT: &str = "Signed out";

// Error Messages
pub const ERROR_NOT_AUTHENTICATED: &str = "User not authenticated";
pub const ERROR_NO_USER_ID: &str = "Unable to retrieve user ID";
pub const ERROR_TASK_NOT_FOUND: &str = "Task not found";
pub const ERROR_ADD_TASK_FAILED: &str = "Failed to add task";
pub const ERROR_UPDATE_TASK_FAILED: &str = "Failed to update task status";
pub const ERROR_DELETE_TASK_FAILED: &str = "Failed to delete task";
pub const ERROR_DICTATION_UNAVAILABLE: &str = "Dictation is not configured";

// Empty view placeholders
pub const EMPTY_PENDING: &str = "No pending tasks to display.";
pub const EMPTY_IN_PROGRESS: &str = "No In-Progress tasks to display.";
pub const EMPTY_COMPLETED: &str = "No completed tasks to display.";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const DIALOG_TITLE_DEBUG_LOGS: &str = "🔍 Logs - Press 'Esc', 'G' or 'q' to close";
pub const APP_TITLE: &str = "Task Manager";

// Timing
/// Seconds a success or error message stays on the status bar
pub const STATUS_MESSAGE_SECONDS: u64 = 3;
/// Delay before switching to the dashboard after a successful login
pub const LOGIN_REDIRECT_MILLIS: u64 = 1000;
/// Delay before switching to the login screen after a successful sign-up
pub const SIGNUP_REDIRECT_MILLIS: u64 = 3000;

// UI Layout Constants
/// Sidebar width in columns
pub const SIDEBAR_WIDTH: u16 = 26;
/// Lines of description shown on a task card
pub const CARD_DESCRIPTION_LINES: usize = 3;
/// Minimum password length accepted by the forms
pub const MIN_PASSWORD_LENGTH: usize = 6;
