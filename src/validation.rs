//! Form validation for the login, sign-up and task forms.
//!
//! Each validator returns a per-field error struct; a form may be submitted
//! only when [`is_valid`](LoginErrors::is_valid) holds.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::{TaskDraft, TaskStatus};
use crate::constants::MIN_PASSWORD_LENGTH;
use crate::utils::datetime;

static EMAIL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").ok());

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl LoginErrors {
    pub fn is_valid(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SignUpErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl SignUpErrors {
    pub fn is_valid(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskFormErrors {
    pub title: Option<&'static str>,
    pub description: Option<&'static str>,
    pub start_date: Option<&'static str>,
    pub end_date: Option<&'static str>,
}

impl TaskFormErrors {
    pub fn is_valid(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// First error in field order, for a one-line summary
    pub fn first(&self) -> Option<&'static str> {
        self.title.or(self.description).or(self.start_date).or(self.end_date)
    }
}

fn looks_like_email(email: &str) -> bool {
    match EMAIL_PATTERN.as_ref() {
        Some(re) => re.is_match(email),
        None => email.contains('@'),
    }
}

pub fn validate_login(email: &str, password: &str) -> LoginErrors {
    let email_error = if email.is_empty() {
        Some("Email is required")
    } else if !looks_like_email(email) {
        Some("Email is invalid")
    } else {
        None
    };

    let password_error = if password.is_empty() {
        Some("Password is required")
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        Some("Password must be at least 6 characters")
    } else {
        None
    };

    LoginErrors {
        email: email_error,
        password: password_error,
    }
}

pub fn validate_sign_up(name: &str, email: &str, password: &str) -> SignUpErrors {
    SignUpErrors {
        name: name.trim().is_empty().then_some("Name is required."),
        email: (!email.contains('@')).then_some("Invalid email address."),
        password: (password.chars().count() < MIN_PASSWORD_LENGTH).then_some("Password must be at least 6 characters."),
    }
}

/// Raw task form contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFormInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub status: TaskStatus,
}

fn required_date(raw: &str, missing: &'static str) -> Result<NaiveDate, &'static str> {
    if raw.trim().is_empty() {
        return Err(missing);
    }
    datetime::parse_date(raw).map_err(|_| "Use the YYYY-MM-DD format")
}

/// Validate the task form and build the draft to submit
pub fn validate_task_form(input: &TaskFormInput<'_>) -> Result<TaskDraft, TaskFormErrors> {
    let mut errors = TaskFormErrors {
        title: input.title.trim().is_empty().then_some("Title is required"),
        description: input.description.trim().is_empty().then_some("Description is required"),
        ..TaskFormErrors::default()
    };

    let start = required_date(input.start_date, "Start date is required");
    let end = required_date(input.end_date, "End date is required");
    if let Err(e) = start {
        errors.start_date = Some(e);
    }
    if let Err(e) = end {
        errors.end_date = Some(e);
    }
    if let (Ok(start), Ok(end)) = (start, end) {
        if end < start {
            errors.end_date = Some("End date cannot be before start date");
        }
    }

    if !errors.is_valid() {
        return Err(errors);
    }

    Ok(TaskDraft {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        start_date: start.ok(),
        end_date: end.ok(),
        status: input.status,
    })
}
