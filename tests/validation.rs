use chrono::NaiveDate;
use taskdeck::backend::TaskStatus;
use taskdeck::validation::{validate_login, validate_sign_up, validate_task_form, TaskFormInput};

fn form<'a>(start_date: &'a str, end_date: &'a str) -> TaskFormInput<'a> {
    TaskFormInput {
        title: "  Write report ",
        description: "Quarterly numbers",
        start_date,
        end_date,
        status: TaskStatus::InProgress,
    }
}

#[test]
fn test_login_validation() {
    assert!(validate_login("ada@example.com", "secret1").is_valid());

    let errors = validate_login("", "");
    assert_eq!(errors.email, Some("Email is required"));
    assert_eq!(errors.password, Some("Password is required"));

    let errors = validate_login("ada@example", "12345");
    assert_eq!(errors.email, Some("Email is invalid"));
    assert_eq!(errors.password, Some("Password must be at least 6 characters"));
}

#[test]
fn test_sign_up_validation() {
    assert!(validate_sign_up("Ada", "ada@example.com", "secret1").is_valid());

    let errors = validate_sign_up("   ", "ada.example.com", "short");
    assert_eq!(errors.name, Some("Name is required."));
    assert_eq!(errors.email, Some("Invalid email address."));
    assert_eq!(errors.password, Some("Password must be at least 6 characters."));
}

#[test]
fn test_task_form_builds_trimmed_draft() {
    let draft = validate_task_form(&form("2024-06-01", "2024-06-07")).unwrap();

    assert_eq!(draft.title, "Write report");
    assert_eq!(draft.status, TaskStatus::InProgress);
    assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2024, 6, 7));
}

#[test]
fn test_task_form_allows_same_day_range() {
    assert!(validate_task_form(&form("2024-06-01", "2024-06-01")).is_ok());
}

#[test]
fn test_task_form_rejects_bad_dates() {
    let errors = validate_task_form(&form("", "06/07/2024")).unwrap_err();
    assert_eq!(errors.start_date, Some("Start date is required"));
    assert_eq!(errors.end_date, Some("Use the YYYY-MM-DD format"));

    let errors = validate_task_form(&form("2024-06-07", "2024-06-01")).unwrap_err();
    assert_eq!(errors.start_date, None);
    assert_eq!(errors.end_date, Some("End date cannot be before start date"));
    assert_eq!(errors.first(), Some("End date cannot be before start date"));
}

#[test]
fn test_task_form_requires_text() {
    let input = TaskFormInput {
        title: " ",
        description: "",
        start_date: "2024-06-01",
        end_date: "2024-06-02",
        status: TaskStatus::Pending,
    };

    let errors = validate_task_form(&input).unwrap_err();
    assert_eq!(errors.first(), Some("Title is required"));
    assert_eq!(errors.description, Some("Description is required"));
}
