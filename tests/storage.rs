use chrono::NaiveDate;
use taskdeck::backend::{Task, TaskStatus};
use taskdeck::storage::LocalStorage;

fn sample(id: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {}", id),
        description: "Stored locally".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        end_date: None,
        status,
    }
}

#[tokio::test]
async fn test_store_and_load_tasks() {
    let storage = LocalStorage::in_memory().await.unwrap();

    storage.store_task("ada", &sample("1", TaskStatus::Pending)).await.unwrap();
    storage.store_task("ada", &sample("2", TaskStatus::Completed)).await.unwrap();

    let tasks = storage.load_tasks("ada").await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0], sample("1", TaskStatus::Pending));

    let completed = storage.load_tasks_with_status("ada", TaskStatus::Completed).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, "2");
}

#[tokio::test]
async fn test_store_task_overwrites() {
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.store_task("ada", &sample("1", TaskStatus::Pending)).await.unwrap();

    let mut moved = sample("1", TaskStatus::InProgress);
    moved.title = "Renamed".to_string();
    storage.store_task("ada", &moved).await.unwrap();

    let stored = storage.get_task("ada", "1").await.unwrap().unwrap();
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.status, TaskStatus::InProgress);
    assert_eq!(storage.load_tasks("ada").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_users_are_isolated() {
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.store_task("ada", &sample("1", TaskStatus::Pending)).await.unwrap();
    storage.store_task("grace", &sample("1", TaskStatus::Pending)).await.unwrap();

    assert!(storage.remove_task("ada", "1").await.unwrap());
    assert!(!storage.remove_task("ada", "1").await.unwrap());
    assert_eq!(storage.load_tasks("grace").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_replace_status_leaves_other_lists() {
    let storage = LocalStorage::in_memory().await.unwrap();
    storage.store_task("ada", &sample("1", TaskStatus::Pending)).await.unwrap();
    storage.store_task("ada", &sample("2", TaskStatus::Completed)).await.unwrap();

    let fresh = vec![sample("3", TaskStatus::Pending), sample("4", TaskStatus::Pending)];
    storage
        .store_tasks_for_status("ada", TaskStatus::Pending, &fresh)
        .await
        .unwrap();

    let pending: Vec<String> = storage
        .load_tasks_with_status("ada", TaskStatus::Pending)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(pending, vec!["3", "4"]);
    assert!(storage.get_task("ada", "2").await.unwrap().is_some());

    storage.clear_user("ada").await.unwrap();
    assert!(storage.load_tasks("ada").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_database_file_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("tasks.db");

    {
        let storage = LocalStorage::open(&path).await.unwrap();
        storage.store_task("ada", &sample("1", TaskStatus::Pending)).await.unwrap();
    }

    let reopened = LocalStorage::open(&path).await.unwrap();
    assert_eq!(reopened.load_tasks("ada").await.unwrap().len(), 1);
}
