mod common;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use std::sync::Arc;
use std::time::Duration;

use common::{signed_in_auth, task, MemoryBackend, StubProvider, EMAIL};
use taskdeck::auth::AuthService;
use taskdeck::backend::{Task, TaskStatus};
use taskdeck::config::Config;
use taskdeck::constants::{EMPTY_COMPLETED, LOGIN_FAILED, SUCCESS_TASK_ADDED, SUCCESS_TASK_COMPLETED, SUCCESS_TASK_DELETED};
use taskdeck::logger::Logger;
use taskdeck::notify::NoopNotifier;
use taskdeck::sync::SyncService;
use taskdeck::ui::core::{Action, AppContext, Component, EventType, Screen};
use taskdeck::ui::AppComponent;

const WIDTH: u16 = 100;
const HEIGHT: u16 = 32;

async fn dashboard(tasks: Vec<Task>) -> (AppComponent, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::with_tasks(tasks));
    let auth = signed_in_auth().await;
    let sync = SyncService::new(backend.clone(), auth.clone(), None);
    sync.refresh_all().await.unwrap();
    let cached = sync.all_tasks().await;

    let ctx = AppContext::new(sync, auth, Arc::new(NoopNotifier), Config::default(), Logger::new());
    let mut app = AppComponent::new(ctx, Screen::Dashboard);
    app.set_tasks(cached);
    (app, backend)
}

fn render(app: &mut AppComponent) -> String {
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    terminal.draw(|f| app.render(f, f.area())).unwrap();

    let buffer = terminal.backend().buffer();
    (0..HEIGHT)
        .map(|y| (0..WIDTH).map(|x| buffer[(x, y)].symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

async fn press(app: &mut AppComponent, code: KeyCode) {
    app.handle_event(EventType::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .await
        .unwrap();
}

async fn type_text(app: &mut AppComponent, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c)).await;
    }
}

/// Feed background results back into the app until `done` holds
async fn settle(app: &mut AppComponent, done: impl Fn(&AppComponent) -> bool) {
    for _ in 0..200 {
        for action in app.process_background_actions() {
            app.dispatch(action).await;
        }
        if done(app) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("background work did not finish");
}

#[tokio::test]
async fn test_empty_completed_list_shows_placeholder() {
    let (mut app, _backend) = dashboard(vec![task("1", "Draft", TaskStatus::Pending)]).await;

    app.dispatch(Action::NavigateToView(TaskStatus::Completed)).await;

    assert_eq!(app.view(), TaskStatus::Completed);
    let screen = render(&mut app);
    assert!(screen.contains(EMPTY_COMPLETED));
    assert!(screen.contains("Completed (0)"));
    assert!(!screen.contains("Draft"));
}

#[tokio::test]
async fn test_pending_list_renders_cards() {
    let (mut app, _backend) = dashboard(vec![
        task("1", "Write report", TaskStatus::Pending),
        task("2", "Ship release", TaskStatus::Completed),
    ])
    .await;

    let screen = render(&mut app);

    assert!(screen.contains("Pending (1)"));
    assert!(screen.contains("▶ Write report"));
    assert!(screen.contains("[Pending]"));
    assert!(!screen.contains("Ship release"));
    assert!(screen.contains(EMAIL));
}

#[tokio::test]
async fn test_sidebar_keys_switch_lists() {
    let (mut app, _backend) = dashboard(vec![task("1", "Ship release", TaskStatus::Completed)]).await;

    press(&mut app, KeyCode::Char('3')).await;

    assert_eq!(app.view(), TaskStatus::Completed);
    assert!(render(&mut app).contains("Ship release"));
}

#[tokio::test]
async fn test_adding_through_the_form_creates_one_pending_task() {
    let (mut app, backend) = dashboard(vec![task("1", "Existing", TaskStatus::Pending)]).await;

    press(&mut app, KeyCode::Char('a')).await;
    assert!(app.dialog().is_task_form());

    type_text(&mut app, "Write report").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "Quarterly numbers").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "2024-06-01").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "2024-06-07").await;
    press(&mut app, KeyCode::Enter).await;

    assert!(!app.dialog().is_visible());
    settle(&mut app, |app| app.tasks().len() == 2).await;

    assert_eq!(app.status_message(), Some((SUCCESS_TASK_ADDED, false)));
    let added: Vec<_> = app.tasks().iter().filter(|t| t.title == "Write report").collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].status, TaskStatus::Pending);
    assert_eq!(backend.tasks.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_form_errors_keep_the_dialog_open() {
    let (mut app, _backend) = dashboard(Vec::new()).await;

    press(&mut app, KeyCode::Char('a')).await;
    press(&mut app, KeyCode::Enter).await;

    assert!(app.dialog().is_task_form());
    assert!(render(&mut app).contains("Title is required"));
}

#[tokio::test]
async fn test_completing_moves_task_to_completed_list() {
    let (mut app, backend) = dashboard(vec![task("1", "Draft", TaskStatus::Pending)]).await;

    press(&mut app, KeyCode::Char('c')).await;

    // The list updates before the request finishes
    assert!(render(&mut app).contains("Pending (0)"));

    settle(&mut app, |app| app.status_message().is_some()).await;
    assert_eq!(app.status_message(), Some((SUCCESS_TASK_COMPLETED, false)));
    assert_eq!(backend.tasks.lock().unwrap()[0].status, TaskStatus::Completed);

    app.dispatch(Action::NavigateToView(TaskStatus::Completed)).await;
    assert!(render(&mut app).contains("Draft"));
}

#[tokio::test]
async fn test_delete_after_confirmation() {
    let (mut app, backend) = dashboard(vec![
        task("1", "Draft", TaskStatus::Pending),
        task("2", "Keep", TaskStatus::InProgress),
    ])
    .await;

    press(&mut app, KeyCode::Char('d')).await;
    assert!(render(&mut app).contains("Draft"));
    press(&mut app, KeyCode::Char('y')).await;

    settle(&mut app, |app| app.tasks().len() == 1).await;
    assert_eq!(app.status_message(), Some((SUCCESS_TASK_DELETED, false)));
    assert!(app.tasks().iter().all(|t| t.id != "1"));
    assert_eq!(backend.tasks.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_login_shows_message_and_stays_signed_out() {
    let auth = AuthService::new(Arc::new(StubProvider::new()), None);
    let sync = SyncService::new(Arc::new(MemoryBackend::default()), auth.clone(), None);
    let ctx = AppContext::new(sync, auth.clone(), Arc::new(NoopNotifier), Config::default(), Logger::new());
    let mut app = AppComponent::new(ctx, Screen::Login);

    type_text(&mut app, EMAIL).await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "wrong-password").await;
    press(&mut app, KeyCode::Enter).await;

    settle(&mut app, |app| app.active_task_count() == 0).await;
    // One more pass picks up the completion sent just before the task ended
    for action in app.process_background_actions() {
        app.dispatch(action).await;
    }

    assert_eq!(app.screen(), Screen::Login);
    assert!(!auth.is_authenticated());
    assert!(render(&mut app).contains(LOGIN_FAILED));
}

#[tokio::test]
async fn test_quit_key() {
    let (mut app, _backend) = dashboard(Vec::new()).await;

    press(&mut app, KeyCode::Char('q')).await;
    assert!(app.should_quit());
}
