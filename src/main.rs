use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

use taskdeck::auth::{AuthService, CognitoProvider, SessionStore};
use taskdeck::backend::create_backend;
use taskdeck::config::Config;
use taskdeck::logger::Logger;
use taskdeck::notify::create_notifier;
use taskdeck::storage::LocalStorage;
use taskdeck::sync::SyncService;
use taskdeck::ui::core::{AppContext, Screen};

const USAGE: &str = "Usage: taskdeck [--generate-config [PATH]]";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--generate-config") => {
            let path = match args.get(1) {
                Some(path) => path.into(),
                None => Config::get_default_config_path()?,
            };
            return Config::generate_default_config(path);
        }
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("❌ Unknown argument: {}\n{}", other, USAGE);
            std::process::exit(2);
        }
        None => {}
    }

    let config = match Config::load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            eprintln!("\n💡 Run `taskdeck --generate-config` to write a default configuration file.");
            std::process::exit(1);
        }
    };

    let data_dir = Config::data_dir()?;
    let logger = Logger::from_config(&config.logging, &data_dir)?;

    let needs_database = config.storage.persist_cache || config.api.backend == "local";
    let storage = if needs_database {
        let path = data_dir.join(&config.storage.database_file);
        let storage = LocalStorage::open(&path).await.context("Failed to open task database")?;
        Some(Arc::new(Mutex::new(storage)))
    } else {
        None
    };

    let provider = CognitoProvider::from_config(&config.auth).context("Failed to set up sign-in")?;
    let store = config.auth.remember_session.then(|| SessionStore::in_dir(&data_dir));
    let auth = AuthService::new(Arc::new(provider), store);

    let notifier = create_notifier(&config.notifications, &config.aws);
    let backend = create_backend(&config.api, storage.clone())?;
    let mirror = if config.storage.persist_cache && config.api.backend != "local" {
        storage
    } else {
        None
    };
    let sync_service = SyncService::new(backend, auth.clone(), mirror);

    let screen = if auth.restore_session().await {
        if let Err(e) = sync_service.load_cached().await {
            log::warn!("⚠️  Could not load cached tasks: {:#}", e);
        }
        Screen::Dashboard
    } else {
        Screen::Signup
    };

    let ctx = AppContext::new(sync_service, auth, notifier, config, logger);
    taskdeck::ui::run_app(ctx, screen).await
}
