use anyhow::{Context, Result};
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

use crate::entities::task;

/// Local SQLite storage accessed through SeaORM
pub struct LocalStorage {
    pub(crate) conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open (or create) the database file at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory: {}", parent.display()))?;
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        info!("💾 Opening task database at {}", path.display());
        Self::connect(ConnectOptions::new(url)).await
    }

    /// In-memory database, used by tests and when persistence is off
    pub async fn in_memory() -> Result<Self> {
        // Every pooled connection would get its own empty memory database
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);
        Self::connect(options).await
    }

    async fn connect(mut options: ConnectOptions) -> Result<Self> {
        options.sqlx_logging(false);
        let url = options.get_url().to_string();
        let conn = Database::connect(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", url))?;

        let storage = LocalStorage { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create tables from the entity definitions
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut create_tasks = schema.create_table_from_entity(task::Entity);
        create_tasks.if_not_exists();

        self.conn
            .execute(backend.build(&create_tasks))
            .await
            .context("Failed to create tasks table")?;

        Ok(())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
