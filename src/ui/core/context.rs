use std::sync::Arc;

use crate::{auth::AuthService, config::Config, logger::Logger, notify::Notifier, sync::SyncService};

/// Services shared by the views
#[derive(Clone)]
pub struct AppContext {
    pub sync_service: SyncService,
    pub auth: AuthService,
    pub notifier: Arc<dyn Notifier>,
    pub config: Config,
    pub logger: Logger,
}

impl AppContext {
    pub fn new(
        sync_service: SyncService,
        auth: AuthService,
        notifier: Arc<dyn Notifier>,
        config: Config,
        logger: Logger,
    ) -> Self {
        Self {
            sync_service,
            auth,
            notifier,
            config,
            logger,
        }
    }
}
