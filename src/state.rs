//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{AdminService, RedirectResolver};
use crate::config::Config;
use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Cheaply cloneable state shared by all request tasks.
///
/// The resolver and the admin service share one cache instance, so an
/// administrative write invalidates exactly the entries redirects read from.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RedirectResolver>,
    pub admin_service: Arc<AdminService>,
    pub access_sender: mpsc::Sender<AccessEvent>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        access_sender: mpsc::Sender<AccessEvent>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            resolver: Arc::new(RedirectResolver::new(repository.clone(), cache.clone())),
            admin_service: Arc::new(AdminService::new(repository, cache)),
            access_sender,
            config,
        }
    }
}
