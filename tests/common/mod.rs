#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;
use url::Url;

use slug_redirector::config::{CachePolicy, Config, DEFAULT_FALLBACK_BASE};
use slug_redirector::domain::access_event::AccessEvent;
use slug_redirector::domain::entities::{
    HistoryAction, LinkHistoryEntry, LinkMutation, LinkRecord, LinkUpsert,
};
use slug_redirector::domain::repositories::LinkRepository;
use slug_redirector::error::AppError;
use slug_redirector::infrastructure::cache::{CacheService, MemoryCache};
use slug_redirector::routes::router;
use slug_redirector::state::AppState;

pub const SLACK_SECRET: &str = "test-signing-secret";
pub const ADMIN_ID: &str = "UADMIN";

/// In-memory link store counting lookups, with a switch to simulate outages.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<String, LinkRecord>>,
    versions: Mutex<HashMap<String, i32>>,
    history: Mutex<Vec<LinkHistoryEntry>>,
    next_id: AtomicI64,
    find_calls: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a link without recording history.
    pub fn seed(&self, slug: &str, destination: &str) -> LinkRecord {
        let now = Utc::now();
        let record = LinkRecord::new(
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            slug.to_string(),
            destination.to_string(),
            0,
            None,
            now,
            now,
        );
        self.links.lock().insert(slug.to_string(), record.clone());
        record
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, slug: &str) -> Option<LinkRecord> {
        self.links.lock().get(slug).cloned()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "Database error",
                json!({ "reason": "connection refused" }),
            ));
        }
        Ok(())
    }

    fn next_version(&self, slug: &str) -> i32 {
        let mut versions = self.versions.lock();
        let version = versions.entry(slug.to_string()).or_insert(0);
        *version += 1;
        *version
    }

    fn append_history(
        &self,
        slug: &str,
        version: i32,
        action: HistoryAction,
        destination: &str,
        actor: Option<String>,
    ) {
        self.history.lock().push(LinkHistoryEntry {
            slug: slug.to_string(),
            version,
            action,
            destination: destination.to_string(),
            actor,
            changed_at: Utc::now(),
        });
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<LinkRecord>, AppError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.get(slug))
    }

    async fn upsert(&self, upsert: LinkUpsert) -> Result<LinkMutation, AppError> {
        self.check_available()?;

        let version = self.next_version(&upsert.slug);
        let now = Utc::now();

        let (record, action) = {
            let mut links = self.links.lock();
            match links.get_mut(&upsert.slug) {
                Some(existing) => {
                    existing.destination = upsert.destination.clone();
                    if upsert.notes.is_some() {
                        existing.notes = upsert.notes.clone();
                    }
                    existing.updated_at = now;
                    (existing.clone(), HistoryAction::Updated)
                }
                None => {
                    let record = LinkRecord::new(
                        self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                        upsert.slug.clone(),
                        upsert.destination.clone(),
                        0,
                        upsert.notes.clone(),
                        now,
                        now,
                    );
                    links.insert(upsert.slug.clone(), record.clone());
                    (record, HistoryAction::Created)
                }
            }
        };

        self.append_history(
            &upsert.slug,
            version,
            action,
            &upsert.destination,
            upsert.actor,
        );

        Ok(LinkMutation {
            record,
            action,
            version,
        })
    }

    async fn delete(
        &self,
        slug: &str,
        actor: Option<String>,
    ) -> Result<Option<LinkMutation>, AppError> {
        self.check_available()?;

        let Some(record) = self.links.lock().remove(slug) else {
            return Ok(None);
        };

        let version = self.next_version(slug);
        self.append_history(
            slug,
            version,
            HistoryAction::Deleted,
            &record.destination,
            actor,
        );

        Ok(Some(LinkMutation {
            record,
            action: HistoryAction::Deleted,
            version,
        }))
    }

    async fn history(&self, slug: &str, limit: i64) -> Result<Vec<LinkHistoryEntry>, AppError> {
        self.check_available()?;

        let mut entries: Vec<_> = self
            .history
            .lock()
            .iter()
            .filter(|e| e.slug == slug)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.version.cmp(&a.version));
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        cache_policy: CachePolicy::Lru { capacity: 100 },
        fallback_base_url: Url::parse(DEFAULT_FALLBACK_BASE).unwrap(),
        access_logging: true,
        bot_logging: false,
        access_queue_capacity: 100,
        access_worker_concurrency: 1,
        behind_proxy: false,
        force_https: false,
        slack_signing_secret: Some(SLACK_SECRET.to_string()),
        admin_user_ids: HashSet::from([ADMIN_ID.to_string()]),
        db_max_connections: 1,
        db_connect_timeout: 1,
        db_idle_timeout: 60,
        db_max_lifetime: 60,
    }
}

/// Everything a handler test needs to drive and observe the app.
pub struct TestApp {
    pub server: TestServer,
    pub repository: Arc<InMemoryLinkRepository>,
    pub cache: Arc<MemoryCache>,
    pub access_rx: mpsc::Receiver<AccessEvent>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_queue(config, 100)
    }

    pub fn with_queue(config: Config, queue_capacity: usize) -> Self {
        let repository = Arc::new(InMemoryLinkRepository::new());
        let cache = Arc::new(MemoryCache::lru(100));
        let (tx, access_rx) = mpsc::channel(queue_capacity);

        let state = AppState::new(
            repository.clone(),
            cache.clone() as Arc<dyn CacheService>,
            tx,
            Arc::new(config),
        );

        let app = router(state.clone()).layer(MockConnectInfoLayer);
        let server = TestServer::new(app).unwrap();

        Self {
            server,
            repository,
            cache,
            access_rx,
            state,
        }
    }

    /// Waits briefly for the next queued access event.
    pub async fn next_access_event(&mut self) -> Option<AccessEvent> {
        tokio::time::timeout(Duration::from_millis(200), self.access_rx.recv())
            .await
            .ok()
            .flatten()
    }
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
