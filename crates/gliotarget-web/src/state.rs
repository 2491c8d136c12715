//! Shared application state for the web server.

use std::sync::{Arc, Mutex};

use gliotarget_common::ApiError;
use gliotarget_db::{Database, Session};
use minijinja::Environment;

use crate::config::Config;
use crate::render;

/// Shared state injected into every Axum handler.
///
/// The server assumes a single user: there is one [`Session`] for all
/// clients, so a notice recorded by one request is shown to whichever
/// page renders next.
pub struct AppState {
    pub db: Arc<Database>,
    /// Session context handed to every render; never touched outside a
    /// blocking task.
    pub session: Arc<Mutex<Session>>,
    pub config: Config,
    pub templates: Environment<'static>,
}

impl AppState {
    /// Open the configured store and ensure its schema.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let db = Database::open(&config.database.path)?;
        db.initialize()?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> anyhow::Result<Self> {
        let db = Arc::new(db);
        Ok(Self {
            session: Arc::new(Mutex::new(Session::new(db.clone()))),
            db,
            config,
            templates: render::environment()?,
        })
    }

    /// Run `f` against the session on the blocking pool.
    pub async fn with_session<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Session) -> T + Send + 'static,
        T: Send + 'static,
    {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = session
                .lock()
                .map_err(|_| ApiError::Internal("session lock poisoned".to_string()))?;
            Ok(f(&mut guard))
        })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
    }

    /// Run a gateway call on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(Arc<Database>) -> gliotarget_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(db).map_err(ApiError::from))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
    }
}

pub type SharedState = Arc<AppState>;
