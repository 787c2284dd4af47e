use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::file_store::FileStore;
use crate::services::pdf::PdfRenderer;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    papers: FileStore,
    diagrams: FileStore,
    renderer: Arc<dyn PdfRenderer>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        renderer: Arc<dyn PdfRenderer>,
    ) -> Self {
        let papers = FileStore::new(&settings.storage().papers_dir);
        let diagrams = FileStore::new(&settings.storage().diagrams_dir);
        Self { inner: Arc::new(InnerState { settings, db, redis, papers, diagrams, renderer }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn papers(&self) -> &FileStore {
        &self.inner.papers
    }

    pub(crate) fn diagrams(&self) -> &FileStore {
        &self.inner.diagrams
    }

    pub(crate) fn renderer(&self) -> &dyn PdfRenderer {
        self.inner.renderer.as_ref()
    }
}
