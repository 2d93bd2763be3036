// Session store - The current view snapshot and what was rendered from it
use crate::application::projector::ProjectionCache;
use crate::application::view_state::ViewState;
use crate::domain::stats::Stats;
use crate::domain::telemetry::ChartData;
use tokio::sync::{Mutex, MutexGuard, RwLock};

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: ViewState,
    pub projection: ProjectionCache,
    pub stats: Option<Stats>,
    pub charts: Vec<ChartData>,
}

/// Snapshots are replaced wholesale; readers never see a half-applied update.
/// Writers go through [`SessionStore::writer`], one at a time.
pub struct SessionStore {
    inner: RwLock<Session>,
    write_lock: Mutex<()>,
}

/// Exclusive write access, held from reading the current session until the
/// next one is committed. Other writers wait; readers do not.
pub struct SessionWriter<'a> {
    store: &'a SessionStore,
    _lock: MutexGuard<'a, ()>,
}

impl SessionStore {
    pub fn new(state: ViewState) -> Self {
        Self {
            inner: RwLock::new(Session {
                state,
                ..Default::default()
            }),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn state(&self) -> ViewState {
        self.inner.read().await.state.clone()
    }

    pub async fn writer(&self) -> SessionWriter<'_> {
        let lock = self.write_lock.lock().await;
        SessionWriter { store: self, _lock: lock }
    }
}

impl SessionWriter<'_> {
    pub async fn snapshot(&self) -> Session {
        self.store.snapshot().await
    }

    pub async fn state(&self) -> ViewState {
        self.store.state().await
    }

    pub async fn commit(self, session: Session) {
        *self.store.inner.write().await = session;
    }
}
