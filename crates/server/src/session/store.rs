use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use symptom_core::Session;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

/// Cookie carrying the session ID
pub const SESSION_COOKIE: &str = "symptom_session";

struct Entry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// In-memory session map shared by all requests.
///
/// Each session sits behind its own mutex; a handler holds it for the whole
/// action so one visitor never has two assessments in flight.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

/// The current request's session, inserted by [`session_middleware`]
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    session: Arc<Mutex<Session>>,
}

impl SessionHandle {
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `id`, or start a fresh session under a new ID when it is
    /// missing or unknown. The flag is true for a new session.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (SessionHandle, bool) {
        let mut sessions = self.inner.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                let handle = SessionHandle {
                    id,
                    session: Arc::clone(&entry.session),
                };
                return (handle, false);
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new()));
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!("Session created");
        (SessionHandle { id, session }, true)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drop sessions idle for at least `idle`. Sessions with a request in
    /// progress are kept.
    pub async fn evict_idle(&self, idle: Duration) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            Arc::strong_count(&entry.session) > 1 || entry.last_seen.elapsed() < idle
        });
        before - sessions.len()
    }

    /// Periodically evict idle sessions until the runtime shuts down
    pub fn spawn_sweeper(&self, idle: Duration, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(idle).await;
                if evicted > 0 {
                    tracing::info!(evicted = evicted, "Evicted idle sessions");
                }
            }
        })
    }
}

/// Read the session ID from the `Cookie` header, if present and well-formed
fn session_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::try_parse(value.trim()).ok())
}

/// Middleware that attaches a [`SessionHandle`] to every request and sets
/// the session cookie when a new session was started
pub async fn session_middleware(
    State(store): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    let (handle, created) = store.get_or_create(session_id_from(request.headers())).await;
    let id = handle.id;
    request.extensions_mut().insert(handle);

    let mut response = next.run(request).await;

    if created {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}
