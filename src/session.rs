use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{NaiveDateTime, Utc};
use moka::future::Cache;
use office::Caller;
use tracing::{debug, trace};
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "OASESSIONID";

/// Server-side record of a login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i32,
    pub username: String,
    pub created_at: NaiveDateTime,
}

/// In-memory session table; entries expire after the configured idle time.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(idle_timeout)
            .build();
        Self { sessions }
    }

    /// Opens a session for `caller` and returns its id.
    pub async fn create(&self, caller: &Caller) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            user_id: caller.user_id,
            username: caller.username.clone(),
            created_at: Utc::now().naive_utc(),
        };
        self.sessions.insert(id.clone(), session).await;
        debug!("Session opened for user {}", caller.user_id);
        id
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).await
    }

    pub async fn remove(&self, id: &str) {
        self.sessions.invalidate(id).await;
        trace!("Session removed");
    }
}

/// Reads the session id out of the `Cookie` request headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value establishing the session.
pub fn session_cookie(id: &str) -> HeaderValue {
    let cookie = format!("{}={}; HttpOnly; Path=/; SameSite=Lax", SESSION_COOKIE, id);
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| clear_session_cookie())
}

/// `Set-Cookie` value removing the session cookie from the browser.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("OASESSIONID=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}
