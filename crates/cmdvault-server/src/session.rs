//! Server-tracked sessions and the authentication middleware.
//!
//! A session cookie is `<token>.<tag>` where the token is random and the tag
//! is an HMAC-SHA256 over it, so cookies are tamper-evident before the map
//! lookup even happens. The map itself lives in memory: a restart (or a
//! changed `SECRET_KEY`) logs everyone out.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tokio::sync::RwLock;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "cmdvault_session";

/// Authenticated user id, inserted into request extensions by the middleware.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

/// The raw cookie value of the current session, for logout.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SessionStore {
    key: Arc<Vec<u8>>,
    sessions: Arc<RwLock<HashMap<String, i64>>>,
}

impl SessionStore {
    /// `secret_key` is the operator-provided signing key; when absent a
    /// random per-process key is used.
    pub fn new(secret_key: Option<&str>) -> Self {
        let key = match secret_key {
            Some(k) => k.as_bytes().to_vec(),
            None => {
                let mut k = vec![0u8; 32];
                rand::thread_rng().fill_bytes(&mut k);
                k
            }
        };
        Self {
            key: Arc::new(key),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Establish a new session for `user_id` and return the cookie value.
    pub async fn create(&self, user_id: i64) -> String {
        let mut raw = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = URL_SAFE_NO_PAD.encode(raw);
        let tag = self.sign(&token);

        self.sessions.write().await.insert(token.clone(), user_id);
        format!("{token}.{tag}")
    }

    /// Resolve a cookie value to a user id, verifying the signature first.
    pub async fn user_for(&self, cookie_value: &str) -> Option<i64> {
        let (token, tag) = cookie_value.split_once('.')?;
        if !self.verify(token, tag) {
            return None;
        }
        self.sessions.read().await.get(token).copied()
    }

    /// End one session. Idempotent: revoking an unknown token is a no-op.
    pub async fn revoke(&self, cookie_value: &str) {
        if let Some((token, _)) = cookie_value.split_once('.') {
            self.sessions.write().await.remove(token);
        }
    }

    /// End every session of `user_id` (password change forces re-login).
    pub async fn revoke_user(&self, user_id: i64) {
        self.sessions
            .write()
            .await
            .retain(|_, uid| *uid != user_id);
    }

    fn sign(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("infallible: HMAC accepts keys of any length");
        mac.update(token.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn verify(&self, token: &str, tag: &str) -> bool {
        let Ok(tag_bytes) = URL_SAFE_NO_PAD.decode(tag) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("infallible: HMAC accepts keys of any length");
        mac.update(token.as_bytes());
        mac.verify_slice(&tag_bytes).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Cookie helpers
// ---------------------------------------------------------------------------

pub fn session_cookie(value: &str) -> String {
    format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Max-Age=0; HttpOnly; SameSite=Lax; Path=/")
}

pub fn cookie_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(&format!("{SESSION_COOKIE}="))
            .map(str::to_string)
    })
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// Gate every route except `/login` behind a valid session.
///
/// Unauthenticated requests get 401 JSON on `/api/*` and a redirect to
/// `/login` everywhere else. On success the user id and session token are
/// placed in request extensions for the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.uri().path() == "/login" {
        return next.run(req).await;
    }

    if let Some(cookie) = cookie_from_headers(req.headers()) {
        if let Some(user_id) = state.sessions.user_for(&cookie).await {
            req.extensions_mut().insert(CurrentUser(user_id));
            req.extensions_mut().insert(SessionToken(cookie));
            return next.run(req).await;
        }
    }

    if req.uri().path().starts_with("/api/") {
        Response::builder()
            .status(401)
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"error":"unauthorized"}"#))
            .expect("infallible: all header values are valid ASCII")
    } else {
        Response::builder()
            .status(302)
            .header("Location", "/login")
            .body(Body::empty())
            .expect("infallible: all header values are valid ASCII")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_resolve_roundtrip() {
        let store = SessionStore::new(Some("secret"));
        let cookie = store.create(7).await;
        assert_eq!(store.user_for(&cookie).await, Some(7));
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let store = SessionStore::new(Some("secret"));
        let cookie = store.create(7).await;
        let (token, tag) = cookie.split_once('.').unwrap();

        let mut forged = token.to_string();
        forged.replace_range(0..1, if &forged[0..1] == "A" { "B" } else { "A" });
        assert_eq!(store.user_for(&format!("{forged}.{tag}")).await, None);
        assert_eq!(store.user_for(token).await, None, "missing tag");
        assert_eq!(store.user_for("garbage").await, None);
    }

    #[tokio::test]
    async fn signature_from_other_key_is_rejected() {
        let a = SessionStore::new(Some("key-a"));
        let b = SessionStore::new(Some("key-b"));
        let cookie = a.create(1).await;
        assert_eq!(b.user_for(&cookie).await, None);
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let store = SessionStore::new(Some("secret"));
        let cookie = store.create(1).await;
        store.revoke(&cookie).await;
        store.revoke(&cookie).await;
        assert_eq!(store.user_for(&cookie).await, None);
    }

    #[tokio::test]
    async fn revoke_user_drops_all_of_their_sessions_only() {
        let store = SessionStore::new(Some("secret"));
        let one = store.create(1).await;
        let two = store.create(1).await;
        let other = store.create(2).await;

        store.revoke_user(1).await;

        assert_eq!(store.user_for(&one).await, None);
        assert_eq!(store.user_for(&two).await, None);
        assert_eq!(store.user_for(&other).await, Some(2));
    }

    #[test]
    fn cookie_header_parsing_finds_session_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            "other=1; cmdvault_session=abc.def; theme=dark".parse().unwrap(),
        );
        assert_eq!(cookie_from_headers(&headers).as_deref(), Some("abc.def"));

        let mut headers = HeaderMap::new();
        headers.insert("cookie", "other=1".parse().unwrap());
        assert_eq!(cookie_from_headers(&headers), None);
    }
}
