//! Login sessions and cookies
//!
//! Session tokens are 32 random bytes, URL-safe base64. Only the SHA-256 of
//! a token is kept in the registry.

use crate::domain::CallerIdentity;
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "clinic_session";
pub const FLASH_COOKIE: &str = "clinic_flash";

const MAX_TTL_MINUTES: i64 = 60 * 24 * 366;

/// Generate a random session token (URL-safe base64, 32 bytes of entropy)
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone)]
struct Session {
    caller: CallerIdentity,
    expires_at: DateTime<Utc>,
}

/// In-memory session registry with a fixed lifetime per session
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<[u8; 32], Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: u64) -> Self {
        let minutes = i64::try_from(ttl_minutes)
            .unwrap_or(MAX_TTL_MINUTES)
            .min(MAX_TTL_MINUTES);
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::minutes(minutes),
        }
    }

    /// Session lifetime in seconds, for the cookie `Max-Age`
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Start a session and return its token
    pub async fn create(&self, caller: CallerIdentity) -> String {
        let token = generate_token();
        let session = Session {
            caller,
            expires_at: Utc::now() + self.ttl,
        };
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| s.expires_at > Utc::now());
        sessions.insert(hash_token(&token), session);
        token
    }

    /// The caller behind a token, if the session exists and has not expired
    pub async fn resolve(&self, token: &str) -> Option<CallerIdentity> {
        let key = hash_token(token);
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&key) {
            Some(session) if session.expires_at > Utc::now() => Some(session.caller.clone()),
            Some(_) => {
                sessions.remove(&key);
                None
            }
            None => None,
        }
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.lock().await.remove(&hash_token(token));
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Value of a named cookie from the `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a session or flash cookie
pub fn set_cookie(name: &str, value: &str, max_age: Option<i64>, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(age) = max_age {
        cookie.push_str(&format!("; Max-Age={age}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that deletes a cookie
pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", Some(0), secure)
}

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

/// One-shot message shown on the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// Cookie value: URL-encoded `level:message`
    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.level.as_str(), self.message);
        url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
    }

    pub fn decode(value: &str) -> Option<Self> {
        let raw: String = url::form_urlencoded::parse(format!("v={value}").as_bytes())
            .find(|(key, _)| key == "v")
            .map(|(_, v)| v.into_owned())?;
        let (level, message) = raw.split_once(':')?;
        let level = match level {
            "success" => FlashLevel::Success,
            "error" => FlashLevel::Error,
            _ => return None,
        };
        Some(Self {
            level,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use axum::http::HeaderValue;

    fn caller() -> CallerIdentity {
        CallerIdentity {
            user_id: UserId::new(1),
            username: "sam".to_string(),
            is_staff: false,
        }
    }

    #[test]
    fn test_generate_token_is_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let sessions = SessionStore::new(60);
        let token = sessions.create(caller()).await;
        assert_eq!(sessions.resolve(&token).await, Some(caller()));
        assert_eq!(sessions.resolve("bogus").await, None);

        sessions.remove(&token).await;
        assert_eq!(sessions.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let sessions = SessionStore::new(0);
        let token = sessions.create(caller()).await;
        assert_eq!(sessions.resolve(&token).await, None);
        assert_eq!(sessions.len().await, 0);
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; clinic_session=abc123; other=x"),
        );
        assert_eq!(
            read_cookie(&headers, SESSION_COOKIE),
            Some("abc123".to_string())
        );
        assert_eq!(read_cookie(&headers, FLASH_COOKIE), None);
    }

    #[test]
    fn test_set_cookie_flags() {
        let cookie = set_cookie(SESSION_COOKIE, "tok", Some(60), true);
        assert_eq!(
            cookie,
            "clinic_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60; Secure"
        );
        assert!(clear_cookie(FLASH_COOKIE, false).contains("Max-Age=0"));
    }

    #[test]
    fn test_flash_round_trip() {
        let flash = Flash::error("This time slot is full. Please choose another slot.");
        let encoded = flash.encode();
        assert!(!encoded.contains(' '));
        assert_eq!(Flash::decode(&encoded), Some(flash));
        assert_eq!(Flash::decode("garbage"), None);
    }
}
