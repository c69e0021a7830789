//! Secret configuration values
//!
//! The database connection string and the mail relay token are held in
//! [`SecretString`], which redacts itself in `Debug` output and zeroes its
//! memory on drop. Reading the value requires an explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use clinic::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("relay-token".to_string());
//! assert_eq!(token.expose_secret().as_str(), "relay-token");
//! assert!(!format!("{token:?}").contains("relay-token"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A string that is redacted in `Debug` output and zeroed on drop
pub type SecretString = Secret<SecretValue>;

/// Wraps a string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional string as an optional [`SecretString`]
///
/// # Example
///
/// ```rust
/// use clinic::config::secret_string_opt;
///
/// assert!(secret_string_opt(Some("token".to_string())).is_some());
/// assert!(secret_string_opt(None).is_none());
/// ```
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("postgresql://u:p@h/db".to_string());
        assert_eq!(secret.expose_secret().as_str(), "postgresql://u:p@h/db");
        assert!(secret.expose_secret().starts_with("postgresql://"));
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("relay-token-123".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("relay-token-123"));
    }

    #[test]
    fn test_secret_toml_round_trip() {
        #[derive(Serialize, Deserialize)]
        struct Section {
            relay_token: SecretString,
        }

        let section: Section = toml::from_str("relay_token = \"abc\"").unwrap();
        assert_eq!(section.relay_token.expose_secret().as_str(), "abc");

        let rendered = toml::to_string(&section).unwrap();
        assert!(rendered.contains("abc"));
    }
}
