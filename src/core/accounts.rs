//! Login accounts
//!
//! Passwords are stored as `pbkdf2_sha256$<iterations>$<salt>$<hash>`, the
//! hash being base64 PBKDF2-HMAC-SHA256 output. Verification reads the
//! iteration count from the stored value, so the default can be raised
//! without invalidating existing accounts.

use crate::adapters::database::ClinicStore;
use crate::domain::validation::{validate_username, FieldErrors};
use crate::domain::{ClinicError, NewPatient, NewUser, Patient, Result, User};
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use std::fmt::Write as _;
use std::sync::Arc;
use subtle::ConstantTimeEq;

const HASH_ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Work factor for newly hashed passwords
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 8;

/// Message for any failed login, so usernames cannot be probed
pub const LOGIN_FAILED: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut out);
    base64::engine::general_purpose::STANDARD.encode(out)
}

fn random_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt.iter().fold(String::with_capacity(SALT_LEN * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    hash_password_with_iterations(password, PBKDF2_ITERATIONS)
}

/// Hash a password with an explicit work factor
///
/// Test fixtures use a low count to stay fast.
pub fn hash_password_with_iterations(password: &str, iterations: u32) -> String {
    let iterations = iterations.max(1);
    let salt = random_salt();
    let hash = derive(password, &salt, iterations);
    format!("{HASH_ALGORITHM}${iterations}${salt}${hash}")
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(4, '$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if algorithm != HASH_ALGORITHM || salt.is_empty() {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = derive(password, salt, iterations);
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Raw login form fields
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required_text("username", &self.username);
        if self.password.is_empty() {
            errors.add("password", "This field is required.");
        }
        errors.into_result(())
    }
}

#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn ClinicStore + Send + Sync>,
}

impl Accounts {
    pub fn new(store: Arc<dyn ClinicStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Resolve a username and password to an account
    ///
    /// # Errors
    ///
    /// Returns `Authentication` for an unknown user or a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self.store.find_user_by_username(username.trim()).await?;
        match user {
            Some(user) if verify_password(password, &user.password_hash) => {
                tracing::info!(user_id = %user.id, "Login succeeded");
                Ok(user)
            }
            _ => {
                tracing::warn!(username = %username.trim(), "Login failed");
                Err(ClinicError::Authentication(LOGIN_FAILED.to_string()))
            }
        }
    }

    /// Create an account
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad username or short password and
    /// `Conflict(DuplicateUsername)` if the name is taken.
    pub async fn register_user(&self, username: &str, password: &str, is_staff: bool) -> Result<User> {
        let mut errors = validate_username(username).err().unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        errors.into_result(())?;

        let user = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash: hash_password(password),
                is_staff,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, is_staff, "User created");
        Ok(user)
    }

    /// Create a patient profile linked to an account
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad profile fields and
    /// `Conflict(UserAlreadyLinked)` if the account already has a profile.
    pub async fn link_patient(&self, user: &User, profile: NewPatient) -> Result<Patient> {
        let profile = profile.for_user(user.id);
        crate::domain::validation::validate_new_patient(&profile)?;
        let patient = self.store.insert_patient(profile).await?;
        tracing::info!(user_id = %user.id, patient_id = %patient.id, "Patient profile linked");
        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::ConflictKind;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password_with_iterations("correct horse", 1_000);
        let parts: Vec<&str> = hash.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2_sha256");
        assert_eq!(parts[1], "1000");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_default_work_factor() {
        let hash = hash_password("correct horse");
        assert!(hash.starts_with(&format!("pbkdf2_sha256${PBKDF2_ITERATIONS}$")));
        assert!(verify_password("correct horse", &hash));
    }

    #[test]
    fn test_hash_is_not_a_single_digest() {
        use sha2::Digest;

        let hash = hash_password_with_iterations("hunter22", 1_000);
        let parts: Vec<&str> = hash.split('$').collect();
        let mut hasher = Sha256::new();
        hasher.update(parts[2].as_bytes());
        hasher.update(b"hunter22");
        let one_round = base64::engine::general_purpose::STANDARD.encode(hasher.finalize());
        assert_ne!(parts[3], one_round);
    }

    #[test]
    fn test_iteration_count_is_read_from_hash() {
        let hash = hash_password_with_iterations("same", 3);
        let tampered = hash.replacen("$3$", "$4$", 1);
        assert!(verify_password("same", &hash));
        assert!(!verify_password("same", &tampered));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password_with_iterations("same", 10),
            hash_password_with_iterations("same", 10)
        );
    }

    #[test]
    fn test_verify_rejects_malformed() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "sha256$aa$bb"));
        assert!(!verify_password("x", "pbkdf2_sha256$0$salt$abc"));
        assert!(!verify_password("x", "pbkdf2_sha256$many$salt$abc"));
        assert!(!verify_password("x", "pbkdf2_sha256$10$$abc"));
    }

    #[test]
    fn test_login_form_requires_both() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let accounts = Accounts::new(Arc::new(MemoryStore::new()));
        let user = accounts.register_user("sam", "s3cret-pass", false).await.unwrap();

        let found = accounts.authenticate("sam", "s3cret-pass").await.unwrap();
        assert_eq!(found.id, user.id);

        assert!(matches!(
            accounts.authenticate("sam", "nope").await,
            Err(ClinicError::Authentication(_))
        ));
        assert!(matches!(
            accounts.authenticate("nobody", "s3cret-pass").await,
            Err(ClinicError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_short_passwords() {
        let accounts = Accounts::new(Arc::new(MemoryStore::new()));
        accounts.register_user("sam", "s3cret-pass", false).await.unwrap();

        let duplicate = accounts.register_user("sam", "another-pass", false).await;
        assert_eq!(
            duplicate.unwrap_err().conflict_kind(),
            Some(ConflictKind::DuplicateUsername)
        );
        assert!(matches!(
            accounts.register_user("kim", "short", false).await,
            Err(ClinicError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_link_patient_once() {
        let accounts = Accounts::new(Arc::new(MemoryStore::new()));
        let user = accounts.register_user("sam", "s3cret-pass", false).await.unwrap();
        let patient = accounts
            .link_patient(&user, NewPatient::named("Sam Lee"))
            .await
            .unwrap();
        assert_eq!(patient.user_id, Some(user.id));

        let again = accounts.link_patient(&user, NewPatient::named("Sam Lee")).await;
        assert_eq!(
            again.unwrap_err().conflict_kind(),
            Some(ConflictKind::UserAlreadyLinked)
        );
    }
}
