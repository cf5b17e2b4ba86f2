//! Token pair and durable credential storage
//!
//! Credentials live in a key-value store that survives process restarts.
//! Only [`ApiClient`](crate::ApiClient) reads or writes it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

use crate::error::TokenStoreError;

/// Storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key for the authenticated farmer's identifier
pub const FARMER_ID_KEY: &str = "farmer_id";

/// Access and refresh token issued together by the backend
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Expiry of the access token, when it is a JWT carrying `exp`
    ///
    /// The signature is not checked: the client only uses the claim to
    /// schedule a refresh, the server remains the judge of validity.
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<ExpiryClaim>(
            &self.access_token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .ok()?;
        Utc.timestamp_opt(data.claims.exp, 0).single()
    }

    /// Returns true when the access token expires within `skew` of `now`
    pub fn expires_within(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.access_expires_at()
            .map(|expiry| expiry - skew <= now)
            .unwrap_or(false)
    }
}

/// Durable key-value storage for credentials
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError>;
    /// Writes every entry in one step; on error none of them is stored
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), TokenStoreError>;
    async fn remove(&self, key: &str) -> Result<(), TokenStoreError>;
}

/// Process-local store, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a token pair
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        let mut entries = HashMap::new();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), tokens.access_token.clone());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), tokens.refresh_token.clone());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), TokenStoreError> {
        let mut stored = self.entries.write().await;
        for (key, value) in entries {
            stored.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// JSON-file backed store that survives restarts
///
/// Writes go to a sibling temp file and are renamed into place. On unix the
/// file is restricted to the owner.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, TokenStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec(entries)?).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read_all().await?;
        for (key, value) in entries {
            stored.insert(key.to_string(), value.to_string());
        }
        self.write_all(&stored).await
    }

    async fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    fn jwt_expiring_at(exp: DateTime<Utc>) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                sub: "farmer-1".to_string(),
                exp: exp.timestamp(),
            },
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn test_opaque_token_has_no_expiry() {
        let pair = TokenPair::new("opaque", "refresh");
        assert!(pair.access_expires_at().is_none());
        assert!(!pair.expires_within(Utc::now(), Duration::seconds(30)));
    }

    #[test]
    fn test_jwt_expiry_read_without_key() {
        let exp = Utc::now() + Duration::minutes(10);
        let pair = TokenPair::new(jwt_expiring_at(exp), "refresh");

        assert_eq!(pair.access_expires_at().map(|e| e.timestamp()), Some(exp.timestamp()));
        assert!(!pair.expires_within(Utc::now(), Duration::seconds(30)));
        assert!(pair.expires_within(Utc::now() + Duration::minutes(10), Duration::seconds(30)));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        store.set(ACCESS_TOKEN_KEY, "a1").await.unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), Some("a1".to_string()));
        store.remove(ACCESS_TOKEN_KEY).await.unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileTokenStore::new(&path);
        store.set(REFRESH_TOKEN_KEY, "r1").await.unwrap();
        store.set(FARMER_ID_KEY, "F-9").await.unwrap();
        drop(store);

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).await.unwrap(), Some("r1".to_string()));
        assert_eq!(reopened.get(FARMER_ID_KEY).await.unwrap(), Some("F-9".to_string()));

        reopened.remove(REFRESH_TOKEN_KEY).await.unwrap();
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_writes_pair_in_one_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileTokenStore::new(&path);
        store.set(FARMER_ID_KEY, "F-9").await.unwrap();

        store
            .set_many(&[(ACCESS_TOKEN_KEY, "a2"), (REFRESH_TOKEN_KEY, "r2")])
            .await
            .unwrap();

        let on_disk: HashMap<String, String> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 3);
        assert_eq!(on_disk[ACCESS_TOKEN_KEY], "a2");
        assert_eq!(on_disk[REFRESH_TOKEN_KEY], "r2");
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_unwritable_path_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let store = FileTokenStore::new(blocker.join("credentials.json"));

        let err = store
            .set_many(&[(ACCESS_TOKEN_KEY, "a2"), (REFRESH_TOKEN_KEY, "r2")])
            .await;

        assert!(matches!(err, Err(TokenStoreError::Io(_))));
        assert_eq!(std::fs::read(&blocker).unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }
}
