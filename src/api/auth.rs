//! Bearer token storage.
//!
//! The token issued by `POST /signin` is the only piece of client-held auth
//! state. It is kept in the OS keyring and accessed exclusively through
//! [`AuthContext`], which is populated at login and cleared at logout.

use std::fmt;

use tracing::{debug, warn};

use super::error::{ApiError, Result};

/// The keyring service name for Extra Memory tokens.
const KEYRING_SERVICE: &str = "extramem";

/// Backing storage for the bearer token.
pub trait TokenStore: Send {
    /// Load the stored token, if any.
    fn load(&self) -> Result<Option<String>>;
    /// Persist a token, replacing any previous one.
    fn store(&mut self, token: &str) -> Result<()>;
    /// Remove the stored token. Removing a missing token is not an error.
    fn delete(&mut self) -> Result<()>;
}

/// Token storage in the OS keyring, keyed by backend URL.
pub struct KeyringStore {
    account: String,
}

impl KeyringStore {
    /// Create a store for tokens issued by the given backend.
    pub fn new(backend_url: &str) -> Self {
        Self {
            account: backend_url.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &self.account)
            .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))
    }
}

impl TokenStore for KeyringStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ApiError::Keyring(format!("failed to retrieve token: {}", e))),
        }
    }

    fn store(&mut self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))
    }

    fn delete(&mut self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ApiError::Keyring(format!("failed to delete token: {}", e))),
        }
    }
}

/// In-process token storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }

    fn store(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.token = None;
        Ok(())
    }
}

/// The single owner of the client's bearer token.
pub struct AuthContext {
    store: Box<dyn TokenStore>,
    token: Option<String>,
}

impl AuthContext {
    /// Create a context over the given store, loading any existing token.
    ///
    /// A store that cannot be read is treated as empty.
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        let token = store.load().unwrap_or_else(|e| {
            warn!("Could not read stored token: {}", e);
            None
        });
        Self { store, token }
    }

    /// Create a context backed by the OS keyring for the given backend.
    pub fn keyring(backend_url: &str) -> Self {
        Self::new(Box::new(KeyringStore::new(backend_url)))
    }

    /// Create a context that only lives in memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryTokenStore::new()))
    }

    /// Get the current token.
    pub fn get(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Store a freshly issued token.
    pub fn set(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.store.store(&token)?;
        self.token = Some(token);
        debug!("Auth token stored");
        Ok(())
    }

    /// Forget the token, both in memory and in the store.
    ///
    /// The in-memory token is dropped even if the store fails.
    pub fn clear(&mut self) -> Result<()> {
        self.token = None;
        self.store.delete()?;
        debug!("Auth token cleared");
        Ok(())
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

/// Build a bearer header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_starts_empty() {
        let auth = AuthContext::in_memory();
        assert!(!auth.is_authenticated());
        assert!(auth.get().is_none());
    }

    #[test]
    fn test_loads_existing_token() {
        let auth = AuthContext::new(Box::new(MemoryTokenStore::with_token("abc")));
        assert_eq!(auth.get(), Some("abc"));
        assert!(auth.is_authenticated());
    }

    #[test]
    fn test_set_and_clear() {
        let mut auth = AuthContext::in_memory();
        auth.set("token-1").unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.get(), Some("token-1"));

        auth.clear().unwrap();
        assert!(!auth.is_authenticated());
        // Clearing twice is fine
        auth.clear().unwrap();
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let auth = AuthContext::new(Box::new(MemoryTokenStore::with_token("secret_token")));
        let debug_output = format!("{:?}", auth);
        assert!(!debug_output.contains("secret_token"));
        assert!(debug_output.contains("authenticated: true"));
    }

    #[test]
    fn test_bearer() {
        assert_eq!(bearer("t"), "Bearer t");
    }
}
