//! Access-token providers injected into the HTTP transport.

use async_trait::async_trait;
use gsheet_core::StoreResult;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Source of bearer tokens for Sheets API calls.
///
/// The transport asks for a token before every request and calls
/// [`CredentialProvider::revoke`] when the API rejects it. Acquiring a new
/// token after that is up to the caller, via [`CredentialProvider::refresh`].
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current token, `None` when no credential is held.
    async fn access_token(&self) -> StoreResult<Option<String>>;

    /// Try to obtain a usable token again.
    async fn refresh(&self) -> StoreResult<Option<String>> {
        self.access_token().await
    }

    /// Drop the current token.
    async fn revoke(&self);
}

/// A fixed token supplied up front.
#[derive(Debug, Default)]
pub struct StaticToken {
    token: RwLock<Option<String>>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// A provider holding no credential.
    pub fn none() -> Self {
        Self::default()
    }

    /// Replace the held token.
    pub async fn set(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> StoreResult<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn revoke(&self) {
        self.token.write().await.take();
    }
}

/// Reads the token from an environment variable on every acquire.
///
/// After a revoke the variable is ignored until [`CredentialProvider::refresh`]
/// is called, so a rejected token is not sent again unchanged.
#[derive(Debug)]
pub struct EnvToken {
    var: String,
    revoked: AtomicBool,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        EnvToken {
            var: var.into(),
            revoked: AtomicBool::new(false),
        }
    }

    fn read(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl CredentialProvider for EnvToken {
    async fn access_token(&self) -> StoreResult<Option<String>> {
        if self.revoked.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.read())
    }

    async fn refresh(&self) -> StoreResult<Option<String>> {
        self.revoked.store(false, Ordering::SeqCst);
        Ok(self.read())
    }

    async fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }
}
