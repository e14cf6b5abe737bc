use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Sensitive string whose `Debug` and `Display` never reveal the value.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

pub type SecretFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + 'a>>;

/// Pluggable secret retrieval backend.
pub trait VaultProvider: Send + Sync {
    fn get_secret(&self, key: &str) -> SecretFuture<'_>;
}

/// Reads secrets from process environment variables (after `.env` is loaded).
pub struct EnvVaultProvider;

impl VaultProvider for EnvVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let key = key.to_owned();
        Box::pin(async move { Ok(std::env::var(&key).ok()) })
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MapVaultProvider {
    secrets: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MapVaultProvider {
    pub(crate) fn with_secret(mut self, key: &str, value: &str) -> Self {
        self.secrets.insert(key.to_owned(), value.to_owned());
        self
    }
}

#[cfg(test)]
impl VaultProvider for MapVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let result = self.secrets.get(key).cloned();
        Box::pin(async move { Ok(result) })
    }
}
