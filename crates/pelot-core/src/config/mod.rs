mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::Context;

use crate::vault::{Secret, VaultProvider};

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GENAI_API_KEY";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or the
    /// resulting values fail validation.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make ingestion or retrieval meaningless.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model must not be empty");
        }
        if self.llm.embedding_model.trim().is_empty() {
            anyhow::bail!("llm.embedding_model must not be empty");
        }
        if self.memory.collection.trim().is_empty() {
            anyhow::bail!("memory.collection must not be empty");
        }
        if self.memory.vector_size == 0 {
            anyhow::bail!("memory.vector_size must be greater than 0");
        }
        if self.memory.recall_limit == 0 {
            anyhow::bail!("memory.recall_limit must be greater than 0");
        }
        if self.ingest.max_length == 0 {
            anyhow::bail!("ingest.max_length must be greater than 0");
        }
        if self.ingest.extensions.is_empty() {
            anyhow::bail!("ingest.extensions must list at least one extension");
        }
        Ok(())
    }

    /// Resolve the API key through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails or the key is not set.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        match vault.get_secret(API_KEY_VAR).await? {
            Some(val) if !val.trim().is_empty() => {
                self.secrets.genai_api_key = Some(Secret::new(val));
                Ok(())
            }
            _ => anyhow::bail!("{API_KEY_VAR} is not set; export it or add it to .env"),
        }
    }
}
