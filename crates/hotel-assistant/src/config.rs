//! Settings read from the environment.

use std::env;
use std::fmt::{self, Debug};

use hotel_assistant_core::DEFAULT_MAX_TOOL_ROUNDS;
use hotel_assistant_inventory::DEFAULT_BASE_URL as DEFAULT_INVENTORY_URL;
use hotel_assistant_openai_model::{
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL, OpenAIConfig,
    OpenAIConfigBuilder,
};
use thiserror::Error;

/// The error type for loading an [`AssistantConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("{name} has an invalid value: {value:?}")]
    Invalid {
        /// Name of the variable.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Where items come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventorySource {
    /// The inventory HTTP API at this base URL.
    Http(String),
    /// The built-in in-memory store.
    Memory,
}

/// Settings of the hotel assistant.
#[derive(Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// API key of the chat model.
    pub api_key: String,
    /// Base URL of the chat model API.
    pub base_url: String,
    /// Chat model identifier.
    pub model: String,
    /// API key of the embeddings API.
    pub embedding_api_key: String,
    /// Base URL of the embeddings API.
    pub embedding_base_url: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Where items come from.
    pub inventory: InventorySource,
    /// Maximum number of tool rounds per turn.
    pub max_tool_rounds: usize,
}

impl AssistantConfig {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let api_key = get("OPENROUTER_API_KEY")
            .ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))?;
        let base_url = get("OPENROUTER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let model = get("HOTEL_ASSISTANT_MODEL")
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let embedding_api_key =
            get("EMBEDDING_API_KEY").unwrap_or_else(|| api_key.clone());
        let embedding_base_url =
            get("EMBEDDING_BASE_URL").unwrap_or_else(|| base_url.clone());
        let embedding_model = get("EMBEDDING_MODEL")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_owned());

        let inventory = match get("INVENTORY_BASE_URL") {
            Some(value) if value.eq_ignore_ascii_case("memory") => {
                InventorySource::Memory
            }
            Some(url) => InventorySource::Http(url),
            None => InventorySource::Http(DEFAULT_INVENTORY_URL.to_owned()),
        };

        let max_tool_rounds = match get("HOTEL_ASSISTANT_MAX_TOOL_ROUNDS") {
            Some(value) => value.trim().parse().map_err(|_| {
                ConfigError::Invalid {
                    name: "HOTEL_ASSISTANT_MAX_TOOL_ROUNDS",
                    value,
                }
            })?,
            None => DEFAULT_MAX_TOOL_ROUNDS,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            embedding_api_key,
            embedding_base_url,
            embedding_model,
            inventory,
            max_tool_rounds,
        })
    }

    /// Returns the provider configuration for chat completions.
    pub fn chat_config(&self) -> OpenAIConfig {
        OpenAIConfigBuilder::with_api_key(&self.api_key)
            .with_base_url(&self.base_url)
            .with_model(&self.model)
            .build()
    }

    /// Returns the provider configuration for embeddings.
    pub fn embedding_config(&self) -> OpenAIConfig {
        OpenAIConfigBuilder::with_api_key(&self.embedding_api_key)
            .with_base_url(&self.embedding_base_url)
            .with_embedding_model(&self.embedding_model)
            .build()
    }
}

impl Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_api_key", &"<redacted>")
            .field("embedding_base_url", &self.embedding_base_url)
            .field("embedding_model", &self.embedding_model)
            .field("inventory", &self.inventory)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish()
    }
}
