//! Secret configuration (API keys) model.

use serde::{Deserialize, Serialize};

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<ProviderSecret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude: Option<ProviderSecret>,
}

/// Credentials for one text-generation provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderSecret {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}
