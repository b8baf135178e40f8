use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-configurable settings for the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,
}
