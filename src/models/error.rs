#[derive(Debug, thiserror::Error)]
pub enum AdRefreshError {
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Refresh failed for slot '{slot}': {message}")]
    RefreshInvocation { slot: String, message: String },

    #[error("Ad slot registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Settings missing: {0}")]
    SettingsMissing(String),

    #[error("Script error: {0}")]
    Script(String),
}

impl From<serde_json::Error> for AdRefreshError {
    fn from(error: serde_json::Error) -> Self {
        Self::ConfigParse(error.to_string())
    }
}
