use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuickSpaceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid CSS selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Rule list fetch timed out after {0} ms")]
    Timeout(u64),

    #[error("Document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl QuickSpaceError {
    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

impl serde::Serialize for QuickSpaceError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type QuickSpaceResult<T> = Result<T, QuickSpaceError>;
