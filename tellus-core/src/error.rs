//! Error types for Tellus operations

/// Result type for Tellus operations
pub type Result<T> = std::result::Result<T, TellusError>;

/// Error types for the Tellus runtime
#[derive(Debug, thiserror::Error)]
pub enum TellusError {
    /// Library loading failed
    #[error("Load error: {0}")]
    Load(#[from] crate::library::LoadError),

    /// Library not found in the registry
    #[error("Library not found: {0}")]
    LibraryNotFound(String),

    /// Tool not found in a library
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Library has executions in flight
    #[error("Library '{0}' is in use")]
    InUse(String),

    /// Data object is already claimed as an output
    #[error("Data object is busy: {0}")]
    ObjectBusy(String),

    /// Unknown data object kind
    #[error("Unsupported data object kind: {0}")]
    UnsupportedKind(String),

    /// Data object not found in the store
    #[error("Data object not found: {0}")]
    ObjectNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for TellusError {
    fn from(s: String) -> Self {
        TellusError::Other(s)
    }
}

impl From<&str> for TellusError {
    fn from(s: &str) -> Self {
        TellusError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for TellusError {
    fn from(err: anyhow::Error) -> Self {
        TellusError::Other(err.to_string())
    }
}
