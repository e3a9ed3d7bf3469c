//! Error types for the sidebar renderer

use thiserror::Error;

/// Main error type for sidebar operations
#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("Invalid page URL '{url}': {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Node {0} not found in sidebar tree")]
    NodeNotFound(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Browser binding error: {0}")]
    Browser(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for sidebar operations
pub type SidebarResult<T> = Result<T, SidebarError>;
