use thiserror::Error;

/// Resource store specific errors
#[derive(Error, Debug)]
pub enum ResourceStoreError {
    /// Semaphore closed
    #[error("Semaphore closed")]
    SemaphoreClosed,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Triple store backend returned an error response
    #[error("Triple store error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// Failed to connect after multiple retries
    #[error("Failed to connect to triple store after {attempts} attempts")]
    ConnectionFailed { attempts: u32 },

    /// Failed to parse a response or payload
    #[error("Failed to parse response: {reason}")]
    ParseError { reason: String },

    /// Invalid SPARQL query
    #[error("Invalid SPARQL query: {reason}")]
    InvalidQuery { reason: String },

    /// Graph session failure (open, read, write or serialize). All
    /// underlying causes collapse into this kind at the resource
    /// operation boundary.
    #[error("Datasource failure for {entity}: {message}")]
    Datasource {
        entity: &'static str,
        message: String,
    },

    /// Graph name cannot be used as a named graph IRI
    #[error("Invalid graph name: {reason}")]
    InvalidGraphName { reason: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ResourceStoreError {
    /// Wrap an underlying failure as a datasource error, keeping the
    /// originating message and the logical entity type for diagnostics.
    pub fn datasource(entity: &'static str, source: impl std::fmt::Display) -> Self {
        ResourceStoreError::Datasource {
            entity,
            message: source.to_string(),
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ResourceStoreError>;
