use serde::{Deserialize, Serialize};

/// Backend type for the resource store
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceStoreBackendType {
    /// Remote SPARQL 1.1 server reached over HTTP (Fuseki-style layout)
    SparqlEndpoint,
    /// Oxigraph embedded Rust-native backend (no external service needed)
    Oxigraph,
}

/// Configuration for the Resource Store Manager.
///
/// Passed explicitly at construction time; the store connection is never
/// read from process-wide state.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResourceStoreConfig {
    /// Backend type to use.
    pub backend: ResourceStoreBackendType,

    /// Base URL of the triple store service (e.g., "http://localhost:3030").
    /// Required for the SPARQL endpoint backend, ignored for Oxigraph.
    pub url: String,

    /// Dataset (repository) name.
    /// For the SPARQL endpoint backend: the dataset path segment.
    /// For Oxigraph: subdirectory name under the data path.
    pub dataset: String,

    /// Optional username for HTTP basic auth (SPARQL endpoint only)
    pub username: Option<String>,

    /// Optional password for HTTP basic auth (SPARQL endpoint only)
    pub password: Option<String>,

    /// Maximum number of connection retries on startup (SPARQL endpoint only)
    pub connect_max_retries: u32,

    /// Delay between connection retry attempts in milliseconds (SPARQL endpoint only)
    pub connect_retry_frequency_ms: u64,

    /// Timeout configuration for different operation types
    pub timeouts: TimeoutConfig,

    /// Maximum concurrent backend operations.
    /// Limits how many store operations can run simultaneously to avoid
    /// overwhelming the remote server or causing resource contention.
    pub max_concurrent_operations: usize,
}

/// Timeout configuration for different SPARQL operations
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Timeout for SELECT/CONSTRUCT/DESCRIBE queries in milliseconds
    pub query_ms: u64,

    /// Timeout for graph writes and SPARQL updates in milliseconds
    pub update_ms: u64,

    /// Timeout for ASK queries in milliseconds
    pub ask_ms: u64,
}

impl TimeoutConfig {
    /// Get query timeout as Duration
    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.query_ms)
    }

    /// Get update timeout as Duration
    pub fn update_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.update_ms)
    }

    /// Get ask timeout as Duration
    pub fn ask_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.ask_ms)
    }
}

impl ResourceStoreConfig {
    /// Get connect retry frequency as Duration
    pub fn connect_retry_frequency(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.connect_retry_frequency_ms)
    }

    /// Get the SPARQL query endpoint URL for the configured dataset
    pub fn query_endpoint(&self) -> String {
        format!("{}/{}/sparql", self.url.trim_end_matches('/'), self.dataset)
    }

    /// Get the SPARQL update endpoint URL for the configured dataset
    pub fn update_endpoint(&self) -> String {
        format!("{}/{}/update", self.url.trim_end_matches('/'), self.dataset)
    }

    /// Get the Graph Store Protocol endpoint URL for the configured dataset
    pub fn graph_store_endpoint(&self) -> String {
        format!("{}/{}/data", self.url.trim_end_matches('/'), self.dataset)
    }
}
