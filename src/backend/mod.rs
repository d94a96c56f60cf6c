mod oxigraph_backend;
mod sparql_http;

use std::time::Duration;

use async_trait::async_trait;
pub use oxigraph_backend::OxigraphBackend;
pub use sparql_http::SparqlHttpBackend;

use crate::error::Result;

/// Trait for triple store backends
///
/// Implementations provide the low-level graph and SPARQL execution against
/// specific triple store systems (Fuseki, Virtuoso, embedded Oxigraph, etc.)
///
/// The `format` arguments are opaque serialization tokens owned by the
/// backend's serializer; the core never enumerates supported values.
#[async_trait]
pub trait GraphStoreBackend: Send + Sync {
    /// Backend name for logging/debugging
    fn name(&self) -> &'static str;

    /// Health check - verify the triple store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Parse `content` as `format` and merge the triples into the named
    /// graph without clearing pre-existing triples (pure append)
    async fn merge_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        timeout: Duration,
    ) -> Result<()>;

    /// Replace the entire content of the named graph with the parsed
    /// `content` as a single idempotent request
    async fn replace_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        timeout: Duration,
    ) -> Result<()>;

    /// Execute a SPARQL SELECT query
    ///
    /// Returns SPARQL results JSON as a string
    async fn select(&self, query: &str, timeout: Duration) -> Result<String>;

    /// Execute a SPARQL ASK query
    async fn ask(&self, query: &str, timeout: Duration) -> Result<bool>;

    /// Execute a SPARQL CONSTRUCT or DESCRIBE query
    ///
    /// Returns the resulting graph serialized in `format`
    async fn construct(&self, query: &str, format: &str, timeout: Duration) -> Result<Vec<u8>>;

    /// Execute a SPARQL UPDATE (INSERT/DELETE/DROP/MOVE)
    async fn update(&self, query: &str, timeout: Duration) -> Result<()>;
}
