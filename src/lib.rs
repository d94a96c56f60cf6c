mod backend;
mod config;
pub mod error;
mod metrics;
mod query;
mod resource;
mod session;
pub(crate) mod sparql;
pub mod types;

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use backend::{GraphStoreBackend, OxigraphBackend, SparqlHttpBackend};
pub use config::{ResourceStoreBackendType, ResourceStoreConfig, TimeoutConfig};
use error::{Result, ResourceStoreError};
pub use query::{QueryExecution, QueryForm};
pub use session::GraphSession;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
pub use types::{Resource, SelectQueryResponse};

#[cfg(test)]
mod tests;

/// Resource Store Manager
///
/// Provides graph-level CRUD for RDF resources and SPARQL query execution
/// against the configured triple store. Each operation is a single
/// acquire-act-release cycle; no session or execution handle outlives one
/// call.
pub struct ResourceStoreManager {
    pub(crate) backend: Box<dyn GraphStoreBackend>,
    pub(crate) config: ResourceStoreConfig,
    /// Semaphore for limiting concurrent backend operations
    concurrency_limiter: Arc<Semaphore>,
    /// Per-graph write locks; writers to the same graph are serialized
    /// within this process
    write_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResourceStoreManager {
    /// Create a new Resource Store Manager
    ///
    /// Creates the appropriate backend based on configuration and verifies
    /// it is reachable.
    ///
    /// # Arguments
    /// * `config` - Resource store configuration
    /// * `data_path` - Path for Oxigraph persistent storage (ignored for
    ///   remote endpoints)
    pub async fn connect(config: &ResourceStoreConfig, data_path: &Path) -> Result<Self> {
        let backend: Box<dyn GraphStoreBackend> = match config.backend {
            ResourceStoreBackendType::SparqlEndpoint => {
                Box::new(SparqlHttpBackend::new(config.clone())?)
            }
            ResourceStoreBackendType::Oxigraph => {
                // Create full path with dataset name
                let store_path = data_path.join(&config.dataset);

                // Ensure the directory exists
                if let Some(parent) = store_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                Box::new(OxigraphBackend::open(store_path)?)
            }
        };

        // Initialize concurrency limiter
        let max_concurrent = config.max_concurrent_operations.max(1);
        if max_concurrent != config.max_concurrent_operations {
            tracing::warn!(
                configured = config.max_concurrent_operations,
                effective = max_concurrent,
                "Resource store max_concurrent_operations too low; clamped"
            );
        }
        tracing::info!(
            max_concurrent = max_concurrent,
            "Resource store concurrency limiter initialized"
        );
        let concurrency_limiter = Arc::new(Semaphore::new(max_concurrent));

        let manager = Self {
            backend,
            config: config.clone(),
            concurrency_limiter,
            write_locks: Mutex::new(HashMap::new()),
        };

        // For remote endpoints, attempt connection with retries
        // For Oxigraph, this is essentially a no-op (always healthy)
        if config.backend == ResourceStoreBackendType::SparqlEndpoint {
            manager.connect_with_retry().await?;
        }

        Ok(manager)
    }

    /// Connect to the triple store with retry logic
    async fn connect_with_retry(&self) -> Result<()> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.backend.health_check().await {
                Ok(true) => {
                    tracing::info!(
                        backend = %self.backend.name(),
                        url = %self.config.url,
                        "Connected to triple store"
                    );
                    return Ok(());
                }
                Ok(false) => {
                    tracing::warn!(
                        backend = %self.backend.name(),
                        attempt = attempts,
                        "Triple store health check returned false"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        backend = %self.backend.name(),
                        attempt = attempts,
                        error = %e,
                        "Failed to connect to triple store"
                    );
                }
            }

            if attempts >= self.config.connect_max_retries {
                return Err(ResourceStoreError::ConnectionFailed { attempts });
            }

            tokio::time::sleep(self.config.connect_retry_frequency()).await;
        }
    }

    // ========== Internal Backend Wrappers (with concurrency limiting) ==========

    /// Effective concurrency limit used by the internal semaphore.
    pub fn max_concurrent_operations(&self) -> usize {
        self.config.max_concurrent_operations.max(1)
    }

    /// Lock handle serializing writers of one graph within this process.
    pub(crate) fn graph_write_lock(&self, graph: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .write_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            locks
                .entry(graph.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn record_permit_snapshot(&self, backend: &str) {
        metrics::record_backend_permit_snapshot(
            backend,
            self.max_concurrent_operations(),
            self.concurrency_limiter.available_permits(),
        );
    }

    async fn acquire_permit(&self, backend: &str, op: &str) -> Result<OwnedSemaphorePermit> {
        let wait_started = Instant::now();
        let permit = self
            .concurrency_limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ResourceStoreError::SemaphoreClosed)?;
        metrics::record_backend_permit_wait(backend, op, wait_started.elapsed());
        self.record_permit_snapshot(backend);
        Ok(permit)
    }

    /// Execute a SPARQL UPDATE with concurrency limiting
    pub(crate) async fn backend_update(&self, query: &str, timeout: Duration) -> Result<()> {
        let backend = self.backend.name();
        let op = "update";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, query.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self.backend.update(query, timeout).await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    #[cfg(test)]
    pub async fn raw_update_for_tests(&self, query: &str) -> Result<()> {
        // Convenience wrapper for tests that need to inject raw triples.
        self.backend_update(query, self.config.timeouts.update_timeout())
            .await
    }

    /// Merge parsed content into a named graph with concurrency limiting
    pub(crate) async fn backend_merge_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        timeout: Duration,
    ) -> Result<()> {
        let backend = self.backend.name();
        let op = "merge_graph";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, content.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self.backend.merge_graph(graph, content, format, timeout).await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    /// Replace a named graph's content with concurrency limiting
    pub(crate) async fn backend_replace_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        timeout: Duration,
    ) -> Result<()> {
        let backend = self.backend.name();
        let op = "replace_graph";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, content.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self
            .backend
            .replace_graph(graph, content, format, timeout)
            .await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    /// Execute a SPARQL SELECT with concurrency limiting
    pub(crate) async fn backend_select(&self, query: &str, timeout: Duration) -> Result<String> {
        let backend = self.backend.name();
        let op = "select";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, query.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self.backend.select(query, timeout).await;
        drop(permit);
        self.record_permit_snapshot(backend);

        if let Ok(body) = &result {
            metrics::record_backend_result_bytes_total(backend, op, body.len());
        }

        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    /// Execute a SPARQL ASK with concurrency limiting
    pub(crate) async fn backend_ask(&self, query: &str, timeout: Duration) -> Result<bool> {
        let backend = self.backend.name();
        let op = "ask";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, query.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self.backend.ask(query, timeout).await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    /// Execute a SPARQL CONSTRUCT/DESCRIBE with concurrency limiting
    pub(crate) async fn backend_construct(
        &self,
        query: &str,
        format: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let backend = self.backend.name();
        let op = "construct";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, query.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self.backend.construct(query, format, timeout).await;
        drop(permit);
        self.record_permit_snapshot(backend);

        if let Ok(body) = &result {
            metrics::record_backend_result_bytes_total(backend, op, body.len());
        }

        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }
}

#[cfg(test)]
impl ResourceStoreManager {
    pub fn from_backend_for_tests(
        backend: Box<dyn GraphStoreBackend>,
        config: ResourceStoreConfig,
    ) -> Self {
        let max_concurrent = config.max_concurrent_operations.max(1);
        let concurrency_limiter = Arc::new(Semaphore::new(max_concurrent));
        Self {
            backend,
            config,
            concurrency_limiter,
            write_locks: Mutex::new(HashMap::new()),
        }
    }
}
