use std::time::Instant;

use crate::{
    ResourceStoreManager, metrics,
    error::Result,
    session::validate_graph_iri,
    types::Resource,
};

impl ResourceStoreManager {
    /// Get a graph resource serialized in the requested format.
    ///
    /// An absent or empty graph yields an empty document of that format.
    pub async fn get_resource(&self, graph: &str, format: &str) -> Result<Resource> {
        let started = Instant::now();

        let result = async {
            let session = self.open_graph(graph)?;
            let content = session.serialize(format).await?;
            Ok(Resource::new(content))
        }
        .await;

        metrics::record_resource_operation("get", result.as_ref().err(), started.elapsed());
        result
    }

    /// Parse `content` as `format` and merge the triples into the graph.
    ///
    /// A pure append: pre-existing triples are kept. There is no
    /// partial-insert detection beyond the parse step.
    pub async fn insert_resource(&self, graph: &str, content: &[u8], format: &str) -> Result<()> {
        let started = Instant::now();

        let result = async {
            let session = self.open_graph(graph)?;
            let _guard = self.graph_write_lock(graph).lock_owned().await;
            session.load(content, format).await
        }
        .await;

        metrics::record_resource_operation("insert", result.as_ref().err(), started.elapsed());
        result
    }

    /// Whether the graph currently contains at least one triple.
    ///
    /// `Ok(false)` covers both "never created" and "exists but empty";
    /// underlying store failures propagate as errors instead of being
    /// folded into `false`.
    pub async fn resource_exists(&self, graph: &str) -> Result<bool> {
        let started = Instant::now();

        let result = async {
            let session = self.open_graph(graph)?;
            Ok(!session.is_empty().await?)
        }
        .await;

        metrics::record_resource_operation("exists", result.as_ref().err(), started.elapsed());
        result
    }

    /// Replace the graph's entire content with the parsed `content`.
    ///
    /// Submitted as one idempotent store request, so a parse or transport
    /// failure does not leave the graph emptied on stores that apply the
    /// replacement atomically.
    pub async fn update_resource(&self, graph: &str, content: &[u8], format: &str) -> Result<()> {
        let started = Instant::now();

        let result = async {
            let session = self.open_graph(graph)?;
            let _guard = self.graph_write_lock(graph).lock_owned().await;
            session.replace(content, format).await
        }
        .await;

        metrics::record_resource_operation("update", result.as_ref().err(), started.elapsed());
        result
    }

    /// Move a graph's content to a new name, deleting the source.
    ///
    /// Executed as a single SPARQL `MOVE` update; the destination's previous
    /// content is discarded by the move. A missing source simply leaves the
    /// destination cleared.
    pub async fn replace_resource(&self, old_graph: &str, new_graph: &str) -> Result<()> {
        let started = Instant::now();

        let result = async {
            validate_graph_iri(old_graph)?;
            validate_graph_iri(new_graph)?;

            // Both graphs are locked in lexicographic order so that two
            // concurrent moves touching the same pair cannot deadlock.
            let (first, second) = if old_graph <= new_graph {
                (old_graph, new_graph)
            } else {
                (new_graph, old_graph)
            };
            let _first_guard = self.graph_write_lock(first).lock_owned().await;
            let _second_guard = if first == second {
                None
            } else {
                Some(self.graph_write_lock(second).lock_owned().await)
            };

            let update = format!("MOVE SILENT GRAPH <{old_graph}> TO GRAPH <{new_graph}>");
            self.backend_update(&update, self.config.timeouts.update_timeout())
                .await
                .map_err(|e| {
                    crate::error::ResourceStoreError::datasource(crate::session::RESOURCE_ENTITY, e)
                })
        }
        .await;

        metrics::record_resource_operation("replace", result.as_ref().err(), started.elapsed());
        result
    }

    /// Remove all triples of the graph.
    ///
    /// Returns `Ok(true)` if the graph had content, `Ok(false)` if it was
    /// already absent or empty, and an error on underlying failure rather
    /// than swallowing it into a boolean.
    pub async fn delete_resource(&self, graph: &str) -> Result<bool> {
        let started = Instant::now();

        let result = async {
            let session = self.open_graph(graph)?;
            let _guard = self.graph_write_lock(graph).lock_owned().await;
            let existed = !session.is_empty().await?;
            session.clear().await?;
            Ok(existed)
        }
        .await;

        metrics::record_resource_operation("delete", result.as_ref().err(), started.elapsed());
        result
    }
}
