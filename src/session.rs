use crate::{
    ResourceStoreManager,
    error::{Result, ResourceStoreError},
};

/// Logical entity tag carried by datasource errors raised from sessions.
pub(crate) const RESOURCE_ENTITY: &str = "Resource";

/// A graph session: a view scoped exclusively to the triples of one named
/// graph. Sessions borrow the manager, so a session can never outlive the
/// operation that opened it, and every exit path releases it.
///
/// Store failures surface when the session is read, written or serialized,
/// collapsed into datasource errors carrying the originating message.
pub struct GraphSession<'a> {
    manager: &'a ResourceStoreManager,
    graph: String,
}

impl ResourceStoreManager {
    /// Open a session scoped to the named graph.
    ///
    /// Validates that the name is usable as a named graph IRI; no further
    /// naming scheme is enforced at this layer.
    pub fn open_graph(&self, graph: &str) -> Result<GraphSession<'_>> {
        validate_graph_iri(graph)?;
        Ok(GraphSession {
            manager: self,
            graph: graph.to_string(),
        })
    }
}

impl GraphSession<'_> {
    pub fn graph(&self) -> &str {
        &self.graph
    }

    /// Serialize all triples of the graph into the requested format.
    ///
    /// An absent graph serializes like an empty one.
    pub async fn serialize(&self, format: &str) -> Result<Vec<u8>> {
        let query = format!(
            r#"CONSTRUCT {{ ?s ?p ?o }}
                WHERE {{
                    GRAPH <{graph}> {{
                        ?s ?p ?o .
                    }}
                }}"#,
            graph = self.graph
        );

        self.manager
            .backend_construct(&query, format, self.manager.config.timeouts.query_timeout())
            .await
            .map_err(|e| ResourceStoreError::datasource(RESOURCE_ENTITY, e))
    }

    /// Parse `content` as `format` and merge the triples into the graph,
    /// keeping pre-existing triples (pure append).
    pub async fn load(&self, content: &[u8], format: &str) -> Result<()> {
        self.manager
            .backend_merge_graph(
                &self.graph,
                content,
                format,
                self.manager.config.timeouts.update_timeout(),
            )
            .await
            .map_err(|e| ResourceStoreError::datasource(RESOURCE_ENTITY, e))
    }

    /// Replace the graph's entire content with the parsed `content` as a
    /// single idempotent store request.
    pub async fn replace(&self, content: &[u8], format: &str) -> Result<()> {
        self.manager
            .backend_replace_graph(
                &self.graph,
                content,
                format,
                self.manager.config.timeouts.update_timeout(),
            )
            .await
            .map_err(|e| ResourceStoreError::datasource(RESOURCE_ENTITY, e))
    }

    /// Remove all triples from the graph. Removing an absent graph is a
    /// no-op, not an error.
    pub async fn clear(&self) -> Result<()> {
        let update = format!("DROP SILENT GRAPH <{graph}>", graph = self.graph);
        self.manager
            .backend_update(&update, self.manager.config.timeouts.update_timeout())
            .await
            .map_err(|e| ResourceStoreError::datasource(RESOURCE_ENTITY, e))
    }

    /// Whether the graph currently holds no triples. "Never created" and
    /// "exists but empty" are indistinguishable.
    pub async fn is_empty(&self) -> Result<bool> {
        let query = format!(
            r#"ASK {{
                GRAPH <{graph}> {{
                    ?s ?p ?o
                }}
            }}"#,
            graph = self.graph
        );

        let non_empty = self
            .manager
            .backend_ask(&query, self.manager.config.timeouts.ask_timeout())
            .await
            .map_err(|e| ResourceStoreError::datasource(RESOURCE_ENTITY, e))?;
        Ok(!non_empty)
    }
}

/// Reject names that are empty or cannot be embedded in SPARQL as
/// `<IRI>` without changing the query's meaning.
pub(crate) fn validate_graph_iri(graph: &str) -> Result<()> {
    if graph.is_empty() {
        return Err(ResourceStoreError::InvalidGraphName {
            reason: "graph name must not be empty".to_string(),
        });
    }
    if graph
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | '{' | '}'))
    {
        return Err(ResourceStoreError::InvalidGraphName {
            reason: format!("graph name contains characters not allowed in an IRI: {graph}"),
        });
    }
    Ok(())
}
