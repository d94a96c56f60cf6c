use std::{path::Path, time::Duration};

use async_trait::async_trait;
use oxigraph::{
    io::{RdfFormat, RdfParser, RdfSerializer},
    model::{GraphNameRef, NamedNode, Quad, QuadRef, Term},
    sparql::{QueryResults, SparqlEvaluator},
    store::Store,
};
use serde_json::{Map, Value, json};

use super::GraphStoreBackend;
use crate::error::{Result, ResourceStoreError};

/// Oxigraph embedded triple store backend
///
/// Provides a Rust-native triple store with significantly lower latency
/// than HTTP-based backends (~1-5ms vs ~50-100ms per operation).
pub struct OxigraphBackend {
    store: Store,
}

impl OxigraphBackend {
    /// Create a new Oxigraph backend with persistent storage
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Store::open(&path).map_err(|e| {
            ResourceStoreError::Other(format!("Failed to open Oxigraph store: {}", e))
        })?;

        tracing::info!(
            path = %path.as_ref().display(),
            "Opened Oxigraph persistent store"
        );

        Ok(Self { store })
    }

    /// Create a new in-memory Oxigraph backend (for testing)
    pub fn in_memory() -> Result<Self> {
        let store = Store::new().map_err(|e| {
            ResourceStoreError::Other(format!("Failed to create in-memory Oxigraph store: {}", e))
        })?;

        tracing::info!("Created in-memory Oxigraph store");

        Ok(Self { store })
    }

    /// Parse `content` as `format` into quads bound to the named graph.
    ///
    /// Parsing happens before any store mutation, so malformed content
    /// never leaves a graph partially written.
    fn parse_content(graph: &str, content: &[u8], format: &str) -> Result<Vec<Quad>> {
        let format = resolve_format(format)?;
        let graph = parse_graph_iri(graph)?;

        RdfParser::from_format(format)
            .without_named_graphs()
            .with_default_graph(graph)
            .for_reader(content)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ResourceStoreError::ParseError {
                reason: format!("Failed to parse RDF content: {e}"),
            })
    }
}

#[async_trait]
impl GraphStoreBackend for OxigraphBackend {
    fn name(&self) -> &'static str {
        "oxigraph"
    }

    async fn health_check(&self) -> Result<bool> {
        // Oxigraph is embedded, so if we have a store, it's healthy.
        // Do a simple query to verify it's working.
        let result = SparqlEvaluator::new()
            .parse_query("ASK { ?s ?p ?o }")
            .map_err(|e| {
                ResourceStoreError::Other(format!("Health check query parse failed: {}", e))
            })?
            .on_store(&self.store)
            .execute()
            .map_err(|e| ResourceStoreError::Other(format!("Health check query failed: {}", e)))?;

        match result {
            QueryResults::Boolean(_) => Ok(true),
            _ => Ok(false),
        }
    }

    async fn merge_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        _timeout: Duration,
    ) -> Result<()> {
        let quads = Self::parse_content(graph, content, format)?;

        // Disk I/O runs on the blocking thread pool
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            for quad in &quads {
                store.insert(quad.as_ref()).map_err(|e| {
                    ResourceStoreError::Other(format!("Failed to insert quad: {}", e))
                })?;
            }
            Ok(())
        })
        .await
        .map_err(|e| ResourceStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn replace_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        _timeout: Duration,
    ) -> Result<()> {
        let quads = Self::parse_content(graph, content, format)?;

        let drop = SparqlEvaluator::new()
            .parse_update(&format!("DROP SILENT GRAPH <{graph}>"))
            .map_err(|e| ResourceStoreError::InvalidQuery {
                reason: format!("Failed to parse SPARQL UPDATE: {}", e),
            })?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            drop.on_store(&store)
                .execute()
                .map_err(|e| ResourceStoreError::Other(format!("SPARQL UPDATE failed: {}", e)))?;
            for quad in &quads {
                store.insert(quad.as_ref()).map_err(|e| {
                    ResourceStoreError::Other(format!("Failed to insert quad: {}", e))
                })?;
            }
            Ok(())
        })
        .await
        .map_err(|e| ResourceStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn select(&self, query: &str, _timeout: Duration) -> Result<String> {
        let prepared = SparqlEvaluator::new().parse_query(query).map_err(|e| {
            ResourceStoreError::InvalidQuery {
                reason: format!("Failed to parse SPARQL SELECT: {}", e),
            }
        })?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let result = prepared
                .on_store(&store)
                .execute()
                .map_err(|e| ResourceStoreError::Other(format!("SPARQL SELECT failed: {}", e)))?;

            match result {
                QueryResults::Solutions(solutions) => {
                    let vars: Vec<String> = solutions
                        .variables()
                        .iter()
                        .map(|v| v.as_str().to_string())
                        .collect();

                    let mut bindings = Vec::new();
                    for solution in solutions {
                        let solution = solution.map_err(|e| {
                            ResourceStoreError::Other(format!("Failed to read solution: {}", e))
                        })?;
                        let mut row = Map::new();
                        for (var, term) in solution.iter() {
                            row.insert(var.as_str().to_string(), term_to_json(term));
                        }
                        bindings.push(Value::Object(row));
                    }

                    Ok(json!({
                        "head": { "vars": vars },
                        "results": { "bindings": bindings },
                    })
                    .to_string())
                }
                _ => Err(ResourceStoreError::Other(
                    "Expected SELECT to return solutions".to_string(),
                )),
            }
        })
        .await
        .map_err(|e| ResourceStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn ask(&self, query: &str, _timeout: Duration) -> Result<bool> {
        let prepared = SparqlEvaluator::new().parse_query(query).map_err(|e| {
            ResourceStoreError::InvalidQuery {
                reason: format!("Failed to parse SPARQL ASK: {}", e),
            }
        })?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let result = prepared
                .on_store(&store)
                .execute()
                .map_err(|e| ResourceStoreError::Other(format!("SPARQL ASK failed: {}", e)))?;

            match result {
                QueryResults::Boolean(value) => Ok(value),
                _ => Err(ResourceStoreError::Other(
                    "Expected ASK to return boolean result".to_string(),
                )),
            }
        })
        .await
        .map_err(|e| ResourceStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn construct(&self, query: &str, format: &str, _timeout: Duration) -> Result<Vec<u8>> {
        let format = resolve_format(format)?;
        let prepared = SparqlEvaluator::new().parse_query(query).map_err(|e| {
            ResourceStoreError::InvalidQuery {
                reason: format!("Failed to parse SPARQL CONSTRUCT: {}", e),
            }
        })?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let result = prepared.on_store(&store).execute().map_err(|e| {
                ResourceStoreError::Other(format!("SPARQL CONSTRUCT failed: {}", e))
            })?;

            match result {
                QueryResults::Graph(triples) => {
                    let mut serializer =
                        RdfSerializer::from_format(format).for_writer(Vec::new());
                    for triple in triples {
                        let triple = triple.map_err(|e| {
                            ResourceStoreError::Other(format!("Failed to read triple: {}", e))
                        })?;
                        serializer
                            .serialize_quad(QuadRef::new(
                                &triple.subject,
                                &triple.predicate,
                                &triple.object,
                                GraphNameRef::DefaultGraph,
                            ))
                            .map_err(|e| {
                                ResourceStoreError::Other(format!(
                                    "Failed to serialize triple: {}",
                                    e
                                ))
                            })?;
                    }
                    serializer.finish().map_err(|e| {
                        ResourceStoreError::Other(format!("Failed to finish serialization: {}", e))
                    })
                }
                _ => Err(ResourceStoreError::Other(
                    "Expected CONSTRUCT to return graph results".to_string(),
                )),
            }
        })
        .await
        .map_err(|e| ResourceStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn update(&self, query: &str, _timeout: Duration) -> Result<()> {
        // Parse the update first (CPU-bound, but fast)
        let prepared = SparqlEvaluator::new().parse_update(query).map_err(|e| {
            ResourceStoreError::InvalidQuery {
                reason: format!("Failed to parse SPARQL UPDATE: {}", e),
            }
        })?;

        // Execute on blocking thread pool since Oxigraph's update involves disk I/O
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            prepared
                .on_store(&store)
                .execute()
                .map_err(|e| ResourceStoreError::Other(format!("SPARQL UPDATE failed: {}", e)))
        })
        .await
        .map_err(|e| ResourceStoreError::Other(format!("Task join error: {}", e)))??;

        Ok(())
    }
}

fn parse_graph_iri(graph: &str) -> Result<NamedNode> {
    NamedNode::new(graph).map_err(|e| ResourceStoreError::InvalidGraphName {
        reason: format!("{graph}: {e}"),
    })
}

/// Resolve an opaque serialization token against Oxigraph's format table.
///
/// Accepts media types and the short names commonly used by triple store
/// clients. Unknown tokens are a serializer failure, not a core concern.
fn resolve_format(token: &str) -> Result<RdfFormat> {
    if let Some(format) = RdfFormat::from_media_type(token) {
        return Ok(format);
    }

    match token.to_ascii_uppercase().as_str() {
        "TURTLE" | "TTL" => Ok(RdfFormat::Turtle),
        "N-TRIPLES" | "N-TRIPLE" | "NTRIPLES" | "NT" => Ok(RdfFormat::NTriples),
        "RDF/XML" | "RDF/XML-ABBREV" | "RDFXML" => Ok(RdfFormat::RdfXml),
        "N-QUADS" | "NQUADS" | "NQ" => Ok(RdfFormat::NQuads),
        "TRIG" => Ok(RdfFormat::TriG),
        "N3" => Ok(RdfFormat::N3),
        _ => Err(ResourceStoreError::ParseError {
            reason: format!("Unsupported RDF format token: {token}"),
        }),
    }
}

fn term_to_json(term: &Term) -> Value {
    match term {
        Term::NamedNode(node) => json!({
            "type": "uri",
            "value": node.as_str(),
        }),
        Term::BlankNode(node) => json!({
            "type": "bnode",
            "value": node.as_str(),
        }),
        Term::Literal(literal) => {
            let mut object = Map::new();
            object.insert("type".to_string(), Value::String("literal".to_string()));
            object.insert(
                "value".to_string(),
                Value::String(literal.value().to_string()),
            );
            if let Some(language) = literal.language() {
                object.insert(
                    "xml:lang".to_string(),
                    Value::String(language.to_string()),
                );
            } else if literal.datatype() != oxigraph::model::vocab::xsd::STRING {
                object.insert(
                    "datatype".to_string(),
                    Value::String(literal.datatype().as_str().to_string()),
                );
            }
            Value::Object(object)
        }
        _ => json!({
            "type": "literal",
            "value": term.to_string(),
        }),
    }
}
