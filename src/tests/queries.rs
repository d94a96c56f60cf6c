#![allow(clippy::unwrap_used)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use super::{setup_manager, test_config};
use crate::{
    GraphStoreBackend, ResourceStoreManager,
    error::{Result, ResourceStoreError},
};

const NTRIPLES: &str = "application/n-triples";

async fn seed_people(manager: &ResourceStoreManager) {
    manager
        .raw_update_for_tests(
            r#"INSERT DATA {
                <http://example.org/alice> <http://xmlns.com/foaf/0.1/name> "Alice" .
                <http://example.org/alice> <http://xmlns.com/foaf/0.1/mbox> <mailto:alice@example.org> .
                <http://example.org/bob> <http://xmlns.com/foaf/0.1/name> "Bob" .
            }"#,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn select_returns_projection_columns_and_rows() {
    let (manager, _temp_dir) = setup_manager().await;
    seed_people(&manager).await;

    let response = manager
        .execute_query_select(
            r#"SELECT ?person ?name WHERE {
                ?person <http://xmlns.com/foaf/0.1/name> ?name .
            } ORDER BY ?name"#,
        )
        .await
        .unwrap();

    assert_eq!(response.columns(), &["person", "name"]);
    assert_eq!(response.row_count(), 2);
    assert_eq!(
        response.rows()[0],
        vec![
            "http://example.org/alice".to_string(),
            "Alice".to_string()
        ]
    );
    assert_eq!(
        response.rows()[1],
        vec!["http://example.org/bob".to_string(), "Bob".to_string()]
    );
}

#[tokio::test]
async fn select_unbound_optional_yields_empty_cells() {
    let (manager, _temp_dir) = setup_manager().await;
    seed_people(&manager).await;

    let response = manager
        .execute_query_select(
            r#"SELECT ?name ?mbox WHERE {
                ?person <http://xmlns.com/foaf/0.1/name> ?name .
                OPTIONAL { ?person <http://xmlns.com/foaf/0.1/mbox> ?mbox }
            } ORDER BY ?name"#,
        )
        .await
        .unwrap();

    assert_eq!(response.columns(), &["name", "mbox"]);
    assert_eq!(
        response.rows()[0],
        vec!["Alice".to_string(), "mailto:alice@example.org".to_string()]
    );
    // Bob has no mailbox; the cell stays aligned and empty
    assert_eq!(response.rows()[1], vec!["Bob".to_string(), String::new()]);
}

#[tokio::test]
async fn select_with_no_matches_keeps_declared_columns() {
    let (manager, _temp_dir) = setup_manager().await;

    let response = manager
        .execute_query_select(
            "SELECT ?s ?o WHERE { ?s <http://example.org/no-such-predicate> ?o }",
        )
        .await
        .unwrap();

    assert_eq!(response.columns(), &["s", "o"]);
    assert!(response.is_empty());
}

#[tokio::test]
async fn select_scoped_with_a_graph_pattern() {
    let (manager, _temp_dir) = setup_manager().await;
    let graph = "http://example.org/graphs/scoped";

    manager
        .insert_resource(
            graph,
            br#"<http://example.org/s1> <http://example.org/p1> "scoped" ."#,
            NTRIPLES,
        )
        .await
        .unwrap();

    let response = manager
        .execute_query_select(&format!(
            "SELECT ?o WHERE {{ GRAPH <{graph}> {{ ?s ?p ?o }} }}"
        ))
        .await
        .unwrap();

    assert_eq!(response.row_count(), 1);
    assert_eq!(response.rows()[0], vec!["scoped".to_string()]);
}

#[tokio::test]
async fn ask_reports_presence_and_absence() {
    let (manager, _temp_dir) = setup_manager().await;
    seed_people(&manager).await;

    let present = manager
        .execute_query_ask(
            r#"ASK { ?s <http://xmlns.com/foaf/0.1/name> "Alice" }"#,
        )
        .await
        .unwrap();
    assert!(present);

    let absent = manager
        .execute_query_ask(
            r#"ASK { ?s <http://xmlns.com/foaf/0.1/name> "Nobody" }"#,
        )
        .await
        .unwrap();
    assert!(!absent);
}

#[tokio::test]
async fn construct_serializes_the_derived_graph() {
    let (manager, _temp_dir) = setup_manager().await;
    seed_people(&manager).await;

    let text = manager
        .execute_query_construct(
            r#"CONSTRUCT { ?person <http://example.org/label> ?name } WHERE {
                ?person <http://xmlns.com/foaf/0.1/name> ?name .
            }"#,
            NTRIPLES,
        )
        .await
        .unwrap();

    assert!(text.contains(
        r#"<http://example.org/alice> <http://example.org/label> "Alice" ."#
    ));
    assert!(text.contains(
        r#"<http://example.org/bob> <http://example.org/label> "Bob" ."#
    ));
}

#[tokio::test]
async fn describe_serializes_the_resource_neighbourhood() {
    let (manager, _temp_dir) = setup_manager().await;
    seed_people(&manager).await;

    let text = manager
        .execute_query_describe("DESCRIBE <http://example.org/alice>", NTRIPLES)
        .await
        .unwrap();

    assert!(text.contains("http://example.org/alice"));
    assert!(text.contains("Alice"));
}

struct CountingBackend {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl GraphStoreBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn merge_graph(
        &self,
        _graph: &str,
        _content: &[u8],
        _format: &str,
        _timeout: Duration,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn replace_graph(
        &self,
        _graph: &str,
        _content: &[u8],
        _format: &str,
        _timeout: Duration,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn select(&self, _query: &str, _timeout: Duration) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("{\"head\":{\"vars\":[]},\"results\":{\"bindings\":[]}}".to_string())
    }

    async fn ask(&self, _query: &str, _timeout: Duration) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    async fn construct(
        &self,
        _query: &str,
        _format: &str,
        _timeout: Duration,
    ) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn update(&self, _query: &str, _timeout: Duration) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn malformed_query_fails_before_reaching_the_backend() {
    let calls = Arc::new(AtomicUsize::new(0));
    let manager = ResourceStoreManager::from_backend_for_tests(
        Box::new(CountingBackend {
            calls: Arc::clone(&calls),
        }),
        test_config(4),
    );

    let result = manager.execute_query_select("SELECT WHERE {{{").await;
    assert!(matches!(
        result,
        Err(ResourceStoreError::InvalidQuery { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn query_form_mismatch_is_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let manager = ResourceStoreManager::from_backend_for_tests(
        Box::new(CountingBackend {
            calls: Arc::clone(&calls),
        }),
        test_config(4),
    );

    let result = manager.execute_query_select("ASK { ?s ?p ?o }").await;
    assert!(matches!(
        result,
        Err(ResourceStoreError::InvalidQuery { .. })
    ));

    let result = manager
        .execute_query_ask("SELECT ?s WHERE { ?s ?p ?o }")
        .await;
    assert!(matches!(
        result,
        Err(ResourceStoreError::InvalidQuery { .. })
    ));

    let result = manager
        .execute_query_construct("ASK { ?s ?p ?o }", NTRIPLES)
        .await;
    assert!(matches!(
        result,
        Err(ResourceStoreError::InvalidQuery { .. })
    ));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn prepared_query_reports_its_form() {
    let (manager, _temp_dir) = setup_manager().await;

    let execution = manager
        .prepare_query("SELECT ?s WHERE { ?s ?p ?o }")
        .unwrap();
    assert_eq!(execution.form(), crate::QueryForm::Select);

    let execution = manager.prepare_query("ASK { ?s ?p ?o }").unwrap();
    assert_eq!(execution.form(), crate::QueryForm::Ask);
}

struct InvalidSelectBackend;

#[async_trait]
impl GraphStoreBackend for InvalidSelectBackend {
    fn name(&self) -> &'static str {
        "invalid-select"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn merge_graph(
        &self,
        _graph: &str,
        _content: &[u8],
        _format: &str,
        _timeout: Duration,
    ) -> Result<()> {
        Ok(())
    }

    async fn replace_graph(
        &self,
        _graph: &str,
        _content: &[u8],
        _format: &str,
        _timeout: Duration,
    ) -> Result<()> {
        Ok(())
    }

    async fn select(&self, _query: &str, _timeout: Duration) -> Result<String> {
        Ok("not-json".to_string())
    }

    async fn ask(&self, _query: &str, _timeout: Duration) -> Result<bool> {
        Ok(false)
    }

    async fn construct(
        &self,
        _query: &str,
        _format: &str,
        _timeout: Duration,
    ) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    async fn update(&self, _query: &str, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn unparseable_select_body_is_a_parse_error() {
    let manager = ResourceStoreManager::from_backend_for_tests(
        Box::new(InvalidSelectBackend),
        test_config(4),
    );

    let result = manager
        .execute_query_select("SELECT ?s WHERE { ?s ?p ?o }")
        .await;
    assert!(matches!(
        result,
        Err(ResourceStoreError::ParseError { .. })
    ));
}

#[test]
fn select_response_parsing_uses_declared_vars() {
    let json = r#"{
        "head": { "vars": ["a", "b"] },
        "results": { "bindings": [
            { "a": { "type": "uri", "value": "http://example.org/x" },
              "b": { "type": "literal", "value": "one" } },
            { "a": { "type": "uri", "value": "http://example.org/y" } }
        ] }
    }"#;

    let response = crate::sparql::parse_select_response(json).unwrap();
    assert_eq!(response.columns(), &["a", "b"]);
    assert_eq!(
        response.rows()[0],
        vec!["http://example.org/x".to_string(), "one".to_string()]
    );
    assert_eq!(
        response.rows()[1],
        vec!["http://example.org/y".to_string(), String::new()]
    );
}

#[test]
fn ask_response_parsing() {
    assert!(crate::sparql::parse_ask_response(r#"{"head":{},"boolean":true}"#).unwrap());
    assert!(!crate::sparql::parse_ask_response(r#"{"head":{},"boolean":false}"#).unwrap());
    assert!(crate::sparql::parse_ask_response("nope").is_err());
}
