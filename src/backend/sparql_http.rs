use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::GraphStoreBackend;
use crate::{
    config::ResourceStoreConfig,
    error::{Result, ResourceStoreError},
    sparql,
};

/// Remote SPARQL 1.1 server backend.
///
/// Speaks the SPARQL Protocol for queries and updates and the Graph Store
/// Protocol for whole-graph reads and writes, using the Fuseki-style
/// endpoint layout from the configuration.
pub struct SparqlHttpBackend {
    client: Client,
    config: ResourceStoreConfig,
}

impl SparqlHttpBackend {
    /// Create a new SPARQL endpoint backend
    pub fn new(config: ResourceStoreConfig) -> Result<Self> {
        let client = Client::builder()
            // Connection pooling: keep up to 10 idle connections per host
            .pool_max_idle_per_host(10)
            // Close idle connections after 30 seconds
            .pool_idle_timeout(Duration::from_secs(30))
            // TCP keepalive to detect dead connections
            .tcp_keepalive(Duration::from_secs(60))
            // Timeout for establishing new connections
            .connect_timeout(Duration::from_secs(10))
            // Default request timeout (overridden per-request)
            .timeout(Duration::from_millis(config.timeouts.query_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Build request with optional authentication
    fn auth_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => builder.basic_auth(user, Some(pass)),
            _ => builder,
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ResourceStoreError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ResourceStoreError::Backend { status, message }
    }
}

#[async_trait]
impl GraphStoreBackend for SparqlHttpBackend {
    fn name(&self) -> &'static str {
        "sparql-endpoint"
    }

    async fn health_check(&self) -> Result<bool> {
        // A trivial ASK exercises the full query path without touching data
        let response = self
            .auth_headers(self.client.post(self.config.query_endpoint()))
            .header("Content-Type", "application/sparql-query")
            .header("Accept", "application/sparql-results+json")
            .timeout(Duration::from_secs(10))
            .body("ASK {}")
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    async fn merge_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        timeout: Duration,
    ) -> Result<()> {
        let response = self
            .auth_headers(self.client.post(self.config.graph_store_endpoint()))
            .query(&[("graph", graph)])
            .header("Content-Type", format)
            .timeout(timeout + Duration::from_secs(5))
            .body(content.to_vec())
            .send()
            .await?;

        // 201 when the graph is created by the request, 200/204 otherwise
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn replace_graph(
        &self,
        graph: &str,
        content: &[u8],
        format: &str,
        timeout: Duration,
    ) -> Result<()> {
        let response = self
            .auth_headers(self.client.put(self.config.graph_store_endpoint()))
            .query(&[("graph", graph)])
            .header("Content-Type", format)
            .timeout(timeout + Duration::from_secs(5))
            .body(content.to_vec())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn select(&self, query: &str, timeout: Duration) -> Result<String> {
        let response = self
            .auth_headers(self.client.post(self.config.query_endpoint()))
            .header("Content-Type", "application/sparql-query")
            .header("Accept", "application/sparql-results+json")
            .timeout(timeout + Duration::from_secs(5))
            .body(query.to_string())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn ask(&self, query: &str, timeout: Duration) -> Result<bool> {
        let response = self
            .auth_headers(self.client.post(self.config.query_endpoint()))
            .header("Content-Type", "application/sparql-query")
            .header("Accept", "application/sparql-results+json")
            .timeout(timeout + Duration::from_secs(5))
            .body(query.to_string())
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.text().await?;
            sparql::parse_ask_response(&body)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn construct(&self, query: &str, format: &str, timeout: Duration) -> Result<Vec<u8>> {
        let response = self
            .auth_headers(self.client.post(self.config.query_endpoint()))
            .header("Content-Type", "application/sparql-query")
            .header("Accept", format)
            .timeout(timeout + Duration::from_secs(5))
            .body(query.to_string())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.bytes().await?.to_vec())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn update(&self, query: &str, timeout: Duration) -> Result<()> {
        let response = self
            .auth_headers(self.client.post(self.config.update_endpoint()))
            .header("Content-Type", "application/sparql-update")
            .timeout(timeout + Duration::from_secs(5))
            .body(query.to_string())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }
}
