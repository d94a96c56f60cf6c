use crate::{
    ResourceStoreManager, sparql,
    error::{Result, ResourceStoreError},
    types::SelectQueryResponse,
};

/// The four SPARQL query forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
    Describe,
}

impl QueryForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryForm::Select => "SELECT",
            QueryForm::Ask => "ASK",
            QueryForm::Construct => "CONSTRUCT",
            QueryForm::Describe => "DESCRIBE",
        }
    }
}

/// A bound, single-use query execution.
///
/// The query text is parsed when the execution is created, so syntax errors
/// surface before any network round-trip. Execution methods take `self`,
/// making "at most one execution per handle" a compile-time guarantee.
pub struct QueryExecution<'a> {
    manager: &'a ResourceStoreManager,
    form: QueryForm,
    text: String,
}

impl ResourceStoreManager {
    /// Parse a SPARQL query and bind it to this store for a single
    /// execution.
    ///
    /// Queries read across all graphs of the store; scoping to a named
    /// graph is done with GRAPH patterns in the query text itself.
    pub fn prepare_query(&self, query: &str) -> Result<QueryExecution<'_>> {
        let parsed = spargebra::Query::parse(query, None).map_err(|e| {
            ResourceStoreError::InvalidQuery {
                reason: e.to_string(),
            }
        })?;

        let form = match parsed {
            spargebra::Query::Select { .. } => QueryForm::Select,
            spargebra::Query::Ask { .. } => QueryForm::Ask,
            spargebra::Query::Construct { .. } => QueryForm::Construct,
            spargebra::Query::Describe { .. } => QueryForm::Describe,
        };

        Ok(QueryExecution {
            manager: self,
            form,
            text: query.to_string(),
        })
    }

    /// Execute a SPARQL SELECT and map the bindings into a tabular response.
    pub async fn execute_query_select(&self, query: &str) -> Result<SelectQueryResponse> {
        self.prepare_query(query)?.select().await
    }

    /// Execute a SPARQL ASK.
    pub async fn execute_query_ask(&self, query: &str) -> Result<bool> {
        self.prepare_query(query)?.ask().await
    }

    /// Execute a SPARQL CONSTRUCT, returning the graph serialized as text
    /// in the requested format.
    pub async fn execute_query_construct(&self, query: &str, format: &str) -> Result<String> {
        self.prepare_query(query)?.construct(format).await
    }

    /// Execute a SPARQL DESCRIBE, serialized like CONSTRUCT.
    pub async fn execute_query_describe(&self, query: &str, format: &str) -> Result<String> {
        self.prepare_query(query)?.describe(format).await
    }
}

impl QueryExecution<'_> {
    pub fn form(&self) -> QueryForm {
        self.form
    }

    fn expect_form(&self, expected: QueryForm) -> Result<()> {
        if self.form == expected {
            Ok(())
        } else {
            Err(ResourceStoreError::InvalidQuery {
                reason: format!(
                    "expected a {} query, found {}",
                    expected.as_str(),
                    self.form.as_str()
                ),
            })
        }
    }

    pub async fn select(self) -> Result<SelectQueryResponse> {
        self.expect_form(QueryForm::Select)?;
        let json = self
            .manager
            .backend_select(&self.text, self.manager.config.timeouts.query_timeout())
            .await?;
        sparql::parse_select_response(&json)
    }

    pub async fn ask(self) -> Result<bool> {
        self.expect_form(QueryForm::Ask)?;
        self.manager
            .backend_ask(&self.text, self.manager.config.timeouts.ask_timeout())
            .await
    }

    pub async fn construct(self, format: &str) -> Result<String> {
        self.expect_form(QueryForm::Construct)?;
        self.run_graph_query(format).await
    }

    pub async fn describe(self, format: &str) -> Result<String> {
        self.expect_form(QueryForm::Describe)?;
        self.run_graph_query(format).await
    }

    async fn run_graph_query(self, format: &str) -> Result<String> {
        let bytes = self
            .manager
            .backend_construct(
                &self.text,
                format,
                self.manager.config.timeouts.query_timeout(),
            )
            .await?;
        String::from_utf8(bytes).map_err(|e| ResourceStoreError::ParseError {
            reason: format!("Query result is not valid UTF-8: {e}"),
        })
    }
}
