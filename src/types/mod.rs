use serde::Serialize;

/// A graph resource: an immutable byte payload holding the graph's triples
/// serialized in some format. The format tag travels alongside the payload,
/// carried by the caller; it is not stored on the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    content: Vec<u8>,
}

impl Resource {
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }
}

/// Tabular result of a SPARQL SELECT query.
///
/// Columns are fixed at construction from the query's declared projection;
/// every row has exactly one string cell per column, with unbound variables
/// rendered as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectQueryResponse {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SelectQueryResponse {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Ordered column names, matching the query projection
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major positional cell values
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
