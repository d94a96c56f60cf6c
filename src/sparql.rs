use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    error::{Result, ResourceStoreError},
    types::SelectQueryResponse,
};

#[derive(Deserialize)]
struct SparqlSelectDocument {
    head: SparqlSelectHead,
    results: SparqlSelectResults,
}

#[derive(Deserialize)]
struct SparqlSelectHead {
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct SparqlSelectResults {
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Deserialize)]
struct SparqlTerm {
    value: String,
}

#[derive(Deserialize)]
struct SparqlAskDocument {
    boolean: bool,
}

/// Map a SPARQL results JSON document into a tabular SELECT response.
///
/// Columns come from the declared projection (`head.vars`), never from the
/// first binding row, so rows with unbound OPTIONAL variables keep their
/// positional alignment; unbound cells are empty strings.
pub(crate) fn parse_select_response(json: &str) -> Result<SelectQueryResponse> {
    let document: SparqlSelectDocument =
        serde_json::from_str(json).map_err(|e| ResourceStoreError::ParseError {
            reason: format!("Failed to parse SELECT response: {e}"),
        })?;

    let mut response = SelectQueryResponse::new(document.head.vars);
    for binding in document.results.bindings {
        let row = response
            .columns()
            .iter()
            .map(|column| {
                binding
                    .get(column)
                    .map(|term| term.value.clone())
                    .unwrap_or_default()
            })
            .collect();
        response.push_row(row);
    }

    Ok(response)
}

pub(crate) fn parse_ask_response(json: &str) -> Result<bool> {
    let document: SparqlAskDocument =
        serde_json::from_str(json).map_err(|e| ResourceStoreError::ParseError {
            reason: format!("Failed to parse ASK response: {e}"),
        })?;

    Ok(document.boolean)
}
