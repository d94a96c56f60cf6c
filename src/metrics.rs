use std::time::Duration;

use metrics::{counter, histogram};

use crate::error::ResourceStoreError;

pub(crate) fn record_backend_query_bytes_total(backend: &str, op: &str, bytes: usize) {
    counter!(
        "resource_store_backend_query_bytes_total",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .increment(bytes as u64);
}

pub(crate) fn record_backend_result_bytes_total(backend: &str, op: &str, bytes: usize) {
    counter!(
        "resource_store_backend_result_bytes_total",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .increment(bytes as u64);
}

pub(crate) fn record_backend_permit_wait(backend: &str, op: &str, wait: Duration) {
    histogram!(
        "resource_store_backend_permit_wait_seconds",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .record(wait.as_secs_f64());
}

pub(crate) fn record_backend_permit_snapshot(backend: &str, max: usize, available: usize) {
    histogram!(
        "resource_store_backend_permits_in_use",
        "backend" => backend.to_string()
    )
    .record(max.saturating_sub(available) as f64);
}

pub(crate) fn record_backend_operation(
    backend: &str,
    op: &str,
    error: Option<&ResourceStoreError>,
    duration: Duration,
) {
    let status = if error.is_some() { "error" } else { "ok" };
    let error_class = error.map_or("none", classify_error);

    counter!(
        "resource_store_backend_operations_total",
        "backend" => backend.to_string(),
        "op" => op.to_string(),
        "status" => status.to_string(),
        "error_class" => error_class.to_string()
    )
    .increment(1);

    histogram!(
        "resource_store_backend_operation_duration_seconds",
        "backend" => backend.to_string(),
        "op" => op.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

pub(crate) fn record_resource_operation(
    op: &str,
    error: Option<&ResourceStoreError>,
    duration: Duration,
) {
    let status = if error.is_some() { "error" } else { "ok" };
    let error_class = error.map_or("none", classify_error);

    counter!(
        "resource_store_operations_total",
        "op" => op.to_string(),
        "status" => status.to_string(),
        "error_class" => error_class.to_string()
    )
    .increment(1);

    histogram!(
        "resource_store_operation_duration_seconds",
        "op" => op.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

fn classify_error(error: &ResourceStoreError) -> &'static str {
    match error {
        ResourceStoreError::SemaphoreClosed => "semaphore_closed",
        ResourceStoreError::Http(_) => "http",
        ResourceStoreError::Io(_) => "io",
        ResourceStoreError::Backend { status, .. } if *status >= 500 => "backend_5xx",
        ResourceStoreError::Backend { status, .. } if *status >= 400 => "backend_4xx",
        ResourceStoreError::Backend { .. } => "backend_other",
        ResourceStoreError::ConnectionFailed { .. } => "connection_failed",
        ResourceStoreError::ParseError { .. } => "parse_error",
        ResourceStoreError::InvalidQuery { .. } => "invalid_query",
        ResourceStoreError::Datasource { .. } => "datasource",
        ResourceStoreError::InvalidGraphName { .. } => "invalid_graph_name",
        ResourceStoreError::Other(_) => "other",
    }
}
