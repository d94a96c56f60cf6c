mod queries;

use tempfile::TempDir;

use crate::{
    ResourceStoreBackendType, ResourceStoreConfig, ResourceStoreManager, TimeoutConfig,
};

pub(super) fn test_config(max_concurrent_operations: usize) -> ResourceStoreConfig {
    ResourceStoreConfig {
        backend: ResourceStoreBackendType::Oxigraph,
        url: "http://localhost:3030".to_string(),
        dataset: "resources".to_string(),
        username: None,
        password: None,
        connect_max_retries: 1,
        connect_retry_frequency_ms: 10,
        timeouts: TimeoutConfig {
            query_ms: 10_000,
            update_ms: 10_000,
            ask_ms: 10_000,
        },
        max_concurrent_operations,
    }
}

pub(super) async fn setup_manager() -> (ResourceStoreManager, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(4);
    let manager = match ResourceStoreManager::connect(&config, temp_dir.path()).await {
        Ok(manager) => manager,
        Err(error) => panic!("Failed to initialize Oxigraph backend: {error}"),
    };
    (manager, temp_dir)
}
