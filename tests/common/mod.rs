use std::fs;
use std::path::PathBuf;

use csvchat::api::ApiClient;
use csvchat::config::ApiConfig;
use tempfile::TempDir;
use wiremock::MockServer;

/// Construct an `ApiClient` whose base is `/api` on the given mock server.
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&api_config_for(server)).expect("failed to build api client")
}

/// API configuration pointing at the given mock server.
#[allow(dead_code)]
pub fn api_config_for(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/api", server.uri()),
        ..ApiConfig::default()
    }
}

/// Write a CSV file into a fresh temp dir.
#[allow(dead_code)]
pub fn temp_csv(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("failed to write csv file");
    (temp_dir, path)
}

/// Serialize stream events as newline-terminated NDJSON.
#[allow(dead_code)]
pub fn ndjson(events: &[serde_json::Value]) -> String {
    events.iter().map(|event| format!("{}\n", event)).collect()
}
