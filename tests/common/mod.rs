//! Common test utilities for E2E tests

use gigboard::data::ConflictPolicy;
use gigboard::{AppState, config};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Temporary directory for the remote store and the device cache
        let temp_dir = TempDir::new().unwrap();

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            remote: config::RemoteConfig {
                path: temp_dir.path().join("remote.db"),
            },
            cache: config::CacheConfig {
                path: temp_dir.path().join("device-cache.db"),
                memory_capacity: 64,
            },
            sync: config::SyncConfig {
                enabled: false,
                interval_seconds: 300,
                policy: ConflictPolicy::RemoteWins,
            },
            app: config::LocaleConfig {
                default_language: "en".to_string(),
                supported_languages: vec!["en".to_string(), "hi".to_string()],
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = gigboard::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a worker through the API and return the response body
    #[allow(dead_code)]
    pub async fn register_worker(
        &self,
        name: &str,
        phone: &str,
        skill: &str,
        available: bool,
    ) -> Value {
        let response = self
            .client
            .post(self.url("/api/workers"))
            .json(&json!({
                "name": name,
                "phone": phone,
                "location": "Pune",
                "skill": skill,
                "available": available,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "registration of {name} failed");
        response.json().await.unwrap()
    }
}
