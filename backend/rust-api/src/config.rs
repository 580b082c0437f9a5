use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// "mongo" or "memory".
    pub storage_backend: String,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub interpret_base_url: String,
    pub interpret_api_key: Option<String>,
    pub interpret_model: String,
    pub bind_addr: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env_name = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env_name)).required(false),
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let storage_backend = settings
            .get_string("storage.backend")
            .or_else(|_| env::var("STORAGE_BACKEND"))
            .unwrap_or_else(|_| "mongo".to_string());

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "speaklingo".to_string());

        let jwt_secret = settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                if env_name == "prod" {
                    panic!("FATAL: JWT_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            });

        let interpret_base_url = settings
            .get_string("interpret.base_url")
            .or_else(|_| env::var("ANTHROPIC_BASE_URL"))
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());

        let interpret_api_key = settings
            .get_string("interpret.api_key")
            .or_else(|_| env::var("ANTHROPIC_API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());

        let interpret_model = settings
            .get_string("interpret.model")
            .or_else(|_| env::var("ANTHROPIC_MODEL"))
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Config {
            storage_backend,
            mongo_uri,
            mongo_database,
            jwt_secret,
            interpret_base_url,
            interpret_api_key,
            interpret_model,
            bind_addr,
        })
    }

    /// Fixed configuration for unit tests: in-memory storage and an
    /// interpretation endpoint that fails fast.
    pub fn for_tests() -> Self {
        Self {
            storage_backend: "memory".to_string(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: "speaklingo-test".to_string(),
            jwt_secret: "test-secret".to_string(),
            interpret_base_url: "http://127.0.0.1:1".to_string(),
            interpret_api_key: Some("test-key".to_string()),
            interpret_model: "claude-sonnet-4-20250514".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}
