//! Application configuration

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,

    // Database (absent = in-memory store)
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    // Supabase
    pub supabase_url: String,
    pub supabase_jwt_secret: String,
    pub supabase_service_role_key: String,
    pub knowledge_base_bucket: String,

    // Upstream agent API
    pub lyzr_api_key: Option<String>,
    pub lyzr_api_url: String,
    pub lyzr_request_timeout_ms: u64,

    // Chat
    pub ticket_confidence_threshold: f64,
    pub widget_script_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "26214400".to_string()) // 25MB default
                .parse()
                .unwrap_or(26_214_400),

            // Database
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            run_migrations: env::var("RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),

            // Supabase
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            supabase_jwt_secret: {
                let secret = env::var("SUPABASE_JWT_SECRET")
                    .map_err(|_| ConfigError::Missing("SUPABASE_JWT_SECRET"))?;
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "SUPABASE_JWT_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_default(),
            knowledge_base_bucket: env::var("KNOWLEDGE_BASE_BUCKET")
                .unwrap_or_else(|_| "knowledge-base".to_string()),

            // Upstream agent API
            lyzr_api_key: env::var("LYZR_API_KEY").ok().filter(|v| !v.is_empty()),
            lyzr_api_url: env::var("LYZR_API_URL")
                .unwrap_or_else(|_| "https://api.lyzr.ai".to_string())
                .trim_end_matches('/')
                .to_string(),
            lyzr_request_timeout_ms: env::var("LYZR_REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000),

            // Chat
            ticket_confidence_threshold: {
                let raw = env::var("TICKET_CONFIDENCE_THRESHOLD")
                    .unwrap_or_else(|_| "0.7".to_string());
                let threshold: f64 = raw.parse().map_err(|_| {
                    ConfigError::Invalid("TICKET_CONFIDENCE_THRESHOLD must be a number")
                })?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(ConfigError::Invalid(
                        "TICKET_CONFIDENCE_THRESHOLD must be between 0 and 1",
                    ));
                }
                threshold
            },
            widget_script_url: env::var("WIDGET_SCRIPT_URL")
                .unwrap_or_else(|_| "https://yourdomain.com/chat-widget.js".to_string()),
        })
    }

    /// Configuration for tests and local tooling: in-memory store, mock upstream
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
            max_upload_bytes: 1024 * 1024,
            database_url: None,
            database_max_connections: 1,
            run_migrations: false,
            supabase_url: String::new(),
            supabase_jwt_secret: jwt_secret.to_string(),
            supabase_service_role_key: String::new(),
            knowledge_base_bucket: "knowledge-base".to_string(),
            lyzr_api_key: None,
            lyzr_api_url: "http://localhost:9".to_string(),
            lyzr_request_timeout_ms: 2_000,
            ticket_confidence_threshold: 0.7,
            widget_script_url: "https://cdn.example.com/chat-widget.js".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
