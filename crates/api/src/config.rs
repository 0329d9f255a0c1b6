use crate::auth::AuthConfig;

/// Which document store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Daily publish sweep settings.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Whether the sweep task is spawned at all (default: `true`).
    pub enabled: bool,
    /// Upper bound on a single sweep run in seconds (default: `300`).
    pub timeout_secs: u64,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the auth secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Prefix the recipe routes are nested under (default: `/api`).
    /// An empty value mounts them at the root.
    pub base_path: String,
    /// Key of the document count row for the recipe collection.
    pub recipe_collection: String,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    pub auth: AuthConfig,
    pub sweep: SweepConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `API_BASE_PATH`         | `/api`                     |
    /// | `RECIPE_COLLECTION`     | `recipes`                  |
    /// | `STORE_BACKEND`         | `postgres`                 |
    /// | `DATABASE_URL`          | required for `postgres`    |
    /// | `SWEEP_ENABLED`         | `true`                     |
    /// | `SWEEP_TIMEOUT_SECS`    | `300`                      |
    ///
    /// Auth settings are read by [`AuthConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let base_path = normalize_base_path(
            &std::env::var("API_BASE_PATH").unwrap_or_else(|_| "/api".into()),
        );

        let recipe_collection =
            std::env::var("RECIPE_COLLECTION").unwrap_or_else(|_| "recipes".into());

        let store_backend = StoreBackend::parse(
            &std::env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".into()),
        )
        .expect("STORE_BACKEND must be 'postgres' or 'memory'");

        let database_url = std::env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres {
            assert!(
                database_url.is_some(),
                "DATABASE_URL must be set when STORE_BACKEND=postgres"
            );
        }

        let sweep = SweepConfig {
            enabled: std::env::var("SWEEP_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            timeout_secs: std::env::var("SWEEP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .expect("SWEEP_TIMEOUT_SECS must be a valid u64"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            base_path,
            recipe_collection,
            store_backend,
            database_url,
            auth: AuthConfig::from_env(),
            sweep,
        }
    }
}

/// Ensure a leading `/` and strip trailing ones; `""` and `"/"` become `""`.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
