use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use recipebox_db::{CountStore, MemoryStore, PgStore, RecipeStore};
use recipebox_events::{CountTrigger, EventBus};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipebox_api::auth::TokenVerifier;
use recipebox_api::background::publish_sweep;
use recipebox_api::config::{ServerConfig, StoreBackend};
use recipebox_api::router::build_app_router;
use recipebox_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recipebox_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        base_path = %config.base_path,
        backend = ?config.store_backend,
        "Loaded server configuration"
    );

    // --- Document store ---
    let (recipes, counts): (Arc<dyn RecipeStore>, Arc<dyn CountStore>) = match config.store_backend
    {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            let pool = recipebox_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            recipebox_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            recipebox_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store = Arc::new(PgStore::new(pool));
            (
                Arc::clone(&store) as Arc<dyn RecipeStore>,
                store as Arc<dyn CountStore>,
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            (
                Arc::clone(&store) as Arc<dyn RecipeStore>,
                store as Arc<dyn CountStore>,
            )
        }
    };

    // --- Event bus and count trigger ---
    let event_bus = Arc::new(EventBus::default());
    let trigger = CountTrigger::new(Arc::clone(&counts), config.recipe_collection.clone());
    let trigger_handle = tokio::spawn(trigger.run(event_bus.subscribe()));
    tracing::info!(collection = %config.recipe_collection, "Count trigger started");

    // --- Publish sweep ---
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = config.sweep.enabled.then(|| {
        tokio::spawn(publish_sweep::run(
            Arc::clone(&recipes),
            Duration::from_secs(config.sweep.timeout_secs),
            sweep_cancel.clone(),
        ))
    });

    // --- App state ---
    let state = AppState {
        recipes,
        counts,
        verifier: Arc::new(TokenVerifier::new(&config.auth)),
        event_bus: Arc::clone(&event_bus),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config)
        .expect("CORS_ORIGINS contains an invalid origin");

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    sweep_cancel.cancel();
    if let Some(handle) = sweep_handle {
        let _ = tokio::time::timeout(drain, handle).await;
        tracing::info!("Publish sweep stopped");
    }

    // The router (and its state clone of the bus) is gone; dropping the last
    // handle closes the channel and lets the trigger drain and exit.
    drop(event_bus);
    let _ = tokio::time::timeout(drain, trigger_handle).await;
    tracing::info!("Count trigger shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
