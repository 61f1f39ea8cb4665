use std::net::SocketAddr;
use std::sync::Arc;
use taskdeck::api::{self, AppState};
use taskdeck::settings::Settings;
use taskdeck::store::Store;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().expect("Failed to load settings");

    // ── Boot the store ─────────────────────────────────────────
    let store = Store::open(&settings.store_path).expect("Failed to open store");

    let seeded = store
        .ensure_default_categories()
        .expect("Failed to seed categories");
    if seeded > 0 {
        tracing::info!(count = seeded, "seeded default categories");
    }

    let task_count = store.list_tasks().expect("Failed to read store").len();
    let category_count = store.list_categories().expect("Failed to read store").len();
    tracing::info!(task_count, category_count, "store loaded");

    // ── Router ─────────────────────────────────────────────────
    let state = Arc::new(AppState { store });
    let app = api::router(state)
        // Static files — the SPA bundle
        .fallback_service(ServeDir::new("frontend/dist").append_index_html_on_directories(true))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // ── Start ──────────────────────────────────────────────────
    let addr: SocketAddr = format!("{}:{}", settings.bind_address, settings.port)
        .parse()
        .expect("Invalid bind address");
    tracing::info!(%addr, "server running");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
