use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use newswire_core::{ContentGenerator, NewsStore};

use crate::auth::{AdminAuthenticator, StaticTokenAuth};
use crate::cache::{ReadCache, DEFAULT_TTL};
use crate::client::{self, ClientRegistry};
use crate::handlers;
use crate::service::NewsService;

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
    pub max_send_queue: usize,
    pub cache_ttl: Duration,
    pub admin_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            max_send_queue: 256,
            cache_ttl: DEFAULT_TTL,
            admin_token: "secret_admin_token_12345".into(),
        }
    }
}

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
    pub registry: Arc<ClientRegistry>,
    pub auth: Arc<dyn AdminAuthenticator>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(health_handler))
        .route("/news", get(handlers::list_news))
        .route("/news/{id}", get(handlers::get_news))
        .route("/admin/news/generate", post(handlers::generate_news))
        .route("/admin/news/{id}", delete(handlers::delete_news))
        .route("/admin/news", delete(handlers::clear_news))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Create and start the server. Returns a handle that keeps it alive.
pub async fn start(
    config: ServerConfig,
    store: Arc<dyn NewsStore>,
    generator: Arc<dyn ContentGenerator>,
) -> Result<ServerHandle, std::io::Error> {
    let registry = Arc::new(ClientRegistry::new(config.max_send_queue));
    let cache = Arc::new(ReadCache::new(config.cache_ttl));
    let auth: Arc<dyn AdminAuthenticator> = Arc::new(StaticTokenAuth::new(config.admin_token));

    let service = Arc::new(NewsService::new(
        store,
        generator,
        cache,
        Arc::clone(&registry),
    ));

    // Reap clients that stopped answering pings (every 60s)
    let cleanup = client::start_cleanup_task(Arc::clone(&registry), Duration::from_secs(60));

    let state = AppState {
        service,
        registry,
        auth,
    };
    let router = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "newswire server started");

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server,
        _cleanup: cleanup,
    })
}

/// Handle returned by `start()` — keeps background tasks alive.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
    _cleanup: tokio::task::JoinHandle<()>,
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Register a new WebSocket connection and drive it until it closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (client_id, rx) = state.registry.register();
    tracing::info!(client_id = %client_id, "WebSocket client connected");

    client::handle_ws_connection(socket, client_id, rx, state.registry).await;
}

/// Health check HTTP endpoint. The listing doubles as a storage probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.list_all() {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::Json(serde_json::json!({ "status": "healthy" })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::Json(serde_json::json!({ "status": "unhealthy", "detail": e.to_string() })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newswire_core::LoremGenerator;
    use newswire_store::{Database, NewsRepo};

    const TOKEN: &str = "test_admin_token";

    async fn start_test_server() -> ServerHandle {
        let db = Database::in_memory().unwrap();
        let config = ServerConfig {
            port: 0, // random port
            admin_token: TOKEN.into(),
            ..Default::default()
        };
        start(
            config,
            Arc::new(NewsRepo::new(db)),
            Arc::new(LoremGenerator),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn server_starts_and_serves_health() {
        let handle = start_test_server().await;
        assert!(handle.port > 0);

        let url = format!("http://127.0.0.1:{}/health", handle.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn listing_starts_empty() {
        let handle = start_test_server().await;
        let url = format!("http://127.0.0.1:{}/news", handle.port);

        let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn admin_endpoints_require_token() {
        let handle = start_test_server().await;
        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{}", handle.port);

        let resp = client
            .post(format!("{base}/admin/news/generate?count=1"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        let resp = client
            .post(format!("{base}/admin/news/generate?count=1"))
            .header("X-Admin-Token", "wrong")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        let resp = client
            .delete(format!("{base}/admin/news"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }

    #[tokio::test]
    async fn generate_then_read_then_delete() {
        let handle = start_test_server().await;
        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{}", handle.port);

        let body: serde_json::Value = client
            .post(format!("{base}/admin/news/generate?count=2"))
            .header("X-Admin-Token", TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["generated"], 2);

        let listed: serde_json::Value = client
            .get(format!("{base}/news"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 2);

        let id = listed[0]["id"].as_i64().unwrap();
        let one: serde_json::Value = client
            .get(format!("{base}/news/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(one["id"], id);

        let body: serde_json::Value = client
            .delete(format!("{base}/admin/news/{id}"))
            .header("X-Admin-Token", TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "deleted");
        assert_eq!(body["id"], id);

        let body: serde_json::Value = client
            .delete(format!("{base}/admin/news"))
            .header("X-Admin-Token", TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "all news deleted");
    }

    #[tokio::test]
    async fn missing_news_is_404() {
        let handle = start_test_server().await;
        let url = format!("http://127.0.0.1:{}/news/12345", handle.port);

        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 404);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["detail"], "news 12345 not found");
    }

    #[tokio::test]
    async fn zero_count_is_rejected() {
        let handle = start_test_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!(
                "http://127.0.0.1:{}/admin/news/generate?count=0",
                handle.port
            ))
            .header("X-Admin-Token", TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[test]
    fn build_router_creates_routes() {
        let db = Database::in_memory().unwrap();
        let registry = Arc::new(ClientRegistry::new(32));
        let cache = Arc::new(ReadCache::default());
        let service = Arc::new(NewsService::new(
            Arc::new(NewsRepo::new(db)),
            Arc::new(LoremGenerator),
            cache,
            Arc::clone(&registry),
        ));

        let state = AppState {
            service,
            registry,
            auth: Arc::new(StaticTokenAuth::new(TOKEN)),
        };

        let _router = build_router(state);
        // If this doesn't panic, the router was built successfully
    }
}
