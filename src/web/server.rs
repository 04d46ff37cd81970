use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tracing::info;

use crate::node::Node;
use crate::web::handlers;

/// Builds the router mirroring the peer HTTP surface plus an operational
/// liveness/readiness pair that carries no consensus meaning.
pub fn build_router(node: Arc<Node>) -> Router {
    Router::new()
        .route("/", get(handlers::get_blocks))
        .route("/blocks", get(handlers::get_blocks))
        .route("/balance", get(handlers::get_balance))
        .route("/transactions", get(handlers::get_transactions))
        .route(
            "/get_all_non_rewarded_txns",
            get(handlers::get_all_non_rewarded_txns),
        )
        .route("/send_txn", post(handlers::send_txn))
        .route("/send_peers_list", post(handlers::send_peers_list))
        .route("/check_status", get(handlers::check_status))
        .route("/fetch_last_n_blocks", get(handlers::fetch_last_n_blocks))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .layer(CompressionLayer::new())
        .with_state(node)
}

/// Serves the router until `shutdown` reports `true`.
pub async fn run(
    node: Arc<Node>,
    port: u16,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> std::io::Result<()> {
    let app = build_router(node);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("web server listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn node() -> Arc<Node> {
        Arc::new(Node::bootstrap("http://self".into(), Box::new(InMemoryStore::new())).unwrap())
    }

    #[tokio::test]
    async fn blocks_route_returns_genesis() {
        let app = build_router(node());
        let response = app
            .oneshot(Request::builder().uri("/blocks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn root_route_is_an_alias_for_blocks() {
        let app = build_router(node());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn check_status_returns_running() {
        let app = build_router(node());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/check_status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let app = build_router(node());
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
