//! Route handlers. Each is a thin adapter between an axum extractor and a
//! `Node` method; none contain protocol logic of their own.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::error::NodeError;
use crate::model::Transaction;
use crate::node::Node;
use crate::web::models::{BalanceQuery, BalanceResponse, ErrorResponse, StatusResponse};

fn map_error(err: NodeError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else if err.is_fatal() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

pub async fn get_blocks(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(node.blocks().await)
}

pub async fn get_balance(
    State(node): State<Arc<Node>>,
    Query(query): Query<BalanceQuery>,
) -> impl IntoResponse {
    let balance = node.balance(&query.address).await;
    Json(BalanceResponse { balance })
}

pub async fn get_transactions(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(node.transactions().await)
}

pub async fn get_all_non_rewarded_txns(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(node.all_non_coinbase_transactions().await)
}

pub async fn send_txn(
    State(node): State<Arc<Node>>,
    Json(txn): Json<Transaction>,
) -> axum::response::Response {
    match node.submit_transaction(txn).await {
        Ok(pooled) => Json(pooled).into_response(),
        Err(e) => map_error(e).into_response(),
    }
}

pub async fn send_peers_list(
    State(node): State<Arc<Node>>,
    Json(liveness): Json<HashMap<String, bool>>,
) -> impl IntoResponse {
    node.peers().update_statuses(liveness).await;
    Json(StatusResponse::success())
}

pub async fn check_status() -> impl IntoResponse {
    Json(crate::constants::STATUS_RUNNING)
}

pub async fn fetch_last_n_blocks(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(node.fetch_last_n_blocks().await)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn readyz(State(node): State<Arc<Node>>) -> impl IntoResponse {
    if node.mining_locked().await {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}
