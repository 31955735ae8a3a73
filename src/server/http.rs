//! HTTP transport for administrative commands.
//!
//! `POST /command/{db}` takes a JSON command document; credentials travel in
//! the `x-analyze-user` / `x-analyze-password` headers. Every failure past
//! authentication, including an unparsable body, is a framed command reply.

use crate::command::reply;
use crate::connection::Interrupter;
use crate::core::{DbError, Result};
use crate::facade::ShardKeyAdvisor;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const USER_HEADER: &str = "x-analyze-user";
pub const PASSWORD_HEADER: &str = "x-analyze-password";

pub fn router(advisor: Arc<ShardKeyAdvisor>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/command/:db", post(run_command))
        .layer(TraceLayer::new_for_http())
        .with_state(advisor)
}

pub async fn serve(advisor: Arc<ShardKeyAdvisor>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Command server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(advisor)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Interrupts the operation if the request future is dropped mid-flight.
struct InterruptOnDrop(Interrupter);

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        self.0.interrupt();
    }
}

async fn run_command(
    State(advisor): State<Arc<ShardKeyAdvisor>>,
    Path(db): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let credentials = header_str(&headers, USER_HEADER).zip(header_str(&headers, PASSWORD_HEADER));
    let Some((username, password)) = credentials else {
        let err = DbError::AuthenticationFailed("missing credentials".into());
        return (StatusCode::UNAUTHORIZED, Json(reply::error_reply(&err))).into_response();
    };

    let user = match advisor.auth_manager().authenticate(username, password).await {
        Ok(user) => user,
        Err(err) => return (StatusCode::UNAUTHORIZED, Json(reply::error_reply(&err))).into_response(),
    };

    let document: Value = match serde_json::from_slice(&body) {
        Ok(document) => document,
        Err(e) => {
            let err = DbError::FailedToParse(format!("command body is not valid JSON: {e}"));
            return (StatusCode::OK, Json(reply::error_reply(&err))).into_response();
        }
    };

    let interrupter = Interrupter::new();
    let _guard = InterruptOnDrop(interrupter.clone());
    let reply = advisor.run_command_as(user, &db, &document, interrupter).await;
    (StatusCode::OK, Json(reply)).into_response()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
