// THEORY:
// The server is a thin shell around `motion_sense`. It serves a capture page,
// accepts frames over a WebSocket and pushes one `{text, score}` event back per
// accepted frame. All the interesting work happens in `DetectionSession`.
//
// Each connection gets its own session, so two viewers pointing different cameras
// at the server never difference against each other's frames. Frames on one
// connection are handled strictly in order: the next message is not read until the
// previous result has been sent.

pub mod config;
pub mod page;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use motion_sense::{DetectionSession, MotionConfig, MotionResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use config::ServerConfig;

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    pub motion: MotionConfig,
}

/// One inbound frame event. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct FrameMessage {
    #[serde(default)]
    pub image: Option<String>,
}

/// Turns one raw WebSocket text message into at most one result.
///
/// Messages that are not JSON objects, or whose `image` is missing or empty, are
/// dropped without a reply.
pub fn handle_frame_message(session: &DetectionSession, text: &str) -> Option<MotionResult> {
    let message: FrameMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "ignoring malformed frame message");
            return None;
        }
    };

    let Some(image) = message.image.filter(|image| !image.is_empty()) else {
        debug!("ignoring frame message without image");
        return None;
    };

    Some(session.process(&image))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Html(page::INDEX_HTML) }))
        .route("/healthz", get(|| async { "ok" }))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_conn(socket, state))
}

async fn ws_conn(mut socket: WebSocket, state: AppState) {
    let session = match DetectionSession::try_new(state.motion) {
        Ok(session) => Arc::new(session),
        Err(err) => {
            warn!(error = %err, "refusing viewer, motion config is unusable");
            return;
        }
    };
    info!("viewer connected");

    while let Some(msg) = socket.recv().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                warn!(error = %err, "websocket receive failed");
                break;
            }
        };

        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        // Decoding and differencing are CPU-bound; keep them off the async workers.
        let frame_session = Arc::clone(&session);
        let result = match tokio::task::spawn_blocking(move || handle_frame_message(&frame_session, &text)).await {
            Ok(Some(result)) => result,
            Ok(None) => continue,
            Err(err) => {
                warn!(error = %err, "frame task failed");
                continue;
            }
        };

        let body = match serde_json::to_string(&result) {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "could not encode result");
                continue;
            }
        };
        if let Err(err) = socket.send(Message::Text(body)).await {
            warn!(error = %err, "websocket send failed");
            break;
        }
    }

    info!("viewer disconnected");
}

/// Binds the listener and serves until the task is aborted or fails.
pub async fn start_server(cfg: ServerConfig) -> anyhow::Result<tokio::task::JoinHandle<std::io::Result<()>>> {
    use anyhow::Context;

    cfg.motion.validate().context("invalid motion config")?;
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!("motion sense listening on http://{}", listener.local_addr()?);

    let app = router(AppState { motion: cfg.motion });
    Ok(tokio::spawn(async move { axum::serve(listener, app).await }))
}
