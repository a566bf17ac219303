//! Gateway HTTP server: liveness routes and the signed webhook entry point.

use crate::channels::{LineChannel, ReplySender, WebhookPayload};
use crate::config::{self, Config};
use crate::llm::{CompletionBackend, OpenAiClient};
use crate::signature::{self, SIGNATURE_HEADER};
use crate::translate::Translator;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

const HOME_TEXT: &str = "Hello, this is the home page!";

/// Shared state for the gateway. Everything here is read-only after startup.
#[derive(Clone)]
pub struct GatewayState {
    /// Channel secret used to verify X-Line-Signature.
    pub channel_secret: Arc<str>,
    pub translator: Arc<Translator>,
}

impl GatewayState {
    pub fn new(channel_secret: impl Into<Arc<str>>, translator: Arc<Translator>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            translator,
        }
    }
}

/// Routes: GET / (greeting), GET /favicon.ico (204), POST /callback (webhook).
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/favicon.ico", get(favicon))
        .route("/callback", post(callback))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Credentials are resolved from env/config first; startup fails if any is missing.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let credentials = config::resolve_credentials(&config)?;

    let line = LineChannel::new(
        credentials.channel_access_token,
        config.channels.line.api_base.clone(),
        Duration::from_secs(config.channels.line.timeout_secs),
    )
    .context("building LINE client")?;
    let completion = OpenAiClient::new(
        credentials.completion_api_key,
        config.completion.base_url.clone(),
        Duration::from_secs(config.completion.timeout_secs),
    )
    .context("building completion client")?;
    log::info!(
        "completion endpoint {} (model {})",
        completion.base_url(),
        config.completion.model
    );

    let backend: Arc<dyn CompletionBackend> = Arc::new(completion);
    let replies: Arc<dyn ReplySender> = Arc::new(line);
    let translator = Arc::new(Translator::from_config(&config, backend, replies));
    let state = GatewayState::new(credentials.channel_secret, translator);
    let app = router(state);

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// In-flight webhook requests are drained by axum before `run_gateway` returns.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// Verify the signature over the raw body, then handle every text message event in order.
/// The status depends only on signature verification: once the body is verified the answer is 200,
/// even when the body does not parse or a handler fails. Those are logged, not surfaced.
pub async fn handle_callback(state: &GatewayState, signature: Option<&str>, body: &[u8]) -> StatusCode {
    let Some(signature) = signature else {
        log::warn!("callback: missing {} header", SIGNATURE_HEADER);
        return StatusCode::BAD_REQUEST;
    };
    if let Err(e) = signature::verify(&state.channel_secret, body, signature) {
        log::warn!("callback: {}; check the channel secret", e);
        return StatusCode::BAD_REQUEST;
    }
    let payload: WebhookPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("callback: signed body is not a webhook payload: {}", e);
            return StatusCode::OK;
        }
    };
    log::debug!(
        "callback: {} event(s) for {}",
        payload.events.len(),
        payload.destination.as_deref().unwrap_or("unknown destination")
    );
    for event in &payload.events {
        if event.is_standby() {
            log::debug!("callback: skipping {} event in standby mode", event.typ);
            continue;
        }
        let Some(message) = event.text_message() else {
            log::debug!("callback: ignoring {} event", event.typ);
            continue;
        };
        let outcome = state.translator.handle(message).await;
        log::info!("callback: message handled: {:?}", outcome);
    }
    StatusCode::OK
}

/// POST /callback: LINE webhook.
async fn callback(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let status = handle_callback(&state, signature, &body).await;
    if status == StatusCode::OK {
        (status, "OK")
    } else {
        (status, "Bad Request")
    }
}

/// GET / returns a plain-text greeting (for probes).
async fn home() -> &'static str {
    HOME_TEXT
}

/// GET /favicon.ico: nothing to serve.
async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
