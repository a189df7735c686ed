use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use reqwest::Client;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clients::{auth::TokenIssuer, database::DatabaseClient, fcm::FcmClient},
    config::Config,
    dispatch,
    error::DispatchError,
    models::{
        health::HealthResponse,
        outcome::DispatchSummary,
        webhook::{
            CommunityMessageRecord, MessageRecord, PrivateMessageRecord, RequestRecord,
            WebhookPayload,
        },
    },
};

pub struct AppState {
    pub config: Config,
    pub token_issuer: TokenIssuer,
    pub fcm_client: FcmClient,
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let http_client = Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()?;

    let addr = format!("0.0.0.0:{}", config.server_port);

    let state = Arc::new(AppState {
        token_issuer: TokenIssuer::new(&config, http_client.clone())?,
        fcm_client: FcmClient::new(&config, http_client),
        config,
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/webhooks/message", post(message_webhook))
        .route("/webhooks/community-message", post(community_message_webhook))
        .route("/webhooks/private-message", post(private_message_webhook))
        .route("/webhooks/request-accept", post(request_accept_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Webhook server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn message_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookPayload<MessageRecord>>,
) -> Response {
    let result = async {
        let db = DatabaseClient::connect(&state.config.database_url).await?;
        dispatch::handle_message(&db, &state.token_issuer, &state.fcm_client, payload).await
    }
    .await;

    dispatch_response(result)
}

async fn community_message_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookPayload<CommunityMessageRecord>>,
) -> Response {
    let result = async {
        let db = DatabaseClient::connect(&state.config.database_url).await?;
        dispatch::handle_community_message(&db, &state.token_issuer, &state.fcm_client, payload)
            .await
    }
    .await;

    dispatch_response(result)
}

async fn private_message_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookPayload<PrivateMessageRecord>>,
) -> Response {
    let result = async {
        let db = DatabaseClient::connect(&state.config.database_url).await?;
        dispatch::handle_private_message(&db, &state.token_issuer, &state.fcm_client, payload).await
    }
    .await;

    dispatch_response(result)
}

async fn request_accept_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookPayload<RequestRecord>>,
) -> Response {
    let result = async {
        let db = DatabaseClient::connect(&state.config.database_url).await?;
        dispatch::handle_request_accept(&db, &state.token_issuer, &state.fcm_client, payload).await
    }
    .await;

    dispatch_response(result)
}

fn dispatch_response(result: Result<DispatchSummary, DispatchError>) -> Response {
    match result {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error.into_response(),
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match check_database(&state.config.database_url).await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy())),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::unhealthy(e.to_string())),
        ),
    }
}

async fn check_database(database_url: &str) -> Result<(), DispatchError> {
    let db = DatabaseClient::connect(database_url).await?;
    db.health_check().await
}
