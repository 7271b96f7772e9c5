use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use unisync_shared::constants::CONVERSATIONS_PATH;
use unisync_shared::models::{Conversation, Message};
use unisync_shared::protocol::{
    DeleteConversationResponse, HealthResponse, SendMessageRequest, SendMessageResponse,
};
use unisync_shared::types::ConversationId;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::store::ChatStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChatStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store = if config.seed_data {
            ChatStore::seeded()
        } else {
            ChatStore::new()
        };
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let chat = Router::new()
        .route("/", get(list_conversations).post(create_conversation))
        .route("/:id", delete(delete_conversation))
        .route("/:id/messages", get(list_messages).post(send_message))
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health_check))
        .nest(CONVERSATIONS_PATH, chat)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_conversations(State(state): State<AppState>) -> Json<Vec<Conversation>> {
    Json(state.store.list().await)
}

async fn create_conversation(State(state): State<AppState>) -> Json<Conversation> {
    Json(state.store.create().await)
}

async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ServerError> {
    let messages = state.store.messages(&ConversationId(id)).await?;
    Ok(Json(messages))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ServerError> {
    let id = ConversationId(id);
    if req.content.trim().is_empty() {
        return Err(ServerError::BadRequest(
            "Message content must not be empty".into(),
        ));
    }
    if !state.store.contains(&id).await {
        return Err(ServerError::ConversationNotFound(id));
    }

    if !state.config.reply_delay.is_zero() {
        debug!(delay = ?state.config.reply_delay, "Delaying reply");
        tokio::time::sleep(state.config.reply_delay).await;
    }

    let reply = state.store.record_exchange(&id, &req.content).await?;
    Ok(Json(SendMessageResponse {
        assistant: reply.content,
    }))
}

async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConversationResponse>, ServerError> {
    state.store.delete(&ConversationId(id)).await?;
    Ok(Json(DeleteConversationResponse { deleted: true }))
}

/// Reject chat requests without the configured bearer token. A server with
/// no token accepts everything.
async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    verify_bearer(request.headers(), &state.config)?;
    Ok(next.run(request).await)
}

fn verify_bearer(headers: &HeaderMap, config: &ServerConfig) -> Result<(), ServerError> {
    let Some(ref expected) = config.auth_token else {
        return Ok(());
    };

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

    use subtle::ConstantTimeEq;
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ServerError::Unauthorized);
    }

    Ok(())
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(state, listener).await
}

/// Serve on an already bound listener (port 0 in tests).
pub async fn serve_listener(state: AppState, listener: TcpListener) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "Starting HTTP API server");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    use unisync_shared::protocol::ErrorBody;

    fn state(token: Option<&str>) -> AppState {
        AppState::new(ServerConfig {
            auth_token: token.map(str::to_string),
            ..ServerConfig::default()
        })
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state(None));
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_list_seeded_conversations() {
        let app = build_router(state(None));
        let (status, body) = call(&app, Method::GET, "/chat/conversations", None).await;
        assert_eq!(status, StatusCode::OK);
        let list: Vec<Conversation> = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].title, "Today's schedule");
    }

    #[tokio::test]
    async fn test_create_then_send() {
        let app = build_router(state(None));
        let (_, body) = call(&app, Method::POST, "/chat/conversations", None).await;
        let created: Conversation = serde_json::from_slice(&body).unwrap();

        let uri = format!("/chat/conversations/{}/messages", created.id);
        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some(serde_json::json!({ "content": "Any exams soon?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reply: SendMessageResponse = serde_json::from_slice(&body).unwrap();
        assert!(reply.assistant.starts_with("Based on your connected accounts"));

        let (_, body) = call(&app, Method::GET, &uri, None).await;
        let messages: Vec<Message> = serde_json::from_slice(&body).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user());
        assert!(messages[1].has_sources());

        let (_, body) = call(&app, Method::GET, "/chat/conversations", None).await;
        let list: Vec<Conversation> = serde_json::from_slice(&body).unwrap();
        assert_eq!(list[0].title, "Any exams soon?");
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let app = build_router(state(None));
        let (status, body) = call(
            &app,
            Method::POST,
            "/chat/conversations/1/messages",
            Some(serde_json::json!({ "content": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(ErrorBody::detail_from(&body).is_some());
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_404_with_detail() {
        let app = build_router(state(None));
        let (status, body) = call(
            &app,
            Method::POST,
            "/chat/conversations/999/messages",
            Some(serde_json::json!({ "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorBody::detail_from(&body).as_deref(),
            Some("Conversation not found")
        );
    }

    #[tokio::test]
    async fn test_delete_conversation() {
        let app = build_router(state(None));
        let (status, body) = call(&app, Method::DELETE, "/chat/conversations/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let resp: DeleteConversationResponse = serde_json::from_slice(&body).unwrap();
        assert!(resp.deleted);

        let (status, _) = call(&app, Method::GET, "/chat/conversations/1/messages", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_token_required_when_configured() {
        let app = build_router(state(Some("s3cret")));

        let (status, body) = call(&app, Method::GET, "/chat/conversations", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorBody::detail_from(&body).as_deref(),
            Some("Not authenticated")
        );

        let request = Request::builder()
            .uri("/chat/conversations")
            .header("authorization", "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Health stays open.
        let (status, _) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reply_delay() {
        let app = build_router(AppState::new(ServerConfig {
            reply_delay: Duration::from_millis(50),
            ..ServerConfig::default()
        }));
        let started = std::time::Instant::now();
        let (status, _) = call(
            &app,
            Method::POST,
            "/chat/conversations/2/messages",
            Some(serde_json::json!({ "content": "And tomorrow?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
