//! API routes

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::catalog::Model;
use crate::core::{SessionSnapshot, SubmitOutcome};
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    backend: String,
    ready: bool,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Submits the current draft when omitted
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    pub session: SessionSnapshot,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.config.backend.clone(),
        ready: state.session.is_ready(),
    })
}

async fn list_models(State(state): State<AppState>) -> Json<Vec<Model>> {
    Json(state.session.catalog().list().to_vec())
}

async fn session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

async fn update_draft(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Json<SessionSnapshot> {
    state.session.update_draft(request.text).await;
    Json(state.session.snapshot().await)
}

/// A POST without a JSON body submits the draft, same as `{}`
async fn submit(
    State(state): State<AppState>,
    request: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, JsonRejection> {
    let request = match request {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => SubmitRequest::default(),
        Err(rejection) => return Err(rejection),
    };

    let outcome = match request.text {
        Some(text) => state.session.submit(&text).await,
        None => state.session.submit_draft().await,
    };

    Ok(Json(SubmitResponse {
        outcome,
        session: state.session.snapshot().await,
    }))
}

async fn select_model(
    State(state): State<AppState>,
    Json(request): Json<SelectModelRequest>,
) -> Json<SessionSnapshot> {
    state.session.select_model(&request.id).await;
    Json(state.session.snapshot().await)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/models", get(list_models))
        .route("/v1/session", get(session))
        .route("/v1/session/draft", put(update_draft))
        .route("/v1/session/messages", post(submit))
        .route("/v1/session/model", post(select_model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::ModelCatalog;
    use crate::config::Config;
    use crate::core::SessionController;
    use crate::providers::{AiProviderClient, ProviderReadiness};
    use crate::testing::ScriptedBackend;

    fn app(readiness: ProviderReadiness) -> Router {
        let session = SessionController::new(
            Arc::new(ModelCatalog::builtin().unwrap()),
            AiProviderClient::new(Arc::new(ScriptedBackend::replying(["hello", "again"]))),
            readiness,
            "gpt-4o",
        );
        let state = AppState {
            config: Config::from_vars(|_| None),
            session: Arc::new(session),
        };
        router().with_state(state)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_and_models() {
        let app = app(ProviderReadiness::ready());

        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ready"], true);
        assert_eq!(body["backend"], "ollama");

        let (_, models) = call(&app, "GET", "/v1/models", None).await;
        assert_eq!(models[0]["id"], "gpt-4o");
        assert_eq!(models[0]["provider"], "OpenAI");
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let app = app(ProviderReadiness::ready());

        let (status, body) = call(&app, "POST", "/v1/session/messages", Some(json!({ "text": "hi" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["status"], "replied");
        let messages = body["session"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "hi");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "hello");
        assert_eq!(body["session"]["pending"], false);
    }

    #[tokio::test]
    async fn test_draft_then_submit_draft() {
        let app = app(ProviderReadiness::ready());

        let (_, snapshot) = call(&app, "PUT", "/v1/session/draft", Some(json!({ "text": "typed" }))).await;
        assert_eq!(snapshot["draft"], "typed");
        assert_eq!(snapshot["can_send"], true);

        let (_, body) = call(&app, "POST", "/v1/session/messages", Some(json!({}))).await;
        assert_eq!(body["outcome"]["status"], "replied");
        assert_eq!(body["session"]["draft"], "");
        assert_eq!(body["session"]["messages"][0]["content"], "typed");
    }

    #[tokio::test]
    async fn test_bodyless_submit_sends_draft() {
        let app = app(ProviderReadiness::ready());
        call(&app, "PUT", "/v1/session/draft", Some(json!({ "text": "from the box" }))).await;

        let (status, body) = call(&app, "POST", "/v1/session/messages", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["status"], "replied");
        assert_eq!(body["session"]["messages"][0]["content"], "from the box");
        assert_eq!(body["session"]["draft"], "");
    }

    #[tokio::test]
    async fn test_submit_malformed_json_rejected() {
        let app = app(ProviderReadiness::ready());
        let request = Request::builder()
            .method("POST")
            .uri("/v1/session/messages")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (_, session) = call(&app, "GET", "/v1/session", None).await;
        assert_eq!(session["messages"], json!([]));
    }

    #[tokio::test]
    async fn test_submit_before_ready_is_ignored() {
        let (_signal, readiness) = ProviderReadiness::manual();
        let app = app(readiness);

        let (_, body) = call(&app, "POST", "/v1/session/messages", Some(json!({ "text": "hi" }))).await;
        assert_eq!(body["outcome"]["status"], "ignored");
        assert_eq!(body["outcome"]["reason"], "not_ready");
        assert_eq!(body["session"]["messages"], json!([]));
        assert_eq!(body["session"]["status_label"], "Loading AI...");
    }

    #[tokio::test]
    async fn test_select_model() {
        let app = app(ProviderReadiness::ready());

        let (_, snapshot) = call(
            &app,
            "POST",
            "/v1/session/model",
            Some(json!({ "id": "claude-sonnet-4" })),
        )
        .await;

        assert_eq!(snapshot["selected_model"]["id"], "claude-sonnet-4");
        assert_eq!(
            snapshot["messages"][0]["content"],
            "Switched to model: Claude Sonnet 4 (Anthropic)"
        );

        let (_, session) = call(&app, "GET", "/v1/session", None).await;
        assert_eq!(session["input_placeholder"], "Ask Claude Sonnet 4 anything...");
    }
}
