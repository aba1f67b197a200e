//! Route table and request handlers.

use super::{ApiError, AppState};
use crate::gateway::{ContentLength, ContentRequest, GatewayError, GatewayHealth, GenerationRequest};
use crate::models::{
    AnalyticsEntry, AnalyticsSummary, ChatMessage, ChatRole, NewProject, Project, ProjectType,
    ProjectUpdate,
};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

const DEFAULT_TONE: &str = "professional";

/// Room for multipart boundaries, part headers and small form fields on
/// top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the API router. `max_upload_bytes` caps the uploaded image.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let body_limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    let state = state.with_upload_limit(max_upload_bytes);

    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/chat/messages", get(list_chat_messages))
        .route("/api/chat/send", post(send_chat_message))
        .route("/api/chat/clear", delete(clear_chat_history))
        .route("/api/vision/analyze", post(analyze_image))
        .route("/api/content/generate", post(generate_content))
        .route("/api/analytics/summary", get(analytics_summary))
        .route("/api/analytics/data", get(analytics_data))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Call the gateway and record the call's latency on success.
async fn timed_generate(
    state: &AppState,
    request: GenerationRequest,
) -> Result<String, GatewayError> {
    let feature = request.feature();
    let started = Instant::now();

    let text = state.gateway.generate(request).await?;

    let elapsed_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    debug!("{} generation took {}ms", feature, elapsed_ms);

    state
        .store
        .write()
        .await
        .record_analytics_entry(feature, Some(1), Some(elapsed_ms));

    Ok(text)
}

// ============================================================================
// Projects
// ============================================================================

async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.store.read().await.list_projects())
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    state
        .store
        .read()
        .await
        .get_project(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let Json(project) = payload.map_err(|e| {
        debug!("Rejected project payload: {}", e);
        ApiError::bad_request("Invalid project data")
    })?;

    let project = state.store.write().await.create_project(project);
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectUpdate>, JsonRejection>,
) -> Result<Json<Project>, ApiError> {
    let Json(update) = payload.map_err(|e| {
        debug!("Rejected project update: {}", e);
        ApiError::bad_request("Invalid project data")
    })?;

    let project = state.store.write().await.update_project(&id, update)?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.write().await.delete_project(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Project not found".to_string()))
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    response: String,
}

async fn list_chat_messages(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.store.read().await.list_chat_messages())
}

/// One chat exchange. Runs under the chat lock and commits the user
/// message and the reply together, only when generation succeeds.
async fn send_chat_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let content = payload
        .ok()
        .and_then(|Json(request)| request.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Message content is required"))?;

    let _exchange = state.chat_lock.lock().await;

    let history = state.store.read().await.list_chat_messages();
    let request = GenerationRequest::Chat {
        history,
        message: content.clone(),
    };
    let response = timed_generate(&state, request)
        .await
        .map_err(|e| ApiError::upstream("Failed to process chat message", e))?;

    {
        let mut store = state.store.write().await;
        store.append_chat_message(ChatRole::User, content);
        store.append_chat_message(ChatRole::Assistant, response.clone());
    }

    Ok(Json(ChatReply { response }))
}

async fn clear_chat_history(State(state): State<AppState>) -> StatusCode {
    let _exchange = state.chat_lock.lock().await;
    state.store.write().await.clear_chat_history();
    StatusCode::NO_CONTENT
}

// ============================================================================
// Vision
// ============================================================================

#[derive(Debug, Serialize)]
struct AnalysisReply {
    analysis: String,
}

async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisReply>, ApiError> {
    const NO_IMAGE: &str = "No image file provided";

    let mut multipart = multipart.map_err(|_| ApiError::bad_request(NO_IMAGE))?;
    let mut image = None;

    while let Some(mut field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("image") {
            continue;
        }

        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(upload_error)? {
            if bytes.len() + chunk.len() > state.upload_limit {
                return Err(image_too_large(state.upload_limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        image = Some((bytes, mime_type));
        break;
    }

    let (bytes, mime_type) = image
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request(NO_IMAGE))?;

    let request = GenerationRequest::Vision {
        data: STANDARD.encode(&bytes),
        mime_type,
    };
    let analysis = timed_generate(&state, request)
        .await
        .map_err(|e| ApiError::upstream("Failed to analyze image", e))?;

    Ok(Json(AnalysisReply { analysis }))
}

fn upload_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge("Image file too large".to_string());
    }
    warn!("Invalid image upload: {}", err);
    ApiError::bad_request("Invalid image upload")
}

fn image_too_large(limit: usize) -> ApiError {
    ApiError::PayloadTooLarge(format!("Image file too large (limit {} bytes)", limit))
}

// ============================================================================
// Content generation
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct GenerateContentPayload {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default, rename = "type")]
    content_type: Option<String>,
    #[serde(default)]
    tone: Option<String>,
    #[serde(default)]
    length: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
}

impl GenerateContentPayload {
    fn into_request(self) -> Option<ContentRequest> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        let topic = non_empty(self.topic)?;
        let content_type = non_empty(self.content_type)?;

        Some(ContentRequest {
            topic,
            tone: non_empty(self.tone).unwrap_or_else(|| DEFAULT_TONE.to_string()),
            length: self
                .length
                .as_deref()
                .map(ContentLength::from)
                .unwrap_or_default(),
            content_type: ProjectType::from(content_type.as_str()),
            instructions: non_empty(self.instructions),
        })
    }
}

#[derive(Debug, Serialize)]
struct ContentReply {
    content: String,
}

async fn generate_content(
    State(state): State<AppState>,
    payload: Result<Json<GenerateContentPayload>, JsonRejection>,
) -> Result<Json<ContentReply>, ApiError> {
    let request = payload
        .ok()
        .and_then(|Json(payload)| payload.into_request())
        .ok_or_else(|| ApiError::bad_request("Topic and type are required"))?;

    let content = timed_generate(&state, GenerationRequest::Content(request))
        .await
        .map_err(|e| ApiError::upstream("Failed to generate content", e))?;

    Ok(Json(ContentReply { content }))
}

// ============================================================================
// Analytics and health
// ============================================================================

async fn analytics_summary(State(state): State<AppState>) -> Json<AnalyticsSummary> {
    Json(state.store.read().await.analytics_summary())
}

async fn analytics_data(State(state): State<AppState>) -> Json<Vec<AnalyticsEntry>> {
    Json(state.store.read().await.list_analytics_entries())
}

async fn health(State(state): State<AppState>) -> Result<Json<GatewayHealth>, ApiError> {
    match state.gateway.health_check().await {
        Ok(health) => Ok(Json(health)),
        Err(e) if e.is_unavailable() => {
            warn!("Gemini health check failed: {}", e);
            Err(ApiError::Unavailable(format!("Gemini API unavailable: {}", e)))
        }
        Err(e) => Err(ApiError::upstream("Gemini API connection failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::AiGateway;
    use crate::models::Feature;
    use crate::store::{self, MemStorage};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Scripted gateway that records every request.
    struct MockGateway {
        fail: bool,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl MockGateway {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AiGateway for MockGateway {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(GatewayError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }

            Ok(match request {
                GenerationRequest::Chat { message, .. } => format!("echo: {}", message),
                GenerationRequest::Vision { .. } => "a picture".to_string(),
                GenerationRequest::Content(c) => format!("article on {}", c.topic),
            })
        }

        async fn health_check(&self) -> Result<GatewayHealth, GatewayError> {
            if self.fail {
                Err(GatewayError::Connect("http://mock".to_string()))
            } else {
                Ok(GatewayHealth {
                    status: "connected".to_string(),
                    model: "mock".to_string(),
                })
            }
        }
    }

    fn build_app(fail: bool) -> (Router, AppState, Arc<MockGateway>) {
        let gateway = Arc::new(MockGateway::new(fail));
        let state = AppState::new(store::shared(MemStorage::new()), gateway.clone());
        (router(state.clone(), 1024 * 1024), state, gateway)
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn image_upload(field: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "aidash-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"cat.png\"\r\n",
                field
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/vision/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_project_lifecycle() {
        let (app, _, _) = build_app(false);

        let (status, created) = call(
            &app,
            json_request(
                Method::POST,
                "/api/projects",
                json!({"name": "Spring launch", "type": "blog"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["description"], Value::Null);
        assert_eq!(created["createdAt"], created["updatedAt"]);
        let uri = format!("/api/projects/{}", created["id"].as_str().unwrap());

        let (status, fetched) = call(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) = call(
            &app,
            json_request(
                Method::PUT,
                &uri,
                json!({"content": "Draft body"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["content"], "Draft body");
        assert_eq!(updated["name"], "Spring launch");

        let (status, listed) = call(&app, empty_request(Method::GET, "/api/projects")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let (status, _) = call(&app, empty_request(Method::DELETE, &uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, empty_request(Method::DELETE, &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Project not found");
    }

    #[tokio::test]
    async fn test_invalid_project_payloads() {
        let (app, _, _) = build_app(false);

        let (status, body) = call(
            &app,
            json_request(Method::POST, "/api/projects", json!({"name": "No type"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid project data");

        let (status, _) = call(
            &app,
            json_request(
                Method::POST,
                "/api/projects",
                json!({"name": "Bad type", "type": "podcast"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            json_request(Method::PUT, "/api/projects/missing", json!({"name": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Project not found");

        let (status, _) = call(&app, empty_request(Method::GET, "/api/projects/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_rejects_null_name_and_type() {
        let (app, state, _) = build_app(false);
        let project = state
            .store
            .write()
            .await
            .create_project(NewProject::new("Launch", ProjectType::Blog));

        let (status, body) = call(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/projects/{}", project.id),
                json!({"name": null, "type": null}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid project data");
        let stored = state.store.read().await.get_project(&project.id).unwrap();
        assert_eq!(stored.name, "Launch");
        assert_eq!(stored.project_type, ProjectType::Blog);
    }

    #[tokio::test]
    async fn test_chat_exchange_records_history_and_analytics() {
        let (app, state, gateway) = build_app(false);

        let (status, body) = call(
            &app,
            json_request(Method::POST, "/api/chat/send", json!({"content": "Hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "echo: Hello");

        call(
            &app,
            json_request(Method::POST, "/api/chat/send", json!({"content": "Again"})),
        )
        .await;

        let (_, messages) = call(&app, empty_request(Method::GET, "/api/chat/messages")).await;
        let listed: Vec<(&str, &str)> = messages
            .as_array()
            .unwrap()
            .iter()
            .map(|m| (m["role"].as_str().unwrap(), m["content"].as_str().unwrap()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("user", "Hello"),
                ("assistant", "echo: Hello"),
                ("user", "Again"),
                ("assistant", "echo: Again"),
            ]
        );

        match &gateway.requests()[1] {
            GenerationRequest::Chat { history, message } => {
                assert_eq!(history.len(), 2);
                assert_eq!(message, "Again");
            }
            other => panic!("unexpected request: {other:?}"),
        }

        let entries = state.store.read().await.list_analytics_entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.feature == Feature::Chat
            && e.request_count == 1
            && e.response_time.is_some()));
    }

    #[tokio::test]
    async fn test_chat_requires_content() {
        let (app, _, gateway) = build_app(false);

        let (status, body) = call(
            &app,
            json_request(Method::POST, "/api/chat/send", json!({"content": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Message content is required");

        let (status, _) = call(&app, json_request(Method::POST, "/api/chat/send", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_chat_leaves_history_unchanged() {
        let (app, state, _) = build_app(true);

        let (status, body) = call(
            &app,
            json_request(Method::POST, "/api/chat/send", json!({"content": "Hello"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to process chat message");
        let store = state.store.read().await;
        assert!(store.list_chat_messages().is_empty());
        assert!(store.list_analytics_entries().is_empty());
    }

    #[tokio::test]
    async fn test_clear_chat_history() {
        let (app, state, _) = build_app(false);
        call(
            &app,
            json_request(Method::POST, "/api/chat/send", json!({"content": "Hello"})),
        )
        .await;

        let (status, _) = call(&app, empty_request(Method::DELETE, "/api/chat/clear")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.store.read().await.list_chat_messages().is_empty());

        let (status, _) = call(&app, empty_request(Method::DELETE, "/api/chat/clear")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_vision_upload() {
        let (app, state, gateway) = build_app(false);

        let (status, body) = call(&app, image_upload("image", b"fake-png-bytes")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"], "a picture");
        assert_eq!(
            gateway.requests(),
            vec![GenerationRequest::Vision {
                data: STANDARD.encode(b"fake-png-bytes"),
                mime_type: "image/png".to_string(),
            }]
        );
        let summary = state.store.read().await.analytics_summary();
        assert_eq!(summary.images_analyzed, 1);
    }

    #[tokio::test]
    async fn test_vision_upload_size_limit() {
        let gateway = Arc::new(MockGateway::new(false));
        let state = AppState::new(store::shared(MemStorage::new()), gateway.clone());
        let app = router(state, 1024);

        let (status, body) = call(&app, image_upload("image", &[7u8; 1024])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"], "a picture");

        let (status, body) = call(&app, image_upload("image", &[7u8; 4096])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["message"], "Image file too large (limit 1024 bytes)");

        // Past the request body limit as well.
        let (status, _) = call(&app, image_upload("image", &[7u8; 200 * 1024])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_vision_requires_image_field() {
        let (app, _, gateway) = build_app(false);

        let (status, body) = call(&app, image_upload("document", b"bytes")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No image file provided");

        let (status, _) = call(
            &app,
            json_request(Method::POST, "/api/vision/analyze", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_generate_content_defaults() {
        let (app, _, gateway) = build_app(false);

        let (status, body) = call(
            &app,
            json_request(
                Method::POST,
                "/api/content/generate",
                json!({"topic": "Green tea", "type": "newsletter"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "article on Green tea");
        assert_eq!(
            gateway.requests(),
            vec![GenerationRequest::Content(ContentRequest {
                topic: "Green tea".to_string(),
                tone: "professional".to_string(),
                length: ContentLength::Medium,
                content_type: ProjectType::Other,
                instructions: None,
            })]
        );
    }

    #[tokio::test]
    async fn test_generate_content_requires_topic_and_type() {
        let (app, _, _) = build_app(false);

        let (status, body) = call(
            &app,
            json_request(Method::POST, "/api/content/generate", json!({"topic": "Tea"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Topic and type are required");
    }

    #[tokio::test]
    async fn test_failed_generation_is_not_recorded() {
        let (app, state, _) = build_app(true);

        let (status, body) = call(
            &app,
            json_request(
                Method::POST,
                "/api/content/generate",
                json!({"topic": "Tea", "type": "blog"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to generate content");
        assert!(state.store.read().await.list_analytics_entries().is_empty());
    }

    #[tokio::test]
    async fn test_analytics_endpoints() {
        let (app, state, _) = build_app(false);
        {
            let mut store = state.store.write().await;
            store.record_analytics_entry(Feature::Chat, Some(3), Some(100));
            store.record_analytics_entry(Feature::Vision, Some(1), Some(300));
            store.record_analytics_entry(Feature::Content, None, None);
            store.create_project(NewProject::new("a", ProjectType::Email));
        }

        let (status, summary) =
            call(&app, empty_request(Method::GET, "/api/analytics/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["totalRequests"], 4);
        assert_eq!(summary["imagesAnalyzed"], 1);
        assert_eq!(summary["contentGenerated"], 0);
        assert_eq!(summary["activeProjects"], 1);
        assert_eq!(summary["featureBreakdown"][0]["feature"], "chat");
        assert_eq!(summary["featureBreakdown"][0]["percentage"], 75.0);
        let avg = summary["avgResponseTime"].as_f64().unwrap();
        assert!((avg - 133.333).abs() < 1e-2);

        let (status, data) = call(&app, empty_request(Method::GET, "/api/analytics/data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(data.as_array().map(Vec::len), Some(3));
        assert_eq!(data[2]["requestCount"], 0);
        assert_eq!(data[2]["responseTime"], Value::Null);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = build_app(false);
        let (status, body) = call(&app, empty_request(Method::GET, "/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "connected", "model": "mock"}));

        let (app, _, _) = build_app(true);
        let (status, _) = call(&app, empty_request(Method::GET, "/api/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
