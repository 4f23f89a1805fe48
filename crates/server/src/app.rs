use crate::errors::ApiError;
use crate::models::{CallToolResponse, HealthResponse, ListToolsResponse};
use crate::sse::{
    create_content_event, create_error_event, create_sse_stream, create_stream_end_event,
    create_tool_usage_event,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;
use serde_json::Value;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tooling::{ArgumentBag, ToolService};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub service: ToolService,
    /// Fired on shutdown; calls still in flight are abandoned.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: ToolService) -> Self {
        Self {
            service,
            shutdown: CancellationToken::new(),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/:name/call", post(call_tool))
        .route("/tools/:name/stream", post(stream_tool))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        tools: state.service.tool_count(),
    })
}

async fn list_tools(State(state): State<AppState>) -> Json<ListToolsResponse> {
    Json(ListToolsResponse {
        tools: state.service.list_tools(),
    })
}

/// An empty body or `null` means "no arguments"; anything else must be a JSON object.
pub fn parse_arguments(body: &[u8]) -> Result<ArgumentBag, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ArgumentBag::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(Value::Null) => Ok(ArgumentBag::new()),
        Ok(_) => Err(ApiError::InvalidRequest(
            "arguments must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::InvalidRequest(format!("malformed JSON body: {e}"))),
    }
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<CallToolResponse>, ApiError> {
    let arguments = parse_arguments(&body)?;
    let call_id = Uuid::new_v4();
    info!("Call {} dispatching to tool '{}'", call_id, name);

    let content = state
        .service
        .execute_tool_with_cancel(&name, arguments, &state.shutdown)
        .await?;

    Ok(Json(CallToolResponse {
        call_id,
        tool: name,
        content,
    }))
}

async fn stream_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let arguments = match parse_arguments(&body) {
        Ok(arguments) => arguments,
        Err(e) => return create_sse_stream(vec![create_error_event(&e), create_stream_end_event()]),
    };

    let call_id = Uuid::new_v4();
    info!("Call {} streaming from tool '{}'", call_id, name);

    let argument_names: Vec<String> = arguments.keys().cloned().collect();
    let started = Instant::now();

    let events = match state
        .service
        .execute_tool_with_cancel(&name, arguments, &state.shutdown)
        .await
    {
        Ok(content) => {
            let names: Vec<&str> = argument_names.iter().map(String::as_str).collect();
            let duration_ms = started.elapsed().as_millis() as u64;

            let mut events = vec![create_tool_usage_event(call_id, &name, &names, duration_ms)];
            events.extend(content.iter().map(create_content_event));
            events.push(create_stream_end_event());
            events
        }
        Err(e) => vec![
            create_error_event(&ApiError::from(e)),
            create_stream_end_event(),
        ],
    };

    create_sse_stream(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tooling::{StubTool, ToolRegistry};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut registry = ToolRegistry::new();
        registry
            .register_tool(StubTool::new("Greeter", "Greets"))
            .unwrap();
        create_app(AppState::new(registry.freeze()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn should_parse_empty_and_null_bodies_as_no_arguments() {
        assert!(parse_arguments(b"").unwrap().is_empty());
        assert!(parse_arguments(b"  \n").unwrap().is_empty());
        assert!(parse_arguments(b"null").unwrap().is_empty());
    }

    #[test]
    fn should_reject_non_object_bodies() {
        let error = parse_arguments(b"[1, 2]").unwrap_err();
        assert_eq!(error.http_status_code(), 400);

        let error = parse_arguments(b"{not json").unwrap_err();
        assert!(error.to_string().contains("malformed JSON body"));
    }

    #[tokio::test]
    async fn should_return_ok_for_health_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tools"], 1);
    }

    #[tokio::test]
    async fn should_list_registered_tools() {
        let response = test_app()
            .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["tools"][0]["name"], "Greeter");
        assert_eq!(json["tools"][0]["inputSchema"]["required"], json!(["parameter"]));
    }

    #[tokio::test]
    async fn should_call_tool_by_name() {
        let response = test_app()
            .oneshot(post_json("/tools/Greeter/call", r#"{"parameter": "x"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["tool"], "Greeter");
        assert_eq!(
            json["content"],
            json!([{"type": "text", "text": "Hello from Greeter! Parameter: x"}])
        );
        assert!(json["call_id"].is_string());
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_tool() {
        let response = test_app()
            .oneshot(post_json("/tools/nonexistent/call", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "unknown_tool");
        assert_eq!(json["tool"], "nonexistent");
    }

    #[tokio::test]
    async fn should_return_422_for_invalid_arguments() {
        let response = test_app()
            .oneshot(post_json("/tools/Greeter/call", r#"{"parameter": 5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "validation");
        assert!(json["error"].as_str().unwrap().contains("parameter"));
    }

    #[tokio::test]
    async fn should_return_400_for_non_object_arguments() {
        let response = test_app()
            .oneshot(post_json("/tools/Greeter/call", r#""just a string""#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_503_after_shutdown() {
        let mut registry = ToolRegistry::new();
        registry
            .register_tool(StubTool::new("Greeter", "Greets"))
            .unwrap();
        let state = AppState::new(registry.freeze());
        state.shutdown.cancel();

        let response = create_app(state)
            .oneshot(post_json("/tools/Greeter/call", r#"{"parameter": "x"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "cancelled");
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_tool_after_shutdown() {
        let state = AppState::new(ToolRegistry::new().freeze());
        state.shutdown.cancel();

        let response = create_app(state)
            .oneshot(post_json("/tools/ghost/call", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "unknown_tool");
        assert_eq!(json["retryable"], false);
    }

    #[tokio::test]
    async fn should_stream_tool_output_as_events() {
        let response = test_app()
            .oneshot(post_json("/tools/Greeter/stream", r#"{"parameter": "y"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let content = String::from_utf8(body.to_vec()).unwrap();

        assert!(content.contains("event: tool_usage"));
        assert!(content.contains("Hello from Greeter! Parameter: y"));
        assert!(content.contains("event: stream_end"));
    }

    #[tokio::test]
    async fn should_stream_error_event_for_unknown_tool() {
        let response = test_app()
            .oneshot(post_json("/tools/ghost/stream", "{}"))
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let content = String::from_utf8(body.to_vec()).unwrap();

        assert!(content.contains("event: error_event"));
        assert!(content.contains("Unknown tool: ghost"));
        assert!(!content.contains("event: tool_usage"));
    }
}
