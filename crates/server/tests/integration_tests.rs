use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use server::{build_service, create_app, AppState};
use std::io::Write;
use tempfile::NamedTempFile;
use toolforge_core::Config;
use tower::ServiceExt;

/// End-to-end tests that go from a config file on disk to HTTP responses.
#[cfg(test)]
mod config_driven {
    use super::*;

    const CONFIG: &str = r#"
[server]
port = 0

[registry]
collision = "replace"
max_concurrent_calls = 8

[tools]
with_examples = true

[[tools.stub]]
name = "hello world"
description = "Greets the world"

[[tools.stub]]
name = "2fa-check"
"#;

    fn app_from_config(content: &str) -> Router {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        let service = build_service(&config).unwrap();
        create_app(AppState::new(service))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn call(name: &str, arguments: Value) -> Request<Body> {
        Request::builder()
            .uri(format!("/tools/{name}/call"))
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(arguments.to_string()))
            .unwrap()
    }

    fn list() -> Request<Body> {
        Request::builder().uri("/tools").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn should_list_configured_tools_in_registration_order() {
        let app = app_from_config(CONFIG);

        let (status, json) = send(&app, list()).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = json["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["get_weather", "HelloWorld", "Tool2faCheck"]);
        assert_eq!(json["tools"][1]["description"], "Greets the world");
        assert_eq!(json["tools"][2]["description"], "A custom MCP tool");
    }

    #[tokio::test]
    async fn should_return_identical_listings_on_repeated_discovery() {
        let app = app_from_config(CONFIG);

        let (_, first) = send(&app, list()).await;
        let (_, second) = send(&app, list()).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_execute_generated_stub_tool() {
        let app = app_from_config(CONFIG);

        let (status, json) = send(&app, call("HelloWorld", json!({"parameter": "x"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["content"],
            json!([{"type": "text", "text": "Hello from HelloWorld! Parameter: x"}])
        );
    }

    #[tokio::test]
    async fn should_execute_example_weather_tool() {
        let app = app_from_config(CONFIG);

        let (status, json) = send(
            &app,
            call("get_weather", json!({"city": "Lisbon", "api_key": "k"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["content"][0]["text"], "Current weather in Lisbon: 20°C");
    }

    #[tokio::test]
    async fn should_distinguish_unknown_tool_from_failed_tool() {
        let app = app_from_config(CONFIG);

        let (unknown_status, unknown) = send(&app, call("nonexistent", json!({}))).await;
        let (invalid_status, invalid) =
            send(&app, call("get_weather", json!({"city": "Lisbon"}))).await;

        assert_eq!(unknown_status, StatusCode::NOT_FOUND);
        assert_eq!(unknown["kind"], "unknown_tool");
        assert_eq!(invalid_status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid["kind"], "validation");
        assert_eq!(invalid["tool"], "get_weather");
    }

    #[tokio::test]
    async fn should_serve_concurrent_calls_to_distinct_tools() {
        let app = app_from_config(CONFIG);

        let (stub, weather) = tokio::join!(
            send(&app, call("HelloWorld", json!({"parameter": "one"}))),
            send(&app, call("get_weather", json!({"city": "Oslo", "api_key": "k"}))),
        );

        assert_eq!(stub.1["content"][0]["text"], "Hello from HelloWorld! Parameter: one");
        assert_eq!(weather.1["content"][0]["text"], "Current weather in Oslo: 20°C");
    }

    #[tokio::test]
    async fn should_report_tool_count_on_health() {
        let app = app_from_config(CONFIG);

        let (status, json) = send(
            &app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tools"], 3);
    }
}
