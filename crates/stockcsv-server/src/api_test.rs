use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use super::*;

fn test_state() -> AppState {
    let config = AppConfig {
        bind_addr: "127.0.0.1:0".parse().expect("valid addr"),
        log_level: "info".to_string(),
        request_timeout_secs: 5,
        user_agent: "test-agent".to_string(),
        per_page: 250,
        inter_request_delay_ms: 0,
        max_retries: 0,
        retry_backoff_base_secs: 0,
        render_timeout_secs: 5,
        headless_enabled: false,
        account_override: None,
    };
    AppState {
        config: Arc::new(config),
    }
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    String::from_utf8(bytes.to_vec()).expect("valid utf-8")
}

#[tokio::test]
async fn index_serves_the_entry_form() {
    let app = build_app(test_state());
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<form"));
    assert!(body.contains(r#"name="url""#));
}

#[tokio::test]
async fn missing_url_is_rejected_with_a_form_error() {
    let app = build_app(test_state());
    let response = app
        .oneshot(Request::get("/scrape").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Please enter"));
}

#[tokio::test]
async fn blank_url_in_form_body_is_rejected() {
    let app = build_app(test_state());
    let response = app
        .oneshot(
            Request::post("/scrape")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("url=+++"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn error_messages_are_html_escaped() {
    let page = render_form(Some(r#"<script>alert("x")</script>"#));
    assert!(!page.contains("<script>alert"));
    assert!(page.contains("&lt;script&gt;"));
}
