//! Insight API router.
//!
//! Returns a composable `Router` with all routes nested under `/api/`.
//! Layers (outermost first): CORS, access log.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::insight::InsightProxy;

/// Build the insight API router.
pub fn insight_api_router(proxy: Arc<InsightProxy>) -> Router {
    let ctx = ApiContext::new(proxy);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/insights/:kind", post(endpoints::insights::generate))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::error::UPSTREAM_FAILURE_MESSAGE;
    use crate::config::GenerationSettings;
    use crate::insight::{fallback_payload, InsightKind, MockLlmClient};

    fn router_with(client: Arc<MockLlmClient>) -> Router {
        let proxy = InsightProxy::new(
            client,
            GenerationSettings {
                model: "test-model".into(),
                temperature: 0.7,
                max_tokens: 1000,
            },
        );
        insight_api_router(Arc::new(proxy))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok_without_upstream_call() {
        let client = Arc::new(MockLlmClient::new("unused"));
        let app = router_with(client.clone());

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-Request-Id"));

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "test-model");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn symptom_analysis_passes_upstream_json_through() {
        let upstream = json!({
            "possibleConditions": [
                {"name": "Acute coronary syndrome", "probability": 60, "description": "Needs ECG"}
            ],
            "urgency": "high",
            "recommendations": ["Go to the emergency department"],
            "redFlags": ["Pain at rest"]
        });
        let app = router_with(Arc::new(MockLlmClient::new(&upstream.to_string())));

        let req = post_json(
            "/api/insights/symptom-analysis",
            json!({"symptoms": "chest pain, shortness of breath", "age": 54, "gender": "male"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["kind"], "structured");
        assert_eq!(json["data"]["urgency"], "high");
        assert_eq!(json["data"], upstream);
    }

    #[tokio::test]
    async fn unparseable_content_returns_fallback_as_success() {
        let app = router_with(Arc::new(MockLlmClient::new("not json")));

        let req = post_json(
            "/api/insights/symptom-analysis",
            json!({"symptoms": "chest pain, shortness of breath", "age": 54, "gender": "male"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["kind"], "structured");
        assert_eq!(json["data"]["urgency"], "medium");
        assert_eq!(json["data"]["possibleConditions"][0]["name"], "Unable to analyze");
        assert_eq!(
            Some(json["data"].clone()),
            fallback_payload(InsightKind::SymptomAnalysis)
        );
    }

    #[tokio::test]
    async fn missing_primary_field_returns_400_without_upstream_call() {
        let client = Arc::new(MockLlmClient::new("{}"));
        let app = router_with(client.clone());

        let req = post_json(
            "/api/insights/symptom-analysis",
            json!({"age": 54, "gender": "male"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"].as_str().unwrap().contains("symptoms"));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_returns_502() {
        let app = router_with(Arc::new(MockLlmClient::failing(500, "internal")));

        let req = post_json(
            "/api/insights/clinical-decision",
            json!({"caseDescription": "Fever and cough"}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "UPSTREAM_FAILED");
        assert_eq!(json["error"]["message"], UPSTREAM_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn unreachable_upstream_returns_502() {
        let app = router_with(Arc::new(MockLlmClient::unreachable()));

        let req = post_json(
            "/api/insights/radiology-report",
            json!({"findings": "No acute abnormality."}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn case_summary_returns_cleaned_text() {
        let app = router_with(Arc::new(MockLlmClient::new(
            "**Assessment**\n\n\n\nCommunity-acquired *pneumonia*.",
        )));

        let req = post_json(
            "/api/insights/case-summary",
            json!({"caseText": "72F with fever, cough, right basal crackles."}),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(
            json,
            json!({"kind": "text", "data": "Assessment\n\nCommunity-acquired pneumonia."})
        );
    }

    #[tokio::test]
    async fn unknown_kind_returns_404() {
        let client = Arc::new(MockLlmClient::new("{}"));
        let app = router_with(client.clone());

        let req = post_json("/api/insights/billing", json!({"symptoms": "x"}));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn non_object_body_returns_400() {
        let client = Arc::new(MockLlmClient::new("{}"));
        let app = router_with(client.clone());

        let req = post_json("/api/insights/symptom-analysis", json!(["chest pain"]));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn get_on_insight_route_is_rejected() {
        let app = router_with(Arc::new(MockLlmClient::new("{}")));

        let req = Request::builder()
            .uri("/api/insights/symptom-analysis")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let app = router_with(Arc::new(MockLlmClient::new("{}")));

        let req = Request::builder()
            .uri("/api/nonexistent")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
