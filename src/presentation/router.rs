// HTTP routes
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard, filter_quick, filter_range, filter_reset, filter_zoom, health_check, load_sample, static_asset,
    status, update_settings, upload,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/status", get(status))
        .route("/api/upload", post(upload))
        .route("/api/sample", post(load_sample))
        .route("/api/dashboard", get(dashboard))
        .route("/api/filter", post(filter_range))
        .route("/api/filter/quick", post(filter_quick))
        .route("/api/filter/reset", post(filter_reset))
        .route("/api/filter/zoom", post(filter_zoom))
        .route("/api/settings", put(update_settings))
        .fallback(static_asset)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::{PipelineOrchestrator, PipelineSettings};
    use crate::application::session::SessionStore;
    use crate::application::view_state::ViewState;
    use crate::application::viewer_service::ViewerService;
    use crate::application::worker::ComputeDispatcher;
    use crate::infrastructure::event_stream::decode_frames;
    use crate::infrastructure::file_source::FileDataSource;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    const RECORDS: &str = concat!(
        r#"{"interval_start":"2024-03-01T00:00:00Z","indoor_temp":21,"outdoor_temp":10}"#,
        "\n",
        r#""{""interval_start"":""2024-03-01T00:15:00Z"",""indoor_temp"":21.5,""outdoor_temp"":9.5}""#,
        "\n",
        r#"{"interval_start":"2024-03-02T00:00:00Z","indoor_temp":22,"outdoor_temp":12,"cooling_time":900}"#,
    );

    fn app(dir: &std::path::Path) -> Router {
        std::fs::write(dir.join("index.html"), "<html></html>").unwrap();
        std::fs::write(dir.join("sample.jsonl"), RECORDS).unwrap();

        let settings = PipelineSettings {
            chunk_size: 2,
            chart_yield: Duration::ZERO,
        };
        let session = Arc::new(SessionStore::new(ViewState::default()));
        let pipeline = PipelineOrchestrator::new(ComputeDispatcher::inline_only(), settings, session);
        let sample = Arc::new(FileDataSource::new(dir.join("sample.jsonl")));
        let state = Arc::new(AppState {
            viewer_service: ViewerService::new(pipeline, sample, Duration::from_millis(300)),
            static_root: dir.to_path_buf(),
        });
        build_router(state, 1024 * 1024)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn upload(app: &Router, text: &str) -> Vec<Value> {
        let request = Request::post("/api/upload").body(Body::from(text.to_string())).unwrap();
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        decode_frames(&bytes)
    }

    #[tokio::test]
    async fn test_health_and_static_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let health = send(&app, Request::get("/healthz").body(Body::empty()).unwrap()).await;
        assert_eq!(health.status(), StatusCode::OK);

        let index = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(index.status(), StatusCode::OK);
        assert_eq!(index.headers()[header::CONTENT_TYPE], "text/html");

        let missing = send(&app, Request::get("/missing.js").body(Body::empty()).unwrap()).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_streams_events_then_serves_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let before = send(&app, Request::get("/api/dashboard").body(Body::empty()).unwrap()).await;
        assert_eq!(before.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(before).await["error"], "No data loaded");

        let events = upload(&app, RECORDS).await;
        assert_eq!(events.first().unwrap()["type"], "step");
        assert_eq!(events.first().unwrap()["step"], "parsing");
        let complete = events.last().unwrap();
        assert_eq!(complete["type"], "complete");
        assert_eq!(complete["records"], 3);
        assert_eq!(events.iter().filter(|e| e["type"] == "chart").count(), 5);

        let dashboard = json_body(send(&app, Request::get("/api/dashboard").body(Body::empty()).unwrap()).await).await;
        assert_eq!(dashboard["stats"]["totalRecords"], 3);
        assert_eq!(dashboard["charts"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_invalid_upload_reports_error_event() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let events = upload(&app, "garbage\n").await;
        let last = events.last().unwrap();
        assert_eq!(last["type"], "error");
        assert_eq!(last["message"], "No valid data found in the file");
    }

    #[tokio::test]
    async fn test_filters() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let sample = send(&app, Request::post("/api/sample").body(Body::empty()).unwrap()).await;
        assert_eq!(sample.status(), StatusCode::OK);
        to_bytes(sample.into_body(), usize::MAX).await.unwrap();

        let missing = send(&app, json_request("POST", "/api/filter", r#"{"start":"2024-03-01T00:00:00Z"}"#)).await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(missing).await["error"], "Please select both start and end dates");

        // Date-time input values carry no offset
        let local = send(
            &app,
            json_request("POST", "/api/filter", r#"{"start":"2024-02-28T00:00","end":"2024-03-04T00:00"}"#),
        )
        .await;
        assert_eq!(local.status(), StatusCode::OK);
        assert_eq!(json_body(local).await["stats"]["totalRecords"], 3);

        let blank = send(&app, json_request("POST", "/api/filter", r#"{"start":"2024-02-28T00:00","end":""}"#)).await;
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

        let empty = send(
            &app,
            json_request("POST", "/api/filter", r#"{"start":"2023-01-01T00:00:00Z","end":"2023-01-02T00:00:00Z"}"#),
        )
        .await;
        assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let quick = send(&app, json_request("POST", "/api/filter/quick", r#"{"days":0}"#)).await;
        assert_eq!(quick.status(), StatusCode::OK);
        assert_eq!(json_body(quick).await["stats"]["totalRecords"], 1);

        let reset = send(&app, Request::post("/api/filter/reset").body(Body::empty()).unwrap()).await;
        assert_eq!(json_body(reset).await["stats"]["totalRecords"], 3);

        let status = json_body(send(&app, Request::get("/api/status").body(Body::empty()).unwrap()).await).await;
        assert_eq!(status["filteredRecords"], 3);
        assert_eq!(status["processing"], false);
    }

    #[tokio::test]
    async fn test_settings() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let early = send(&app, json_request("PUT", "/api/settings", r#"{"unit":"C"}"#)).await;
        assert_eq!(early.status(), StatusCode::NO_CONTENT);

        upload(&app, RECORDS).await;
        let response = send(&app, json_request("PUT", "/api/settings", r#"{"runtimeGranularity":"daily"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let dashboard = json_body(response).await;
        assert_eq!(dashboard["unit"], "C");
        let runtime = dashboard["charts"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["id"] == "runtime")
            .unwrap()
            .clone();
        assert_eq!(runtime["unit"], "Runtime (hours)");
        assert_eq!(runtime["series"][0]["points"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_compressed_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        upload(&app, RECORDS).await;

        let request = Request::get("/api/dashboard")
            .header(header::ACCEPT_ENCODING, "br")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");
    }
}
