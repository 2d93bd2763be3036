// Static asset responder for the viewer page
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

const INDEX_FILE: &str = "index.html";

pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("jsonl") => "application/jsonl",
        _ => "text/plain",
    }
}

/// Map a request path onto `root`. `None` for anything escaping the root.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() { INDEX_FILE } else { relative };

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/plain"));
    response
}

pub async fn serve_asset(root: &Path, request_path: &str) -> Response<Body> {
    let Some(path) = resolve(root, request_path) else {
        tracing::debug!("Rejected asset path {}", request_path);
        return plain(StatusCode::NOT_FOUND, "File not found");
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static(content_type_for(&path)),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                header::HeaderValue::from_static("*"),
            );
            response
        }
        Err(e) if e.kind() == ErrorKind::NotFound => plain(StatusCode::NOT_FOUND, "File not found"),
        Err(e) => {
            tracing::error!("Failed to read asset {}: {}", path.display(), e);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
