// Remote data source fetched over HTTP
use crate::application::data_source::DataSource;
use anyhow::{Context, Result};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct HttpDataSource {
    url: String,
    client: reqwest::Client,
}

impl HttpDataSource {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn read_text(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", self.url))?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Fetching {} failed with status {}", self.url, status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};

    #[tokio::test]
    async fn test_fetches_body_and_rejects_error_status() {
        let app = Router::new().route("/sample.jsonl", get(|| async { "{\"a\":1}" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let source = HttpDataSource::new(format!("http://{}/sample.jsonl", addr));
        assert_eq!(source.read_text().await.unwrap(), "{\"a\":1}");

        let missing = HttpDataSource::new(format!("http://{}/missing.jsonl", addr));
        let err = missing.read_text().await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
