// Data source trait for raw JSONL text
use async_trait::async_trait;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human readable origin, used in logs
    fn describe(&self) -> String;

    /// Read the whole dataset as text
    async fn read_text(&self) -> anyhow::Result<String>;
}
