// Local file data source
use crate::application::data_source::DataSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileDataSource {
    path: PathBuf,
}

impl FileDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_text(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"interval_start\":\"2024-01-01T00:00:00Z\"}}").unwrap();

        let source = FileDataSource::new(file.path());
        let text = source.read_text().await.unwrap();
        assert!(text.contains("interval_start"));
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileDataSource::new(dir.path().join("missing.jsonl"));
        let err = source.read_text().await.unwrap_err();
        assert!(err.to_string().contains("missing.jsonl"));
    }
}
