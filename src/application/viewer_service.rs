// Viewer service - Use cases behind the HTTP surface
use crate::application::data_source::DataSource;
use crate::application::debounce::Debouncer;
use crate::application::filter::{self, FilterRequest};
use crate::application::pipeline::{PipelineEvent, PipelineOrchestrator, PipelineStage, ViewChange};
use crate::application::view_state::{SettingsUpdate, ViewState};
use crate::domain::dashboard::Dashboard;
use crate::domain::error::{ViewerError, ViewerResult};
use crate::domain::record::TimeWindow;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerStatus {
    pub stage: PipelineStage,
    pub processing: bool,
    pub total_records: usize,
    pub filtered_records: usize,
    pub window: Option<TimeWindow>,
}

#[derive(Clone)]
pub struct ViewerService {
    pipeline: PipelineOrchestrator,
    sample: Arc<dyn DataSource>,
    threshold_debounce: Arc<Debouncer>,
}

impl ViewerService {
    pub fn new(pipeline: PipelineOrchestrator, sample: Arc<dyn DataSource>, debounce: Duration) -> Self {
        Self {
            pipeline,
            sample,
            threshold_debounce: Arc::new(Debouncer::new(debounce)),
        }
    }

    pub fn load_text(&self, text: String) -> ViewerResult<mpsc::Receiver<PipelineEvent>> {
        tracing::info!("Loading uploaded dataset ({} bytes)", text.len());
        self.pipeline.start(text)
    }

    /// The run slot is claimed before reading so a busy viewer never fetches.
    pub async fn load_sample(&self) -> ViewerResult<mpsc::Receiver<PipelineEvent>> {
        let guard = self.pipeline.begin()?;
        tracing::info!("Loading sample dataset from {}", self.sample.describe());
        let text = self.sample.read_text().await.map_err(|e| {
            tracing::error!("Failed to load sample data: {:#}", e);
            ViewerError::Read(format!("{:#}", e))
        })?;
        Ok(self.pipeline.run_with(guard, text))
    }

    pub async fn dashboard(&self) -> ViewerResult<Dashboard> {
        self.pipeline.dashboard().await
    }

    pub async fn status(&self) -> ViewerStatus {
        let state = self.pipeline.session().state().await;
        ViewerStatus {
            stage: self.pipeline.stage(),
            processing: self.pipeline.is_processing(),
            total_records: state.records.len(),
            filtered_records: state.filtered.len(),
            window: state.window,
        }
    }

    pub async fn apply_filter(&self, request: FilterRequest) -> ViewerResult<Dashboard> {
        let dashboard = self
            .pipeline
            .update(|state| {
                let outcome = filter::apply(state, request)?;
                Ok(ViewChange::Render {
                    state: outcome.state,
                    rebuild_charts: outcome.rebuild_charts,
                })
            })
            .await?;
        dashboard.ok_or(ViewerError::NoData)
    }

    /// Returns `None` when no data is loaded yet; the settings still apply to
    /// the next load.
    pub async fn update_settings(&self, update: SettingsUpdate) -> ViewerResult<Option<Dashboard>> {
        let threshold_only = update.is_threshold_only();
        let dashboard = self
            .pipeline
            .update(|state| {
                let next = state.with_settings(&update);
                if !next.has_data() || threshold_only {
                    // Nothing rendered yet, or a slider value that redraws once it settles
                    Ok(ViewChange::Keep(next))
                } else {
                    Ok(ViewChange::Render {
                        state: next,
                        rebuild_charts: true,
                    })
                }
            })
            .await?;

        if threshold_only && dashboard.is_some() {
            let pipeline = self.pipeline.clone();
            self.threshold_debounce.call(async move {
                let redraw = |state: &ViewState| -> ViewerResult<ViewChange> {
                    Ok(ViewChange::Render {
                        state: state.clone(),
                        rebuild_charts: true,
                    })
                };
                if let Err(e) = pipeline.update(redraw).await {
                    tracing::warn!("Deferred chart rebuild failed: {}", e);
                }
            });
        }
        Ok(dashboard)
    }
}
