// Pipeline orchestrator - Parse, project, summarize and chart a dataset, streaming progress
use crate::application::aggregator;
use crate::application::chart_builder::{self, ChartId};
use crate::application::messages::{WorkerRequest, WorkerResponse};
use crate::application::parser::ParseOutcome;
use crate::application::projector::ProjectionCache;
use crate::application::session::{Session, SessionStore};
use crate::application::view_state::ViewState;
use crate::application::worker::{await_terminal, ComputeDispatcher};
use crate::domain::dashboard::Dashboard;
use crate::domain::error::{ViewerError, ViewerResult};
use crate::domain::granularity::Granularity;
use crate::domain::record::RecordSet;
use crate::domain::series::{RuntimeBucket, SeriesPoint, TemperatureBucket};
use crate::domain::stats::Stats;
use crate::domain::telemetry::{ChartData, TileData};
use crate::domain::units::TemperatureUnit;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

const DASHBOARD_TITLE: &str = "HVAC Telemetry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineStage {
    Idle,
    Parsing,
    Projecting,
    StatsReady,
    ChartsBuilding,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineStep {
    Parsing,
    Processing,
    Stats,
    Charts,
    Complete,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PipelineEvent {
    Progress {
        progress: u8,
        processed: usize,
        total: usize,
    },
    Step {
        step: PipelineStep,
    },
    Stats {
        stats: Stats,
        tiles: Vec<TileData>,
    },
    Chart {
        chart: ChartData,
    },
    Complete {
        records: usize,
        skipped: usize,
        duration_ms: u64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub chunk_size: usize,
    /// Pause between charts; zero only yields to the scheduler.
    pub chart_yield: Duration,
}

/// How [`PipelineOrchestrator::update`] applies a new view state.
#[derive(Debug, Clone)]
pub enum ViewChange {
    /// Store the state and keep what was rendered.
    Keep(ViewState),
    /// Store the state and recompute stats, and charts when asked to.
    Render { state: ViewState, rebuild_charts: bool },
}

/// Held for the duration of a run. Dropping it always clears the flag.
pub struct ProcessingGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct PipelineOrchestrator {
    dispatcher: ComputeDispatcher,
    settings: PipelineSettings,
    session: Arc<SessionStore>,
    processing: Arc<AtomicBool>,
    stage: Arc<watch::Sender<PipelineStage>>,
}

impl PipelineOrchestrator {
    pub fn new(dispatcher: ComputeDispatcher, settings: PipelineSettings, session: Arc<SessionStore>) -> Self {
        let (stage, _) = watch::channel(PipelineStage::Idle);
        Self {
            dispatcher,
            settings,
            session,
            processing: Arc::new(AtomicBool::new(false)),
            stage: Arc::new(stage),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn stage(&self) -> PipelineStage {
        *self.stage.borrow()
    }

    /// Claim the single run slot.
    pub fn begin(&self) -> ViewerResult<ProcessingGuard> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ViewerError::Busy)?;
        Ok(ProcessingGuard {
            flag: self.processing.clone(),
        })
    }

    pub fn start(&self, text: String) -> ViewerResult<mpsc::Receiver<PipelineEvent>> {
        let guard = self.begin()?;
        Ok(self.run_with(guard, text))
    }

    /// Run the pipeline over `text` in the background. The returned stream
    /// ends after a `complete` or `error` event.
    pub fn run_with(&self, guard: ProcessingGuard, text: String) -> mpsc::Receiver<PipelineEvent> {
        let (tx, rx) = mpsc::channel(100);
        let this = self.clone();

        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = this.run(text, &tx).await;
            match outcome {
                Ok((records, skipped)) => {
                    this.stage.send_replace(PipelineStage::Complete);
                    let duration_ms = started.elapsed().as_millis() as u64;
                    tracing::info!("Loaded {} records ({} skipped) in {}ms", records, skipped, duration_ms);
                    let _ = tx
                        .send(PipelineEvent::Step {
                            step: PipelineStep::Complete,
                        })
                        .await;
                    let _ = tx
                        .send(PipelineEvent::Complete {
                            records,
                            skipped,
                            duration_ms,
                        })
                        .await;
                }
                Err(e) => {
                    this.stage.send_replace(PipelineStage::Failed);
                    tracing::error!("Pipeline failed: {}", e);
                    let _ = tx.send(PipelineEvent::Error { message: e.to_string() }).await;
                }
            }
            drop(guard);
        });

        rx
    }

    async fn run(&self, text: String, tx: &mpsc::Sender<PipelineEvent>) -> ViewerResult<(usize, usize)> {
        // 1. Parse, preferably off the async runtime
        self.enter(PipelineStage::Parsing, PipelineStep::Parsing, tx).await;
        let request = WorkerRequest::ParseJsonl {
            text,
            chunk_size: Some(self.settings.chunk_size),
        };
        let responses = self.dispatcher.submit(request, self.dispatcher.has_worker());
        let outcome = match await_terminal(responses, |progress, processed, total| {
            // Progress is best effort; a slow reader just misses some
            let _ = tx.try_send(PipelineEvent::Progress {
                progress,
                processed,
                total,
            });
        })
        .await?
        {
            WorkerResponse::ParseComplete { records, skipped } => ParseOutcome { records, skipped },
            other => return Err(unexpected(&other)),
        };
        let skipped = outcome.skipped;
        let records = outcome.into_record_set()?;

        // 2. Project into the display unit. Filter and settings changes wait
        // for the commit, then apply on top of the new dataset.
        self.enter(PipelineStage::Projecting, PipelineStep::Processing, tx).await;
        let writer = self.session.writer().await;
        let state = writer.state().await.with_records(records);
        let mut projection = ProjectionCache::new();
        let points = self.project(&state.filtered, state.unit, &mut projection).await?;

        // 3. Statistics
        let stats = Stats::compute(&state.filtered, state.unit);
        self.enter(PipelineStage::StatsReady, PipelineStep::Stats, tx).await;
        let _ = tx
            .send(PipelineEvent::Stats {
                tiles: stats.tiles(),
                stats: stats.clone(),
            })
            .await;

        // 4. Charts, one at a time
        self.enter(PipelineStage::ChartsBuilding, PipelineStep::Charts, tx).await;
        let mut charts = Vec::with_capacity(ChartId::ALL.len());
        for (i, id) in ChartId::ALL.iter().enumerate() {
            if i > 0 {
                self.pause_between_charts().await;
            }
            let chart = self.build_chart(*id, &state, &points).await?;
            let _ = tx.send(PipelineEvent::Chart { chart: chart.clone() }).await;
            charts.push(chart);
        }

        // 5. Commit only once everything succeeded
        let total = state.records.len();
        writer
            .commit(Session {
                state,
                projection,
                stats: Some(stats),
                charts,
            })
            .await;

        Ok((total, skipped))
    }

    /// Derive the next view state from the current one and commit it.
    /// Updates never interleave with each other or with a run's commit, so
    /// `change` always sees the latest committed state.
    ///
    /// Returns the resulting dashboard, or `None` while no data is loaded.
    pub async fn update<F>(&self, change: F) -> ViewerResult<Option<Dashboard>>
    where
        F: FnOnce(&ViewState) -> ViewerResult<ViewChange>,
    {
        let writer = self.session.writer().await;
        let current = writer.snapshot().await;
        let next = match change(&current.state)? {
            ViewChange::Keep(state) => Session { state, ..current },
            ViewChange::Render { state, rebuild_charts } => self.render(current, state, rebuild_charts).await?,
        };
        let dashboard = next.state.has_data().then(|| dashboard_of(&next));
        writer.commit(next).await;
        Ok(dashboard)
    }

    /// Re-render `state` against what `current` already holds. With
    /// `rebuild_charts` unset the previously built charts are kept.
    async fn render(&self, current: Session, state: ViewState, rebuild_charts: bool) -> ViewerResult<Session> {
        let mut projection = current.projection;
        let stats = Stats::compute(&state.filtered, state.unit);

        let charts = if rebuild_charts {
            let points = self.project(&state.filtered, state.unit, &mut projection).await?;
            let mut charts = Vec::with_capacity(ChartId::ALL.len());
            for id in ChartId::ALL {
                charts.push(self.build_chart(id, &state, &points).await?);
            }
            charts
        } else {
            current.charts
        };

        Ok(Session {
            state,
            projection,
            stats: Some(stats),
            charts,
        })
    }

    pub async fn dashboard(&self) -> ViewerResult<Dashboard> {
        let session = self.session.snapshot().await;
        if !session.state.has_data() {
            return Err(ViewerError::NoData);
        }
        Ok(dashboard_of(&session))
    }

    async fn enter(&self, stage: PipelineStage, step: PipelineStep, tx: &mpsc::Sender<PipelineEvent>) {
        tracing::debug!("Pipeline stage {:?}", stage);
        self.stage.send_replace(stage);
        let _ = tx.send(PipelineEvent::Step { step }).await;
    }

    async fn pause_between_charts(&self) {
        if self.settings.chart_yield.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.settings.chart_yield).await;
        }
    }

    async fn project(
        &self,
        records: &RecordSet,
        unit: TemperatureUnit,
        cache: &mut ProjectionCache,
    ) -> ViewerResult<Arc<[SeriesPoint]>> {
        if let Some(points) = cache.lookup(records, unit) {
            return Ok(points);
        }
        if !self.dispatcher.should_offload(records.len()) {
            return Ok(cache.get_or_project(records, unit));
        }

        let request = WorkerRequest::PrepareChartData {
            records: records.to_vec(),
            temperature_unit: unit,
        };
        match await_terminal(self.dispatcher.submit(request, true), |_, _, _| {}).await? {
            WorkerResponse::ChartDataReady { series_points } => {
                let points: Arc<[SeriesPoint]> = series_points.into();
                cache.store(records, unit, points.clone());
                Ok(points)
            }
            other => Err(unexpected(&other)),
        }
    }

    async fn build_chart(&self, id: ChartId, state: &ViewState, points: &[SeriesPoint]) -> ViewerResult<ChartData> {
        let chart = match id {
            ChartId::Temperature => chart_builder::temperature_chart(points, state.unit, &state.hot_threshold),
            ChartId::Target => chart_builder::target_chart(points, state.unit),
            ChartId::Humidity => chart_builder::humidity_chart(points),
            ChartId::Runtime => {
                let buckets = self.aggregate_runtime(points, state.runtime_granularity).await?;
                chart_builder::runtime_chart(&buckets, state.runtime_granularity)
            }
            ChartId::Correlation => {
                let buckets = self.aggregate_temperature(points, state.correlation_granularity).await?;
                chart_builder::correlation_chart(&buckets, state.correlation_granularity, state.unit)
            }
        };
        Ok(chart)
    }

    async fn aggregate_runtime(&self, points: &[SeriesPoint], granularity: Granularity) -> ViewerResult<Vec<RuntimeBucket>> {
        if !self.dispatcher.should_offload(points.len()) {
            let samples: Vec<_> = points.iter().map(SeriesPoint::runtime_sample).collect();
            return Ok(aggregator::aggregate_runtime(&samples, granularity, &chrono::Local));
        }

        let request = WorkerRequest::AggregateRuntime {
            series: points.iter().map(SeriesPoint::runtime_sample).collect(),
            granularity,
        };
        match await_terminal(self.dispatcher.submit(request, true), |_, _, _| {}).await? {
            WorkerResponse::RuntimeAggregated { buckets, .. } => Ok(buckets),
            other => Err(unexpected(&other)),
        }
    }

    async fn aggregate_temperature(
        &self,
        points: &[SeriesPoint],
        granularity: Granularity,
    ) -> ViewerResult<Vec<TemperatureBucket>> {
        if !self.dispatcher.should_offload(points.len()) {
            let samples: Vec<_> = points.iter().map(SeriesPoint::correlation_sample).collect();
            return Ok(aggregator::aggregate_temperature(&samples, granularity, &chrono::Local));
        }

        let request = WorkerRequest::AggregateTemperature {
            series: points.iter().map(SeriesPoint::correlation_sample).collect(),
            granularity,
        };
        match await_terminal(self.dispatcher.submit(request, true), |_, _, _| {}).await? {
            WorkerResponse::TemperatureAggregated { buckets, .. } => Ok(buckets),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(response: &WorkerResponse) -> ViewerError {
    ViewerError::Worker(format!("unexpected {} response", response.kind()))
}

fn dashboard_of(session: &Session) -> Dashboard {
    let state = &session.state;
    let stats = session
        .stats
        .clone()
        .unwrap_or_else(|| Stats::compute(&state.filtered, state.unit));
    Dashboard::new(
        DASHBOARD_TITLE.to_string(),
        state.unit,
        state.window,
        state.hot_threshold,
        stats,
        session.charts.clone(),
    )
}
