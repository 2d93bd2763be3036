// Typed messages exchanged with the background computation worker
use crate::domain::granularity::Granularity;
use crate::domain::record::Record;
use crate::domain::series::{CorrelationSample, RuntimeBucket, RuntimeSample, SeriesPoint, TemperatureBucket};
use crate::domain::units::TemperatureUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WorkerRequest {
    #[serde(rename = "parseJSONL")]
    ParseJsonl {
        text: String,
        chunk_size: Option<usize>,
    },
    PrepareChartData {
        records: Vec<Record>,
        temperature_unit: TemperatureUnit,
    },
    AggregateRuntime {
        series: Vec<RuntimeSample>,
        granularity: Granularity,
    },
    AggregateTemperature {
        series: Vec<CorrelationSample>,
        granularity: Granularity,
    },
}

impl WorkerRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerRequest::ParseJsonl { .. } => "parseJSONL",
            WorkerRequest::PrepareChartData { .. } => "prepareChartData",
            WorkerRequest::AggregateRuntime { .. } => "aggregateRuntime",
            WorkerRequest::AggregateTemperature { .. } => "aggregateTemperature",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WorkerResponse {
    Progress {
        progress: u8,
        processed: usize,
        total: usize,
    },
    ParseComplete {
        records: Vec<Record>,
        skipped: usize,
    },
    ChartDataReady {
        series_points: Vec<SeriesPoint>,
    },
    RuntimeAggregated {
        buckets: Vec<RuntimeBucket>,
        granularity: Granularity,
    },
    TemperatureAggregated {
        buckets: Vec<TemperatureBucket>,
        granularity: Granularity,
    },
    Error {
        message: String,
    },
}

impl WorkerResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerResponse::Progress { .. } => "progress",
            WorkerResponse::ParseComplete { .. } => "parseComplete",
            WorkerResponse::ChartDataReady { .. } => "chartDataReady",
            WorkerResponse::RuntimeAggregated { .. } => "runtimeAggregated",
            WorkerResponse::TemperatureAggregated { .. } => "temperatureAggregated",
            WorkerResponse::Error { .. } => "error",
        }
    }
}
