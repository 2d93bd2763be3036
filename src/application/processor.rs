// Data processor - Executes worker requests, independent of where it runs
use crate::application::aggregator::{aggregate_runtime, aggregate_temperature};
use crate::application::messages::{WorkerRequest, WorkerResponse};
use crate::application::parser::{parse_chunked, DEFAULT_CHUNK_SIZE};
use crate::application::projector::project;
use chrono::Local;
use std::panic::{self, AssertUnwindSafe};

/// Run `request` to completion, emitting zero or more progress messages and
/// exactly one terminal response. Panics are reported as `Error` responses.
pub fn process<F>(request: WorkerRequest, mut emit: F)
where
    F: FnMut(WorkerResponse),
{
    let kind = request.kind();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| execute(request, &mut emit)));

    if let Err(cause) = outcome {
        let message = cause
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| cause.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown failure".to_string());
        tracing::error!("Worker request {} failed: {}", kind, message);
        emit(WorkerResponse::Error { message });
    }
}

fn execute<F>(request: WorkerRequest, emit: &mut F)
where
    F: FnMut(WorkerResponse),
{
    match request {
        WorkerRequest::ParseJsonl { text, chunk_size } => {
            let chunk_size = chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
            let outcome = parse_chunked(&text, chunk_size, |p| {
                emit(WorkerResponse::Progress {
                    progress: p.progress,
                    processed: p.processed,
                    total: p.total,
                })
            });
            let mut records = outcome.records;
            records.sort_by_key(|r| r.timestamp);
            emit(WorkerResponse::ParseComplete {
                records,
                skipped: outcome.skipped,
            });
        }
        WorkerRequest::PrepareChartData {
            records,
            temperature_unit,
        } => {
            emit(WorkerResponse::ChartDataReady {
                series_points: project(&records, temperature_unit),
            });
        }
        WorkerRequest::AggregateRuntime { series, granularity } => {
            emit(WorkerResponse::RuntimeAggregated {
                buckets: aggregate_runtime(&series, granularity, &Local),
                granularity,
            });
        }
        WorkerRequest::AggregateTemperature { series, granularity } => {
            emit(WorkerResponse::TemperatureAggregated {
                buckets: aggregate_temperature(&series, granularity, &Local),
                granularity,
            });
        }
    }
}
