// Background computation channel - Request/response over message passing
use crate::application::messages::{WorkerRequest, WorkerResponse};
use crate::application::processor::process;
use crate::domain::error::{ViewerError, ViewerResult};
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;

pub type ResponseReceiver = mpsc::UnboundedReceiver<WorkerResponse>;

/// Request handed back by a channel that can no longer accept work.
#[derive(Debug)]
pub struct Rejected(pub WorkerRequest);

/// A computation context reached only through typed messages.
pub trait ComputeChannel: Send + Sync {
    fn submit(&self, request: WorkerRequest) -> Result<ResponseReceiver, Rejected>;
}

type Job = (WorkerRequest, mpsc::UnboundedSender<WorkerResponse>);

/// Dedicated OS thread that owns nothing but the data moved into it.
pub struct BackgroundWorker {
    jobs: mpsc::UnboundedSender<Job>,
}

impl BackgroundWorker {
    pub fn spawn() -> std::io::Result<Self> {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();

        thread::Builder::new()
            .name("hvac-worker".to_string())
            .spawn(move || {
                tracing::debug!("Background worker started");
                while let Some((request, reply)) = queue.blocking_recv() {
                    tracing::debug!("Worker handling {}", request.kind());
                    process(request, |response| {
                        // Requester may have gone away; nothing to do then
                        let _ = reply.send(response);
                    });
                }
                tracing::debug!("Background worker stopped");
            })?;

        Ok(Self { jobs })
    }
}

impl ComputeChannel for BackgroundWorker {
    fn submit(&self, request: WorkerRequest) -> Result<ResponseReceiver, Rejected> {
        let (reply, responses) = mpsc::unbounded_channel();
        self.jobs
            .send((request, reply))
            .map_err(|returned| Rejected((returned.0).0))?;
        Ok(responses)
    }
}

/// Synchronous execution on the calling task. Used when no worker is
/// available and for payloads too small to be worth the hop.
fn run_inline(request: WorkerRequest) -> ResponseReceiver {
    let (reply, responses) = mpsc::unbounded_channel();
    process(request, |response| {
        let _ = reply.send(response);
    });
    responses
}

/// Chooses between the background worker and inline execution.
#[derive(Clone)]
pub struct ComputeDispatcher {
    worker: Option<Arc<dyn ComputeChannel>>,
    offload_threshold: usize,
}

impl ComputeDispatcher {
    pub fn new(worker: Option<Arc<dyn ComputeChannel>>, offload_threshold: usize) -> Self {
        Self {
            worker,
            offload_threshold,
        }
    }

    pub fn inline_only() -> Self {
        Self::new(None, usize::MAX)
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Whether `volume` items should be processed off the calling task.
    pub fn should_offload(&self, volume: usize) -> bool {
        self.worker.is_some() && volume > self.offload_threshold
    }

    /// Submit to the worker when `offload` is set and a worker exists, falling
    /// back to inline execution if the worker is gone.
    pub fn submit(&self, request: WorkerRequest, offload: bool) -> ResponseReceiver {
        let request = match (&self.worker, offload) {
            (Some(worker), true) => match worker.submit(request) {
                Ok(responses) => return responses,
                Err(Rejected(request)) => {
                    tracing::warn!("Worker unavailable for {}, computing inline", request.kind());
                    request
                }
            },
            _ => request,
        };
        run_inline(request)
    }
}

/// Wait for the terminal response of a request, forwarding progress messages.
pub async fn await_terminal<F>(mut responses: ResponseReceiver, mut on_progress: F) -> ViewerResult<WorkerResponse>
where
    F: FnMut(u8, usize, usize),
{
    while let Some(response) = responses.recv().await {
        match response {
            WorkerResponse::Progress {
                progress,
                processed,
                total,
            } => on_progress(progress, processed, total),
            WorkerResponse::Error { message } => return Err(ViewerError::Worker(message)),
            terminal => return Ok(terminal),
        }
    }
    Err(ViewerError::ChannelClosed)
}
