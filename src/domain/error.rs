// Viewer error taxonomy
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("No valid data found in the file")]
    NoValidData,

    #[error("No data loaded")]
    NoData,

    #[error("Please select both start and end dates")]
    MissingBound,

    #[error("Start date must be before end date")]
    InvalidRange,

    #[error("Quick filter day count must not be negative (got {0})")]
    InvalidDayCount(i64),

    #[error("No data found in the selected date range")]
    EmptyFilterResult,

    #[error("A file is already being processed")]
    Busy,

    #[error("Background computation failed: {0}")]
    Worker(String),

    #[error("Background computation channel closed")]
    ChannelClosed,

    #[error("Failed to read input: {0}")]
    Read(String),
}

impl ViewerError {
    /// Validation failures are rejected before any state is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ViewerError::MissingBound | ViewerError::InvalidRange | ViewerError::InvalidDayCount(_)
        )
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
