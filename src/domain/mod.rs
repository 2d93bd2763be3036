// Domain layer - Telemetry records, units and chart models
pub mod dashboard;
pub mod error;
pub mod granularity;
pub mod record;
pub mod series;
pub mod stats;
pub mod telemetry;
pub mod units;
