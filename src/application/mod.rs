// Application layer - Use cases and the data pipeline
pub mod aggregator;
pub mod chart_builder;
pub mod data_source;
pub mod debounce;
pub mod filter;
pub mod messages;
pub mod parser;
pub mod pipeline;
pub mod processor;
pub mod projector;
pub mod session;
pub mod view_state;
pub mod viewer_service;
pub mod worker;
