// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod event_stream;
pub mod file_source;
pub mod http_response;
pub mod http_source;
pub mod static_assets;
