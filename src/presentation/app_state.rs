// Application state for HTTP handlers
use crate::application::viewer_service::ViewerService;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub viewer_service: ViewerService,
    pub static_root: PathBuf,
}
