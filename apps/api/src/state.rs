use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::search::SearchProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text generation backend. Gemini in production; tests swap in scripted stubs.
    pub llm: Arc<dyn TextGenerator>,
    /// Web search backend feeding the research stage.
    pub search: Arc<dyn SearchProvider>,
    pub config: Config,
}
