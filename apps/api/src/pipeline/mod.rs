//! The content pipeline: research → platform writers → finalize.
//!
//! Stages consume and return `ContentState`. Upstream failures (search,
//! model) never escape a stage: the `degrade` combinator substitutes the
//! stage's fallback value and the run continues. Routing and the terminal
//! error path live in `machine`.

pub mod handlers;
pub mod machine;
pub mod prompts;
pub mod research;
pub mod state;
pub mod writer;

use thiserror::Error;
use tracing::warn;

/// An upstream failure inside a stage. These are degraded to fallback
/// content, never propagated to the orchestrator.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("search failed: {0}")]
    Search(#[from] crate::search::SearchError),

    #[error("model call failed: {0}")]
    Llm(#[from] crate::llm_client::LlmError),
}

/// Uniform fallback policy: log the failure, substitute the stage's
/// fallback value, keep the run moving.
pub fn degrade<T>(stage: &str, outcome: Result<T, StageError>, fallback: impl FnOnce() -> T) -> T {
    match outcome {
        Ok(value) => value,
        Err(err) => {
            warn!("{stage} degraded to fallback: {err}");
            fallback()
        }
    }
}

#[cfg(test)]
pub mod stubs {
    //! Canned collaborators shared by stage and driver tests.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, TextGenerator};
    use crate::search::{SearchError, SearchProvider};

    /// Replies with the queued texts in call order (the last one repeats),
    /// recording every prompt it receives.
    pub struct ScriptedModel {
        replies: Vec<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: replies.into_iter().map(Into::into).collect(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn recorded_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            let mut prompts = self.prompts.lock().unwrap();
            let index = prompts.len().min(self.replies.len().saturating_sub(1));
            prompts.push(prompt.to_string());
            self.replies.get(index).cloned().ok_or(LlmError::EmptyContent)
        }
    }

    /// Always fails with an API error.
    pub struct FailingModel;

    #[async_trait]
    impl TextGenerator for FailingModel {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "stubbed outage".to_string(),
            })
        }
    }

    /// Returns the same flattened text for every query.
    pub struct CannedSearch(pub &'static str);

    #[async_trait]
    impl SearchProvider for CannedSearch {
        async fn search(&self, _query: &str) -> Result<String, SearchError> {
            Ok(self.0.to_string())
        }
    }

    /// Always fails with an HTTP status error.
    pub struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str) -> Result<String, SearchError> {
            Err(SearchError::Status(503))
        }
    }
}
