//! Pipeline orchestrator — an explicit state machine over the stages.
//!
//! `Stage` enumerates the nodes, `transition` is the pure routing function,
//! and `ContentPipeline::run` is the driver loop that applies stages until
//! routing returns `None`. Every edge lives in `transition`, including the
//! rule that an errored state schedules nothing further.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::llm_client::TextGenerator;
use crate::pipeline::research::run_research;
use crate::pipeline::state::{ContentState, ContentType, Platform, RunStatus};
use crate::pipeline::writer::{write_linkedin, write_twitter};
use crate::search::SearchProvider;

/// Workflow nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Research,
    WriteTwitter,
    WriteLinkedin,
    Finalize,
}

/// Pure routing: the stage to run after `stage` produced `state`, `None` to
/// terminate. An errored state terminates from every stage.
pub fn transition(stage: Stage, state: &ContentState) -> Option<Stage> {
    if state.status == RunStatus::Error {
        return None;
    }

    match stage {
        // Twitter precedence: with both platforms requested, Twitter is
        // written first. An empty platform list defaults to Twitter.
        Stage::Research => {
            if state.targets(Platform::Twitter) || state.target_platforms.is_empty() {
                Some(Stage::WriteTwitter)
            } else {
                Some(Stage::WriteLinkedin)
            }
        }
        Stage::WriteTwitter => {
            if state.targets(Platform::Linkedin) && state.linkedin_content.is_none() {
                Some(Stage::WriteLinkedin)
            } else {
                Some(Stage::Finalize)
            }
        }
        Stage::WriteLinkedin => Some(Stage::Finalize),
        Stage::Finalize => None,
    }
}

/// The machine a handler drives for one request. Holds shared collaborator
/// handles; every invocation owns an independent `ContentState`.
pub struct ContentPipeline {
    llm: Arc<dyn TextGenerator>,
    search: Arc<dyn SearchProvider>,
}

impl ContentPipeline {
    pub fn new(llm: Arc<dyn TextGenerator>, search: Arc<dyn SearchProvider>) -> Self {
        Self { llm, search }
    }

    /// Drives a fresh state to its terminal outcome: `Completed` with final
    /// content, or `Error` with a non-empty error list. Exactly one of the
    /// two, never both, never neither.
    pub async fn run(
        &self,
        topic: String,
        platforms: Vec<Platform>,
        content_type: ContentType,
    ) -> ContentState {
        let mut state = ContentState::new(topic, platforms, content_type);
        info!(
            "run {}: starting pipeline for {:?}",
            state.run_id, state.target_platforms
        );

        let mut stage = Some(Stage::Research);
        while let Some(current) = stage {
            state = self.apply(current, state).await;
            stage = transition(current, &state);
        }

        info!(
            "run {}: pipeline terminated with {:?}",
            state.run_id, state.status
        );
        state
    }

    async fn apply(&self, stage: Stage, state: ContentState) -> ContentState {
        match stage {
            Stage::Research => run_research(self.llm.as_ref(), self.search.as_ref(), state).await,
            Stage::WriteTwitter => write_twitter(self.llm.as_ref(), state).await,
            Stage::WriteLinkedin => write_linkedin(self.llm.as_ref(), state).await,
            Stage::Finalize => finalize(state),
        }
    }
}

/// Copies writer output into the final fields and stamps completion.
/// Copies only; nothing is regenerated here.
fn finalize(mut state: ContentState) -> ContentState {
    state.final_twitter = state.twitter_content.as_ref().map(|p| p.content.clone());
    state.final_linkedin = state.linkedin_content.as_ref().map(|p| p.content.clone());
    state.completed_at = Some(Utc::now());
    state.status = RunStatus::Completed;
    state
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
