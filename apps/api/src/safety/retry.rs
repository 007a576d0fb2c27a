//! Bounded regenerate-until-safe driver for the auto-posting path.
//!
//! Re-runs the full pipeline against a softened topic rewrite until the
//! validator accepts the Twitter post or attempts run out. Exhaustion
//! yields `None`: callers fall back to a manual delivery path, never
//! posting unvalidated content.

use tracing::{info, warn};

use crate::pipeline::machine::ContentPipeline;
use crate::pipeline::state::{ContentState, ContentType, Platform, RunStatus};
use crate::safety::validate_content;

/// Topic rewrite applied before each guarded attempt.
const SAFE_TOPIC_TEMPLATE: &str = "Write positive, educational content about {topic}. \
    Focus on helpful tips, insights, or trends. \
    Avoid any negative, tragic, or controversial content.";

/// Runs up to `max_attempts` full Twitter-only pipeline passes over the
/// softened topic, returning the first run whose tweet the validator
/// accepts.
pub async fn generate_safe_content(
    pipeline: &ContentPipeline,
    topic: &str,
    max_attempts: u32,
) -> Option<ContentState> {
    let safe_topic = SAFE_TOPIC_TEMPLATE.replace("{topic}", topic);

    for attempt in 1..=max_attempts {
        info!("safe content attempt {attempt}/{max_attempts} for '{topic}'");

        let state = pipeline
            .run(
                safe_topic.clone(),
                vec![Platform::Twitter],
                ContentType::Educational,
            )
            .await;

        if state.status != RunStatus::Completed {
            warn!("attempt {attempt}: pipeline did not complete");
            continue;
        }

        let content = match state.final_twitter.as_deref() {
            Some(content) => content,
            None => {
                warn!("attempt {attempt}: completed run carried no tweet");
                continue;
            }
        };

        let verdict = validate_content(content);
        if verdict.accepted {
            info!("attempt {attempt}: content accepted");
            return Some(state);
        }

        warn!("attempt {attempt}: content rejected ({})", verdict.reason);
    }

    warn!("no safe content for '{topic}' after {max_attempts} attempts");
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
