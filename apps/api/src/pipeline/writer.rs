//! Platform writer stages — one model call per requested platform.
//!
//! Each writer owns exactly the fields it produces: the Twitter writer sets
//! `twitter_content` plus the run's `hashtags`, the LinkedIn writer sets
//! `linkedin_content`. A failed model call degrades to a static fallback
//! post for that platform, so a writer always yields a well-formed
//! `PlatformPost` and never errors the run.

use tracing::info;

use crate::llm_client::TextGenerator;
use crate::pipeline::prompts::{build_linkedin_prompt, build_twitter_prompt};
use crate::pipeline::state::{ContentState, Platform, PlatformPost, RunStatus};
use crate::pipeline::{degrade, StageError};

pub async fn write_twitter(llm: &dyn TextGenerator, mut state: ContentState) -> ContentState {
    info!("run {}: writing Twitter post", state.run_id);

    let prompt = build_twitter_prompt(&state.topic, &state.key_insights, state.content_type);
    let outcome = generate_post(llm, &prompt, Platform::Twitter).await;
    let post = degrade("twitter writer", outcome, || {
        fallback_post(&state.topic, Platform::Twitter)
    });

    state.hashtags = post.hashtags.clone();
    state.twitter_content = Some(post);
    state.status = RunStatus::TwitterWritten;
    state
}

pub async fn write_linkedin(llm: &dyn TextGenerator, mut state: ContentState) -> ContentState {
    info!("run {}: writing LinkedIn post", state.run_id);

    let prompt = build_linkedin_prompt(&state.topic, &state.key_insights, state.content_type);
    let outcome = generate_post(llm, &prompt, Platform::Linkedin).await;
    let post = degrade("linkedin writer", outcome, || {
        fallback_post(&state.topic, Platform::Linkedin)
    });

    state.linkedin_content = Some(post);
    state.status = RunStatus::LinkedinWritten;
    state
}

async fn generate_post(
    llm: &dyn TextGenerator,
    prompt: &str,
    platform: Platform,
) -> Result<PlatformPost, StageError> {
    let text = llm.generate(prompt).await?;
    Ok(PlatformPost::new(text.trim().to_string(), platform))
}

/// Static substitute used when the model call fails.
fn fallback_post(topic: &str, platform: Platform) -> PlatformPost {
    let content = match platform {
        Platform::Twitter => {
            format!("Exciting developments in {topic}! What's your take? #AI #Tech")
        }
        Platform::Linkedin => format!(
            "Interesting developments are happening in {topic}.\n\n\
             The landscape keeps shifting, and staying informed matters more than ever.\n\n\
             What are your thoughts?\n\n#Professional #Industry"
        ),
    };
    PlatformPost::new(content, platform)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
