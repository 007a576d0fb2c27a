//! Research stage — turns a topic into a structured insights bundle.
//!
//! One best-effort web search plus one model call asked to structure the
//! findings into five categories. Search or model failure degrades to a
//! minimal topic-echoing bundle; a malformed model reply degrades to a
//! degenerate bundle carrying the raw text as its only insight. The only
//! way this stage errors the run is a blank topic.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::{strip_json_fences, TextGenerator};
use crate::pipeline::prompts::build_research_prompt;
use crate::pipeline::state::{ContentState, ResearchBundle, RunStatus};
use crate::pipeline::{degrade, StageError};
use crate::search::SearchProvider;

/// The five categories the model is asked to produce. Missing keys default
/// to empty so a partial answer still parses.
#[derive(Debug, Default, Deserialize)]
struct ResearchFindings {
    #[serde(default)]
    insights: Vec<String>,
    #[serde(default)]
    trends: Vec<String>,
    #[serde(default)]
    content_angles: Vec<String>,
    #[serde(default)]
    debates: Vec<String>,
    #[serde(default)]
    tips: Vec<String>,
}

pub async fn run_research(
    llm: &dyn TextGenerator,
    search: &dyn SearchProvider,
    mut state: ContentState,
) -> ContentState {
    if state.topic.trim().is_empty() {
        warn!("run {}: research failed: topic is empty", state.run_id);
        state.record_error("research failed: topic is empty");
        return state;
    }

    info!("run {}: researching '{}'", state.run_id, state.topic);

    let outcome = research_topic(llm, search, &state.topic).await;
    let bundle = degrade("research", outcome, || fallback_bundle(&state.topic));

    state.key_insights = bundle.key_insights();
    state.research = Some(bundle);
    state.status = RunStatus::Researched;
    state
}

async fn research_topic(
    llm: &dyn TextGenerator,
    search: &dyn SearchProvider,
    topic: &str,
) -> Result<ResearchBundle, StageError> {
    let raw_search = search.search(&recency_query(topic)).await?;
    let prompt = build_research_prompt(topic, &raw_search);
    let reply = llm.generate(&prompt).await?;
    Ok(parse_findings(&reply, raw_search))
}

/// Search query with recency qualifiers derived from the clock.
fn recency_query(topic: &str) -> String {
    let year = Utc::now().year();
    format!("{topic} {year} {} latest trends", year + 1)
}

/// Parses the model reply into a bundle. A reply that is not valid JSON is
/// kept verbatim as the sole insight rather than discarded.
fn parse_findings(reply: &str, raw_search: String) -> ResearchBundle {
    let cleaned = strip_json_fences(reply);
    let findings = match serde_json::from_str::<ResearchFindings>(cleaned) {
        Ok(findings) => findings,
        Err(err) => {
            warn!("research reply was not structured ({err}); keeping raw text");
            ResearchFindings {
                insights: vec![reply.to_string()],
                ..ResearchFindings::default()
            }
        }
    };

    ResearchBundle {
        insights: findings.insights,
        trends: findings.trends,
        content_angles: findings.content_angles,
        debates: findings.debates,
        tips: findings.tips,
        raw_search,
        researched_at: Utc::now(),
    }
}

/// Minimal bundle used when search or the model is unreachable.
fn fallback_bundle(topic: &str) -> ResearchBundle {
    ResearchBundle {
        insights: vec![format!("Research topic: {topic}")],
        trends: vec!["AI and technology advancement".to_string()],
        content_angles: vec!["Educational content".to_string()],
        debates: vec![],
        tips: vec!["Stay updated with latest trends".to_string()],
        raw_search: String::new(),
        researched_at: Utc::now(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
