//! Run state — the single record threaded through the content pipeline.
//!
//! Every stage consumes the state by value and returns it with its own
//! fields filled in. Each content field has exactly one producing stage and
//! is never overwritten; Finalize only copies. `record_error` is the one
//! mutation that puts a run on the terminal error path, after which routing
//! schedules no further stage.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("valid regex"));

/// All `#word` tokens in order of first appearance, duplicates kept.
///
/// Shared by the writer stages (which report the hashtags of generated
/// posts) and the safety validator (which bounds their count).
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Enums
// ────────────────────────────────────────────────────────────────────────────

/// A target social network. Unknown platform names are rejected at the HTTP
/// boundary by serde, so the pipeline never sees anything but these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
}

impl Platform {
    /// Human-facing name for delivery artifacts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Linkedin => "LinkedIn",
        }
    }
}

/// Influences prompt construction only; no routing depends on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Educational,
    Entertaining,
    Promotional,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Educational => "educational",
            ContentType::Entertaining => "entertaining",
            ContentType::Promotional => "promotional",
        }
    }
}

/// Lifecycle tag for a run. Monotonic except for `Error`, which is terminal
/// and reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Starting,
    Researched,
    TwitterWritten,
    LinkedinWritten,
    Completed,
    Error,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage outputs
// ────────────────────────────────────────────────────────────────────────────

/// Everything the research stage learned about a topic.
#[derive(Debug, Clone)]
pub struct ResearchBundle {
    pub insights: Vec<String>,
    pub trends: Vec<String>,
    pub content_angles: Vec<String>,
    pub debates: Vec<String>,
    pub tips: Vec<String>,
    /// Flattened external-search text the model was shown.
    pub raw_search: String,
    pub researched_at: DateTime<Utc>,
}

impl ResearchBundle {
    /// Compact summary handed to the writer stages: `insights` followed by
    /// `tips`, truncated to the first 5 items without reordering.
    pub fn key_insights(&self) -> Vec<String> {
        self.insights
            .iter()
            .chain(self.tips.iter())
            .take(5)
            .cloned()
            .collect()
    }
}

/// A finished post for one platform.
#[derive(Debug, Clone)]
pub struct PlatformPost {
    pub content: String,
    pub hashtags: Vec<String>,
    pub character_count: usize,
    pub platform: Platform,
}

impl PlatformPost {
    /// Derives `hashtags` and `character_count` from the text itself, so
    /// fallback posts report real numbers like generated ones.
    pub fn new(content: String, platform: Platform) -> Self {
        let hashtags = extract_hashtags(&content);
        let character_count = content.chars().count();
        Self {
            content,
            hashtags,
            character_count,
            platform,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ContentState
// ────────────────────────────────────────────────────────────────────────────

/// One value per pipeline invocation. Created fresh per run, discarded (or
/// handed to a delivery adapter) once finalized. No cross-request state.
#[derive(Debug, Clone)]
pub struct ContentState {
    /// Log correlation only.
    pub run_id: Uuid,
    pub topic: String,
    pub target_platforms: Vec<Platform>,
    pub content_type: ContentType,
    pub research: Option<ResearchBundle>,
    pub key_insights: Vec<String>,
    pub twitter_content: Option<PlatformPost>,
    pub linkedin_content: Option<PlatformPost>,
    /// Mirrors the Twitter post's hashtags (the writer that owns this field).
    pub hashtags: Vec<String>,
    pub final_twitter: Option<String>,
    pub final_linkedin: Option<String>,
    pub status: RunStatus,
    /// Append-only; never cleared within a run.
    pub errors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ContentState {
    /// Fresh state in `Starting`, platforms deduplicated in request order.
    pub fn new(topic: String, target_platforms: Vec<Platform>, content_type: ContentType) -> Self {
        let mut platforms: Vec<Platform> = Vec::with_capacity(target_platforms.len());
        for platform in target_platforms {
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }

        Self {
            run_id: Uuid::new_v4(),
            topic,
            target_platforms: platforms,
            content_type,
            research: None,
            key_insights: Vec::new(),
            twitter_content: None,
            linkedin_content: None,
            hashtags: Vec::new(),
            final_twitter: None,
            final_linkedin: None,
            status: RunStatus::Starting,
            errors: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn targets(&self, platform: Platform) -> bool {
        self.target_platforms.contains(&platform)
    }

    /// Appends a failure description and flips the run onto the terminal
    /// error path.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.status = RunStatus::Error;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
