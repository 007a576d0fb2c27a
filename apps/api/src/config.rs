use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Directory for delivery artifacts (JSON drafts, HTML cards, summaries).
    pub output_dir: String,
    pub discord_webhook_url: Option<String>,
    pub zapier_webhook_url: Option<String>,
    pub llm_timeout_secs: u64,
    pub search_timeout_secs: u64,
    /// Attempt cap for the safe-content regeneration loop.
    pub safe_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "generated_content".to_string()),
            discord_webhook_url: optional_env("DISCORD_WEBHOOK_URL"),
            zapier_webhook_url: optional_env("ZAPIER_WEBHOOK_URL"),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            search_timeout_secs: std::env::var("SEARCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .context("SEARCH_TIMEOUT_SECS must be a number of seconds")?,
            safe_max_attempts: std::env::var("SAFE_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse::<u32>()
                .context("SAFE_MAX_ATTEMPTS must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns `None` for unset or blank variables so webhook targets can be
/// toggled off by clearing them.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
