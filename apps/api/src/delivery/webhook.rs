//! Webhook delivery to Discord and Zapier.
//!
//! Each configured target gets one POST and one [`WebhookResult`] entry.
//! Transport errors and unexpected statuses mark the target undelivered;
//! the dispatcher in [`super`] falls back to manual artifacts when every
//! target fails.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::Config;
use crate::delivery::{ContentBundle, DeliveryReport, WebhookResult};

const WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Discord blurple, used for draft embeds.
const EMBED_COLOR: u32 = 3_447_003;

/// Discord caps embed descriptions well above this, but long LinkedIn posts
/// read badly in channel previews.
const EMBED_DESCRIPTION_MAX_CHARS: usize = 500;

pub async fn send_webhooks(
    bundle: &ContentBundle,
    topic: &str,
    config: &Config,
    report: &mut DeliveryReport,
) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
        .build()
        .expect("Failed to build HTTP client");

    if let Some(url) = &config.discord_webhook_url {
        let delivered = send_discord(&client, url, bundle, topic).await;
        report.webhooks.push(WebhookResult {
            target: "discord".to_string(),
            delivered,
        });
    }

    if let Some(url) = &config.zapier_webhook_url {
        let delivered = send_zapier(&client, url, bundle, topic).await;
        report.webhooks.push(WebhookResult {
            target: "zapier".to_string(),
            delivered,
        });
    }
}

async fn send_discord(
    client: &reqwest::Client,
    url: &str,
    bundle: &ContentBundle,
    topic: &str,
) -> bool {
    match client.post(url).json(&discord_payload(bundle, topic)).send().await {
        // Discord acknowledges webhook posts with 204 No Content
        Ok(response) if response.status().as_u16() == 204 => {
            info!("delivered content to Discord webhook");
            true
        }
        Ok(response) => {
            warn!("Discord webhook returned {}", response.status());
            false
        }
        Err(err) => {
            warn!("Discord webhook request failed: {err}");
            false
        }
    }
}

async fn send_zapier(
    client: &reqwest::Client,
    url: &str,
    bundle: &ContentBundle,
    topic: &str,
) -> bool {
    match client.post(url).json(&zapier_payload(bundle, topic)).send().await {
        Ok(response) if response.status().as_u16() == 200 => {
            info!("delivered content to Zapier webhook");
            true
        }
        Ok(response) => {
            warn!("Zapier webhook returned {}", response.status());
            false
        }
        Err(err) => {
            warn!("Zapier webhook request failed: {err}");
            false
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Payloads
// ────────────────────────────────────────────────────────────────────────────

fn discord_payload(bundle: &ContentBundle, topic: &str) -> Value {
    let mut embeds = Vec::new();
    if let Some(twitter) = &bundle.twitter {
        embeds.push(json!({
            "title": "Twitter draft",
            "description": truncate_chars(twitter, EMBED_DESCRIPTION_MAX_CHARS),
            "color": EMBED_COLOR,
        }));
    }
    if let Some(linkedin) = &bundle.linkedin {
        embeds.push(json!({
            "title": "LinkedIn draft",
            "description": truncate_chars(linkedin, EMBED_DESCRIPTION_MAX_CHARS),
            "color": EMBED_COLOR,
        }));
    }

    json!({
        "content": format!("New social content ready for topic: {topic}"),
        "embeds": embeds,
    })
}

fn zapier_payload(bundle: &ContentBundle, topic: &str) -> Value {
    json!({
        "topic": topic,
        "twitter_content": bundle.twitter,
        "linkedin_content": bundle.linkedin,
        "hashtags": bundle.hashtags,
        "generated_at": chrono::Utc::now().to_rfc3339(),
    })
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{truncated}...")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
