//! Delivery adapters — getting finalized content to the user.
//!
//! Three paths: `manual` (JSON draft + HTML copy-paste card), `guided`
//! (step-by-step instructions plus the JSON draft), and `webhook` (Discord
//! and/or Zapier pushes, falling back to manual files when nothing was
//! delivered). Every path also writes a plain-text email summary. Adapter
//! failures are logged and recorded in the report, never raised: a
//! completed run always hands the caller whatever was deliverable.

pub mod files;
pub mod webhook;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::pipeline::state::{ContentState, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Manual,
    Guided,
    Webhook,
}

/// The finalized bundle a delivery adapter accepts.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub hashtags: Vec<String>,
}

impl ContentBundle {
    pub fn from_state(state: &ContentState) -> Self {
        Self {
            twitter: state.final_twitter.clone(),
            linkedin: state.final_linkedin.clone(),
            hashtags: state.hashtags.clone(),
        }
    }

    /// Present platforms in delivery order: Twitter, then LinkedIn.
    pub fn platform_texts(&self) -> Vec<(Platform, &str)> {
        let mut texts = Vec::new();
        if let Some(twitter) = self.twitter.as_deref() {
            texts.push((Platform::Twitter, twitter));
        }
        if let Some(linkedin) = self.linkedin.as_deref() {
            texts.push((Platform::Linkedin, linkedin));
        }
        texts
    }
}

/// Per-target outcome of a webhook push.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResult {
    pub target: String,
    pub delivered: bool,
}

/// What a delivery attempt produced.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub method: DeliveryMethod,
    /// Paths of artifacts written to the output directory.
    pub files: Vec<String>,
    pub webhooks: Vec<WebhookResult>,
}

/// Runs one delivery method over a finalized bundle. Infallible by design:
/// every failure lands in the report or the log.
pub async fn deliver(
    bundle: &ContentBundle,
    topic: &str,
    method: DeliveryMethod,
    config: &Config,
) -> DeliveryReport {
    let mut report = DeliveryReport {
        method,
        files: Vec::new(),
        webhooks: Vec::new(),
    };
    // One stamp per delivery so sibling artifacts correlate on disk.
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();

    match method {
        DeliveryMethod::Manual => {
            files::write_manual_artifacts(bundle, topic, &config.output_dir, &stamp, &mut report)
                .await;
        }
        DeliveryMethod::Guided => {
            files::write_guided_artifacts(bundle, topic, &config.output_dir, &stamp, &mut report)
                .await;
        }
        DeliveryMethod::Webhook => {
            webhook::send_webhooks(bundle, topic, config, &mut report).await;
            if report.webhooks.iter().all(|w| !w.delivered) {
                info!("no webhook target delivered; falling back to manual files");
                files::write_manual_artifacts(
                    bundle,
                    topic,
                    &config.output_dir,
                    &stamp,
                    &mut report,
                )
                .await;
            }
        }
    }

    files::write_email_summary(bundle, topic, &config.output_dir, &stamp, &mut report).await;

    info!(
        "delivery via {:?}: {} file(s), {} webhook target(s)",
        report.method,
        report.files.len(),
        report.webhooks.len()
    );
    report
}
