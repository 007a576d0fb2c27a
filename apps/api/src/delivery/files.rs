//! File artifacts — JSON drafts, HTML copy-paste cards, guided posting
//! instructions, and email summaries under the configured output directory.
//!
//! Artifacts are terminal outputs: plain, human-readable, never read back
//! by the system. Filenames are keyed by the delivery timestamp, which is
//! the only collision guard concurrent runs get.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use tokio::fs;
use tracing::{info, warn};

use crate::delivery::{ContentBundle, DeliveryReport};
use crate::pipeline::state::Platform;

const SLUG_MAX_CHARS: usize = 20;

pub async fn write_manual_artifacts(
    bundle: &ContentBundle,
    topic: &str,
    output_dir: &str,
    stamp: &str,
    report: &mut DeliveryReport,
) {
    write_json_draft(bundle, topic, output_dir, stamp, report).await;
    persist(
        Path::new(output_dir).join(format!("content_card_{stamp}.html")),
        render_html_card(bundle, topic),
        "copy-paste card",
        report,
    )
    .await;
}

pub async fn write_guided_artifacts(
    bundle: &ContentBundle,
    topic: &str,
    output_dir: &str,
    stamp: &str,
    report: &mut DeliveryReport,
) {
    persist(
        Path::new(output_dir).join(format!("guided_{stamp}.txt")),
        render_guided_instructions(bundle, topic),
        "guided instructions",
        report,
    )
    .await;
    // the guided flow keeps the draft around for pasting
    write_json_draft(bundle, topic, output_dir, stamp, report).await;
}

pub async fn write_email_summary(
    bundle: &ContentBundle,
    topic: &str,
    output_dir: &str,
    stamp: &str,
    report: &mut DeliveryReport,
) {
    persist(
        Path::new(output_dir).join(format!("email_summary_{stamp}.txt")),
        render_email_summary(bundle, topic),
        "email summary",
        report,
    )
    .await;
}

async fn write_json_draft(
    bundle: &ContentBundle,
    topic: &str,
    output_dir: &str,
    stamp: &str,
    report: &mut DeliveryReport,
) {
    let slug = topic_slug(topic);
    match serde_json::to_string_pretty(&render_draft_json(bundle, topic)) {
        Ok(draft) => {
            persist(
                Path::new(output_dir).join(format!("content_{stamp}_{slug}.json")),
                draft,
                "content draft",
                report,
            )
            .await;
        }
        Err(err) => warn!("failed to serialize content draft: {err}"),
    }
}

/// Writes one artifact, recording the path on success and logging on
/// failure. Delivery never raises.
async fn persist(path: PathBuf, contents: String, kind: &str, report: &mut DeliveryReport) {
    let written = async {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, contents).await
    }
    .await;

    match written {
        Ok(()) => {
            info!("wrote {kind}: {}", path.display());
            report.files.push(path.display().to_string());
        }
        Err(err) => warn!("failed to write {kind} at {}: {err}", path.display()),
    }
}

/// Filename-safe topic fragment: lowercased, non-alphanumerics squashed to
/// underscores, capped at 20 chars.
fn topic_slug(topic: &str) -> String {
    topic
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(SLUG_MAX_CHARS)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Renderers
// ────────────────────────────────────────────────────────────────────────────

fn render_draft_json(bundle: &ContentBundle, topic: &str) -> serde_json::Value {
    let mut content = serde_json::Map::new();
    for (platform, text) in bundle.platform_texts() {
        content.insert(platform.display_name().to_lowercase(), json!(text));
    }

    json!({
        "topic": topic,
        "generated_at": Utc::now().to_rfc3339(),
        "content": content,
        "hashtags": bundle.hashtags,
        "instructions": "Copy each platform's text from `content` and post it manually.",
    })
}

fn render_html_card(bundle: &ContentBundle, topic: &str) -> String {
    let mut sections = String::new();
    for (platform, text) in bundle.platform_texts() {
        let name = platform.display_name();
        let id = name.to_lowercase();
        sections.push_str(&format!(
            "    <section>\n      <h2>{name}</h2>\n      <textarea id=\"{id}\" rows=\"8\" readonly>{}</textarea>\n      <button onclick=\"copyText('{id}')\">Copy {name} post</button>\n    </section>\n",
            escape_html(text),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Generated content: {topic}</title>
  <style>
    body {{ font-family: sans-serif; max-width: 720px; margin: 2rem auto; }}
    textarea {{ width: 100%; font: inherit; }}
    section {{ margin-bottom: 1.5rem; }}
  </style>
</head>
<body>
  <h1>Generated content</h1>
  <p>Topic: {topic}</p>
  <p>Hashtags: {hashtags}</p>
{sections}  <script>
    function copyText(id) {{
      navigator.clipboard.writeText(document.getElementById(id).value);
    }}
  </script>
</body>
</html>
"#,
        topic = escape_html(topic),
        hashtags = escape_html(&bundle.hashtags.join(" ")),
        sections = sections,
    )
}

fn render_email_summary(bundle: &ContentBundle, topic: &str) -> String {
    let mut body = format!(
        "Subject: Social content ready: {topic}\nGenerated: {}\n",
        Utc::now().to_rfc3339()
    );

    for (platform, text) in bundle.platform_texts() {
        body.push_str(&format!("\n==== {} ====\n{text}\n", platform.display_name()));
    }

    body.push_str(&format!("\nHashtags: {}\n", bundle.hashtags.join(" ")));
    body
}

fn render_guided_instructions(bundle: &ContentBundle, topic: &str) -> String {
    let mut body = format!("Guided posting for: {topic}\n");

    for (step, (platform, text)) in bundle.platform_texts().into_iter().enumerate() {
        let compose_url = match platform {
            Platform::Twitter => "https://twitter.com/compose/tweet",
            Platform::Linkedin => "https://www.linkedin.com/feed/",
        };
        body.push_str(&format!(
            "\nStep {}: open {compose_url}, paste the {} post below, review, then publish.\n\n--- {} post ---\n{text}\n",
            step + 1,
            platform.display_name(),
            platform.display_name(),
        ));
    }

    body.push_str(&format!(
        "\nSuggested hashtags: {}\n",
        bundle.hashtags.join(" ")
    ));
    body
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_bundle(twitter: Option<&str>, linkedin: Option<&str>) -> ContentBundle {
        ContentBundle {
            twitter: twitter.map(String::from),
            linkedin: linkedin.map(String::from),
            hashtags: vec!["#AI".to_string(), "#Tips".to_string()],
        }
    }

    #[test]
    fn test_topic_slug_sanitizes_and_truncates() {
        assert_eq!(
            topic_slug("Remote Work: AI & future!!"),
            "remote_work__ai___fu"
        );
        assert_eq!(topic_slug("ai"), "ai");
    }

    #[test]
    fn test_draft_json_carries_platform_map_and_hashtags() {
        let value = render_draft_json(&make_bundle(Some("tweet"), Some("post")), "remote work");
        assert_eq!(value["topic"], "remote work");
        assert_eq!(value["content"]["twitter"], "tweet");
        assert_eq!(value["content"]["linkedin"], "post");
        assert_eq!(value["hashtags"][1], "#Tips");
    }

    #[test]
    fn test_draft_json_omits_absent_platforms() {
        let value = render_draft_json(&make_bundle(Some("tweet"), None), "remote work");
        assert!(value["content"].get("linkedin").is_none());
    }

    #[test]
    fn test_html_card_escapes_embedded_markup() {
        let hostile = "</textarea><script>alert(1)</script> #A";
        let html = render_html_card(&make_bundle(Some(hostile), None), "topic");
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;alert(1)&lt;/script&gt; #A"));
    }

    #[test]
    fn test_html_card_renders_one_section_per_present_platform() {
        let html = render_html_card(&make_bundle(Some("tweet"), None), "topic");
        assert!(html.contains("<h2>Twitter</h2>"));
        assert!(!html.contains("<h2>LinkedIn</h2>"));
    }

    #[test]
    fn test_email_summary_lists_platforms_and_hashtags() {
        let summary = render_email_summary(&make_bundle(Some("tweet"), Some("post")), "ai");
        assert!(summary.contains("Subject: Social content ready: ai"));
        assert!(summary.contains("==== Twitter ====\ntweet"));
        assert!(summary.contains("==== LinkedIn ====\npost"));
        assert!(summary.contains("Hashtags: #AI #Tips"));
    }

    #[test]
    fn test_guided_instructions_number_steps_per_platform() {
        let both = render_guided_instructions(&make_bundle(Some("t"), Some("l")), "ai");
        assert!(both.contains("Step 1: open https://twitter.com/compose/tweet"));
        assert!(both.contains("Step 2: open https://www.linkedin.com/feed/"));

        let twitter_only = render_guided_instructions(&make_bundle(Some("t"), None), "ai");
        assert!(!twitter_only.contains("Step 2"));
    }

    #[tokio::test]
    async fn test_manual_artifacts_use_stamped_names() {
        let dir = tempdir().unwrap();
        let mut report = DeliveryReport {
            method: crate::delivery::DeliveryMethod::Manual,
            files: Vec::new(),
            webhooks: Vec::new(),
        };

        write_manual_artifacts(
            &make_bundle(Some("tweet"), None),
            "Remote Work",
            dir.path().to_str().unwrap(),
            "20250101_120000",
            &mut report,
        )
        .await;

        assert_eq!(report.files.len(), 2);
        assert!(report.files[0].ends_with("content_20250101_120000_remote_work.json"));
        assert!(report.files[1].ends_with("content_card_20250101_120000.html"));
    }

    #[tokio::test]
    async fn test_persist_creates_missing_output_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("deep");
        let mut report = DeliveryReport {
            method: crate::delivery::DeliveryMethod::Guided,
            files: Vec::new(),
            webhooks: Vec::new(),
        };

        write_email_summary(
            &make_bundle(Some("tweet"), None),
            "ai",
            nested.to_str().unwrap(),
            "20250101_120000",
            &mut report,
        )
        .await;

        assert_eq!(report.files.len(), 1);
        assert!(std::path::Path::new(&report.files[0]).exists());
    }
}
