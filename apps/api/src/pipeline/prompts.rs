//! Prompt constants and builders for the pipeline stages.
//!
//! Templates use `{placeholder}` markers filled by the builder functions.
//! The wording is tuned for short-form output, not contractual: stages must
//! survive any shape of model reply (fence stripping, degenerate fallback).

use crate::pipeline::state::ContentType;

/// Research analysis prompt. Replace `{topic}` and `{search_text}`.
pub const RESEARCH_PROMPT_TEMPLATE: &str = r#"Analyze the following search results about "{topic}" and extract structured research.

Return a JSON object with this EXACT schema (every key present, values are arrays of short strings):
{
  "insights": ["key insight about the topic"],
  "trends": ["current trend"],
  "content_angles": ["angle for a social media post"],
  "debates": ["point people disagree on"],
  "tips": ["actionable tip"]
}

Do NOT use markdown code fences. Do NOT include text outside the JSON object.

SEARCH RESULTS:
{search_text}"#;

/// Tweet generation prompt. Replace `{topic}`, `{insights}`, `{content_type}`.
pub const TWITTER_PROMPT_TEMPLATE: &str = r#"Create an engaging tweet about "{topic}".

Key insights to draw from:
{insights}

Requirements:
- Maximum 280 characters
- Start with a hook: a question, surprising fact, or bold statement
- Include 2-3 relevant hashtags
- End with a call to action
- Tone: {content_type}

Return ONLY the tweet text, no explanations."#;

/// LinkedIn post prompt. Replace `{topic}`, `{insights}`, `{content_type}`.
pub const LINKEDIN_PROMPT_TEMPLATE: &str = r#"Write a professional LinkedIn post about "{topic}".

Key insights to include:
{insights}

Structure:
1. Hook (first 1-2 lines)
2. The key insights as bullet points
3. A personal take or industry perspective
4. A question to drive engagement
5. 3-5 relevant hashtags

Length: between 500 and 1500 characters.
Tone: {content_type}

Return ONLY the post text, no explanations."#;

/// Twitter prompts use at most this many insights; LinkedIn takes them all.
const TWITTER_INSIGHT_CAP: usize = 3;

pub fn build_research_prompt(topic: &str, search_text: &str) -> String {
    RESEARCH_PROMPT_TEMPLATE
        .replace("{topic}", topic)
        .replace("{search_text}", search_text)
}

pub fn build_twitter_prompt(topic: &str, insights: &[String], content_type: ContentType) -> String {
    let insight_lines = bullet_lines(insights.iter().take(TWITTER_INSIGHT_CAP));
    TWITTER_PROMPT_TEMPLATE
        .replace("{topic}", topic)
        .replace("{insights}", &insight_lines)
        .replace("{content_type}", content_type.as_str())
}

pub fn build_linkedin_prompt(
    topic: &str,
    insights: &[String],
    content_type: ContentType,
) -> String {
    let insight_lines = bullet_lines(insights.iter());
    LINKEDIN_PROMPT_TEMPLATE
        .replace("{topic}", topic)
        .replace("{insights}", &insight_lines)
        .replace("{content_type}", content_type.as_str())
}

fn bullet_lines<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
