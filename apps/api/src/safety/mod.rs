//! Content safety gate for the auto-posting path.
//!
//! A pure first-fail check chain: sensitive keywords, fake-news-shaped
//! patterns, length bounds, hashtag count. The reason string always names
//! the first check that failed. A rejection is normal control flow, not an
//! error: it drives the bounded regeneration loop in `retry`.

pub mod retry;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pipeline::state::extract_hashtags;

/// Keywords that keep generated content away from tragedy and violence.
/// Matched case-insensitively as substrings, in this order.
const SENSITIVE_KEYWORDS: &[&str] = &[
    "crash",
    "died",
    "dead",
    "killed",
    "tragedy",
    "disaster",
    "accident",
    "explosion",
    "terrorist",
    "attack",
    "bomb",
    "murder",
    "suicide",
    "death",
    "funeral",
    "shooting",
];

/// Pattern source strings kept alongside their compiled form so rejection
/// reasons can quote the pattern exactly as configured.
const FAKE_NEWS_PATTERNS: &[&str] = &[
    r"\d+\s+(dead|died|killed)",
    r"(breaking|urgent).*crash",
    r"astrologer.*predict",
    r"investigation.*death",
];

static COMPILED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    FAKE_NEWS_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid pattern"))
        .collect()
});

const MAX_CHARS: usize = 280;
const MIN_CHARS: usize = 10;
const MAX_HASHTAGS: usize = 5;

/// Outcome of a safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub accepted: bool,
    pub reason: String,
}

impl SafetyVerdict {
    fn reject(reason: String) -> Self {
        Self {
            accepted: false,
            reason,
        }
    }
}

/// Checks one candidate text. The first failing check decides the verdict;
/// later checks do not run.
pub fn validate_content(text: &str) -> SafetyVerdict {
    let lowered = text.to_lowercase();

    for &keyword in SENSITIVE_KEYWORDS {
        if lowered.contains(keyword) {
            return SafetyVerdict::reject(format!("Contains sensitive keyword: {keyword}"));
        }
    }

    for (pattern, compiled) in FAKE_NEWS_PATTERNS.iter().zip(COMPILED_PATTERNS.iter()) {
        if compiled.is_match(&lowered) {
            return SafetyVerdict::reject(format!("Matches fake news pattern: {pattern}"));
        }
    }

    let length = text.chars().count();
    if length > MAX_CHARS {
        return SafetyVerdict::reject(format!("Too long: {length} characters"));
    }
    if length < MIN_CHARS {
        return SafetyVerdict::reject("Too short".to_string());
    }

    if extract_hashtags(text).len() > MAX_HASHTAGS {
        return SafetyVerdict::reject("Too many hashtags".to_string());
    }

    SafetyVerdict {
        accepted: true,
        reason: "Content is safe".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_content_is_accepted() {
        let verdict = validate_content("Great productivity tip today! #AI #Tips");
        assert!(verdict.accepted);
        assert_eq!(verdict.reason, "Content is safe");
    }

    #[test]
    fn test_sensitive_keyword_rejects_with_keyword_name() {
        let verdict = validate_content("There was an explosion at the factory");
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "Contains sensitive keyword: explosion");
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let verdict = validate_content("Huge EXPLOSION downtown today");
        assert_eq!(verdict.reason, "Contains sensitive keyword: explosion");
    }

    #[test]
    fn test_keyword_list_order_decides_the_reason() {
        // "crash" precedes "died" in the keyword table
        let verdict = validate_content("They died when the market crash hit");
        assert_eq!(verdict.reason, "Contains sensitive keyword: crash");
    }

    #[test]
    fn test_fake_news_pattern_rejects_with_pattern_source() {
        let verdict = validate_content("An astrologer claims to predict the markets");
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "Matches fake news pattern: astrologer.*predict");
    }

    #[test]
    fn test_pattern_match_is_case_insensitive() {
        let verdict = validate_content("ASTROLOGER will PREDICT your week");
        assert_eq!(verdict.reason, "Matches fake news pattern: astrologer.*predict");
    }

    #[test]
    fn test_keyword_check_runs_before_pattern_check() {
        // matches both the "investigation.*death" pattern and the "death"
        // keyword; the keyword fires first
        let verdict = validate_content("investigation opened into the death");
        assert_eq!(verdict.reason, "Contains sensitive keyword: death");
    }

    #[test]
    fn test_too_long_reports_character_count() {
        let text = "a".repeat(281);
        let verdict = validate_content(&text);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "Too long: 281 characters");
    }

    #[test]
    fn test_length_is_counted_in_chars_not_bytes() {
        let text = "☕".repeat(281);
        assert_eq!(validate_content(&text).reason, "Too long: 281 characters");

        let boundary = "☕".repeat(280);
        assert!(validate_content(&boundary).accepted);
    }

    #[test]
    fn test_exactly_280_chars_is_accepted() {
        let text = "a".repeat(280);
        assert!(validate_content(&text).accepted);
    }

    #[test]
    fn test_five_chars_is_too_short() {
        let verdict = validate_content("hello");
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "Too short");
    }

    #[test]
    fn test_exactly_ten_chars_is_accepted() {
        assert!(validate_content("1234567890").accepted);
    }

    #[test]
    fn test_nine_chars_is_too_short() {
        assert_eq!(validate_content("123456789").reason, "Too short");
    }

    #[test]
    fn test_keyword_beats_length_check() {
        let text = format!("tragedy {}", "a".repeat(300));
        assert_eq!(
            validate_content(&text).reason,
            "Contains sensitive keyword: tragedy"
        );
    }

    #[test]
    fn test_six_hashtags_rejects() {
        let verdict = validate_content("Check these out #a #b #c #d #e #f");
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "Too many hashtags");
    }

    #[test]
    fn test_five_hashtags_is_accepted() {
        assert!(validate_content("Nice roundup of tips #a #b #c #d #e").accepted);
    }

    #[test]
    fn test_duplicate_hashtags_count_toward_the_bound() {
        let verdict = validate_content("Same tag spam #x #x #x #x #x #x");
        assert_eq!(verdict.reason, "Too many hashtags");
    }

    #[test]
    fn test_empty_content_is_too_short() {
        assert_eq!(validate_content("").reason, "Too short");
    }
}
