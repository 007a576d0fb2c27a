//! Axum route handlers for the Content API.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::delivery::{deliver, ContentBundle, DeliveryMethod, DeliveryReport};
use crate::errors::AppError;
use crate::pipeline::machine::ContentPipeline;
use crate::pipeline::state::{ContentState, ContentType, Platform, RunStatus};
use crate::safety::retry::generate_safe_content;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub topic: String,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub content_type: ContentType,
    pub delivery: Option<DeliveryMethod>,
}

fn default_platforms() -> Vec<Platform> {
    vec![Platform::Twitter]
}

#[derive(Debug, Deserialize)]
pub struct SafeContentRequest {
    pub topic: String,
    pub max_attempts: Option<u32>,
    pub delivery: Option<DeliveryMethod>,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub run_id: Uuid,
    pub success: bool,
    pub message: String,
    pub content: BTreeMap<Platform, String>,
    pub hashtags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryReport>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/content
///
/// Full pipeline: research → platform writers → finalize. Returns the
/// generated post per requested platform; delivery runs afterwards when a
/// method is named.
pub async fn handle_create_content(
    State(state): State<AppState>,
    Json(request): Json<CreateContentRequest>,
) -> Result<Json<ContentResponse>, AppError> {
    if request.topic.trim().is_empty() {
        return Err(AppError::Validation("topic cannot be empty".to_string()));
    }

    let pipeline = ContentPipeline::new(state.llm.clone(), state.search.clone());
    let run = pipeline
        .run(
            request.topic.clone(),
            request.platforms,
            request.content_type,
        )
        .await;

    if run.status == RunStatus::Error {
        return Err(AppError::Pipeline(run.errors.join("; ")));
    }

    let content = content_map(&run);
    if content.is_empty() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "run {} completed without content",
            run.run_id
        )));
    }

    let delivery =
        deliver_if_requested(&run, &request.topic, request.delivery, &state).await;

    Ok(Json(ContentResponse {
        run_id: run.run_id,
        success: true,
        message: format!("Content generated for topic: {}", request.topic),
        content,
        hashtags: run.hashtags,
        delivery,
    }))
}

/// POST /api/v1/content/safe
///
/// Twitter-only generation under the safety validator, retried on a
/// softened topic. 422 when every attempt is rejected.
pub async fn handle_create_safe_content(
    State(state): State<AppState>,
    Json(request): Json<SafeContentRequest>,
) -> Result<Json<ContentResponse>, AppError> {
    if request.topic.trim().is_empty() {
        return Err(AppError::Validation("topic cannot be empty".to_string()));
    }

    let max_attempts = request
        .max_attempts
        .unwrap_or(state.config.safe_max_attempts);

    let pipeline = ContentPipeline::new(state.llm.clone(), state.search.clone());
    let run = generate_safe_content(&pipeline, &request.topic, max_attempts)
        .await
        .ok_or_else(|| {
            AppError::UnsafeContent(format!(
                "no safe content produced after {max_attempts} attempts"
            ))
        })?;

    let content = content_map(&run);
    if content.is_empty() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "run {} completed without content",
            run.run_id
        )));
    }

    let delivery =
        deliver_if_requested(&run, &request.topic, request.delivery, &state).await;

    Ok(Json(ContentResponse {
        run_id: run.run_id,
        success: true,
        message: format!("Safe content generated for topic: {}", request.topic),
        content,
        hashtags: run.hashtags,
        delivery,
    }))
}

fn content_map(run: &ContentState) -> BTreeMap<Platform, String> {
    let mut content = BTreeMap::new();
    if let Some(text) = &run.final_twitter {
        content.insert(Platform::Twitter, text.clone());
    }
    if let Some(text) = &run.final_linkedin {
        content.insert(Platform::Linkedin, text.clone());
    }
    content
}

async fn deliver_if_requested(
    run: &ContentState,
    topic: &str,
    method: Option<DeliveryMethod>,
    state: &AppState,
) -> Option<DeliveryReport> {
    match method {
        Some(method) => Some(
            deliver(
                &ContentBundle::from_state(run),
                topic,
                method,
                &state.config,
            )
            .await,
        ),
        None => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::stubs::{CannedSearch, ScriptedModel};
    use std::sync::Arc;

    fn make_state(replies: Vec<&str>) -> AppState {
        AppState {
            llm: Arc::new(ScriptedModel::new(replies)),
            search: Arc::new(CannedSearch("results")),
            config: Config {
                gemini_api_key: "test-key".to_string(),
                port: 8080,
                rust_log: "info".to_string(),
                output_dir: "generated_content".to_string(),
                discord_webhook_url: None,
                zapier_webhook_url: None,
                llm_timeout_secs: 120,
                search_timeout_secs: 10,
                safe_max_attempts: 3,
            },
        }
    }

    #[test]
    fn test_create_request_defaults() {
        let request: CreateContentRequest = serde_json::from_str(r#"{"topic":"ai"}"#).unwrap();
        assert_eq!(request.topic, "ai");
        assert_eq!(request.platforms, vec![Platform::Twitter]);
        assert_eq!(request.content_type, ContentType::Educational);
        assert!(request.delivery.is_none());
    }

    #[test]
    fn test_create_request_accepts_explicit_fields() {
        let request: CreateContentRequest = serde_json::from_str(
            r#"{"topic":"ai","platforms":["linkedin"],"content_type":"promotional","delivery":"manual"}"#,
        )
        .unwrap();
        assert_eq!(request.platforms, vec![Platform::Linkedin]);
        assert_eq!(request.content_type, ContentType::Promotional);
        assert_eq!(request.delivery, Some(DeliveryMethod::Manual));
    }

    #[test]
    fn test_response_skips_delivery_when_absent() {
        let response = ContentResponse {
            run_id: Uuid::new_v4(),
            success: true,
            message: "ok".to_string(),
            content: BTreeMap::new(),
            hashtags: Vec::new(),
            delivery: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("delivery").is_none());
    }

    #[tokio::test]
    async fn test_create_content_rejects_blank_topic() {
        let state = make_state(vec!["unused"]);
        let request = CreateContentRequest {
            topic: "   ".to_string(),
            platforms: default_platforms(),
            content_type: ContentType::default(),
            delivery: None,
        };

        let result = handle_create_content(State(state), Json(request)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_content_returns_twitter_post() {
        let state = make_state(vec![
            r#"{"insights":["i1"],"trends":[],"content_angles":[],"debates":[],"tips":[]}"#,
            "Remote work keeps evolving! #Remote #Work",
        ]);
        let request = CreateContentRequest {
            topic: "remote work".to_string(),
            platforms: vec![Platform::Twitter],
            content_type: ContentType::default(),
            delivery: None,
        };

        let response = handle_create_content(State(state), Json(request))
            .await
            .unwrap();
        assert!(response.0.success);
        assert_eq!(
            response.0.content.get(&Platform::Twitter).unwrap(),
            "Remote work keeps evolving! #Remote #Work"
        );
        assert_eq!(response.0.hashtags, vec!["#Remote", "#Work"]);
        assert!(response.0.delivery.is_none());
    }

    #[tokio::test]
    async fn test_content_map_orders_twitter_first() {
        let state = make_state(vec![
            r#"{"insights":["i1"],"trends":[],"content_angles":[],"debates":[],"tips":[]}"#,
            "Tweet text #A",
            "LinkedIn text",
        ]);
        let request = CreateContentRequest {
            topic: "ai".to_string(),
            platforms: vec![Platform::Linkedin, Platform::Twitter],
            content_type: ContentType::default(),
            delivery: None,
        };

        let response = handle_create_content(State(state), Json(request))
            .await
            .unwrap();
        let platforms: Vec<_> = response.0.content.keys().copied().collect();
        assert_eq!(platforms, vec![Platform::Twitter, Platform::Linkedin]);
    }

    #[tokio::test]
    async fn test_safe_content_maps_exhaustion_to_unsafe_error() {
        // every attempt produces a tweet the validator rejects
        let state = make_state(vec![
            r#"{"insights":["i1"],"trends":[],"content_angles":[],"debates":[],"tips":[]}"#,
            "Huge market crash incoming, panic now! #Finance",
        ]);
        let request = SafeContentRequest {
            topic: "markets".to_string(),
            max_attempts: Some(2),
            delivery: None,
        };

        let result = handle_create_safe_content(State(state), Json(request)).await;
        assert!(matches!(result, Err(AppError::UnsafeContent(_))));
    }

    #[tokio::test]
    async fn test_safe_content_returns_validated_tweet() {
        let state = make_state(vec![
            r#"{"insights":["i1"],"trends":[],"content_angles":[],"debates":[],"tips":[]}"#,
            "Stay curious and keep learning every day! #Growth #Tips",
        ]);
        let request = SafeContentRequest {
            topic: "learning".to_string(),
            max_attempts: None,
            delivery: None,
        };

        let response = handle_create_safe_content(State(state), Json(request))
            .await
            .unwrap();
        assert!(response.0.success);
        assert!(response.0.content.contains_key(&Platform::Twitter));
        assert!(response.0.message.contains("learning"));
    }
}
