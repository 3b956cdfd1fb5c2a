//! LLM enhancement of an offline plan
//!
//! The offline plan is always the starting point. The model only contributes
//! free text appended to the notes; steps are never rewritten. Any failure
//! leaves the plan exactly as it was.

use crate::ai::config::LlmConfig;
use crate::ai::openai::OpenAIClient;
use crate::ai::prompts::{build_user_prompt, SYSTEM_PROMPT};
use crate::ai::provider::AIProvider;
use crate::context::{search_context_for_entities, ContextStore};
use crate::model::{ParsedEntities, TestPlan};
use crate::plan::generate_plan_offline;

pub const LLM_HEADER: &str = "LLM Enhancements:";

pub async fn enhance_plan(
    plan: TestPlan,
    entities: &ParsedEntities,
    provider: &dyn AIProvider,
    store: Option<&dyn ContextStore>,
) -> TestPlan {
    let context = store
        .map(|s| search_context_for_entities(s, &entities.to_json()))
        .filter(|c| !c.is_empty());
    if let Some(ctx) = &context {
        tracing::info!("Using {} context lines from library", ctx.lines().count());
    }

    let user = build_user_prompt(entities, context.as_deref());
    match provider.complete(SYSTEM_PROMPT, &user).await {
        Ok(text) => {
            tracing::info!("Plan enhanced by {}", provider.name());
            plan.append_notes(LLM_HEADER, text.trim())
        }
        Err(e) => {
            tracing::warn!("LLM enhancement via {} failed, keeping offline plan: {}", provider.name(), e);
            plan
        }
    }
}

/// Offline plan, enhanced when a credential is configured.
pub async fn generate_plan_llm(
    entities: &ParsedEntities,
    config: &LlmConfig,
    store: Option<&dyn ContextStore>,
) -> TestPlan {
    let plan = generate_plan_offline(entities);
    if !config.is_configured() {
        tracing::info!("No LLM credential configured, using offline plan");
        return plan;
    }
    let client = OpenAIClient::from_config(config);
    enhance_plan(plan, entities, &client, store).await
}
