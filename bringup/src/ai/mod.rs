pub mod config;
pub mod enhance;
pub mod openai;
pub mod prompts;
pub mod provider;

// Re-export for convenience
pub use config::LlmConfig;
pub use enhance::{enhance_plan, generate_plan_llm, LLM_HEADER};
pub use openai::{AIError, OpenAIClient};
pub use prompts::{build_user_prompt, SYSTEM_PROMPT};
pub use provider::AIProvider;
