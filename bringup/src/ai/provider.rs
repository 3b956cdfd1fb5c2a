//! AI Provider Trait
//!
//! Common interface for chat-style completion backends.

use async_trait::async_trait;

use crate::ai::AIError;

#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Run one system + user exchange and return the assistant text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, AIError>;
}
