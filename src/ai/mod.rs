mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::ApiError;

/// Seam around the generative-text collaborator. Production uses the Gemini
/// REST API; tests swap in a canned implementation via `AppState::fake()`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;
}
