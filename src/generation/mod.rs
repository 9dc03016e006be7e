//! Text generation backends for answer synthesis

pub mod openai_compat;

pub use openai_compat::OpenAiCompatGenerator;

use async_trait::async_trait;

use crate::error::Result;

/// A generation backend that turns a grounded prompt into prose
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
