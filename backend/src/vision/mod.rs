pub mod openai_service;

use async_trait::async_trait;

use crate::model::ScenePrompt;
use openai_service::VisionError;

// The remote model behind a capability trait; handlers depend only on this.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    async fn classify(&self, prompt: &ScenePrompt) -> Result<String, VisionError>;
}
