use async_trait::async_trait;

use crate::error::PipelineError;

/// Delivers a formatted alert to an externally registered target.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, target: &str, key: &str, message: &str) -> Result<(), PipelineError>;
}
