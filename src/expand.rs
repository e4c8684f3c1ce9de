use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("variable expansion failed: {message}")]
pub struct ExpansionError {
    message: String,
}

impl ExpansionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// External collaborator that resolves macro placeholders inside URL
/// templates. The engine calls it once per parameter value and once for
/// the final assembled template; a failure abandons that flush without
/// tearing down the endpoint.
#[async_trait]
pub trait VariableExpander: Send + Sync {
    async fn expand(&self, template: &str) -> Result<String, ExpansionError>;
}
