use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::params;
use crate::queue::Segment;

#[derive(Debug, Error)]
#[error("batch plugin failed: {message}")]
pub struct PluginError {
    message: String,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A named pure function turning a base URL plus the queued segments
/// into the final payload. Segment values arrive decoded: expanded but
/// not percent-encoded.
pub type BatchPluginFn = Arc<dyn Fn(&str, &[Segment]) -> Result<String, PluginError> + Send + Sync>;

/// Closed name-to-function registry. Hosts compose registries at startup
/// and hand them to endpoint construction; endpoint configuration can
/// only resolve names, never register new ones.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, BatchPluginFn>,
}

impl PluginRegistry {
    /// Registry carrying the built-in plugins.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register("_ping_", ping);
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        plugin: impl Fn(&str, &[Segment]) -> Result<String, PluginError> + Send + Sync + 'static,
    ) {
        self.plugins.insert(name.into(), Arc::new(plugin));
    }

    pub fn resolve(&self, name: &str) -> Option<BatchPluginFn> {
        self.plugins.get(name).cloned()
    }
}

/// `_ping_`: serialize the segments with the default parameter merger
/// against the base URL.
fn ping(base_url: &str, segments: &[Segment]) -> Result<String, PluginError> {
    let pairs = params::merge_segments(segments);
    Ok(params::attach(base_url, &params::serialize(&pairs)))
}
