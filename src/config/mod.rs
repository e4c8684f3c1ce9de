use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid batchInterval value: {0}")]
    InvalidBatchInterval(String),

    #[error("invalid reportWindow value: {0}")]
    InvalidReportWindow(String),

    #[error("batchPlugin cannot be set on non-batched request")]
    PluginWithoutBatching,

    #[error("unsupported batch plugin: {0}")]
    UnsupportedPlugin(String),
}

/// Static configuration for one dispatch endpoint, validated eagerly at
/// endpoint construction.
///
/// `batch_interval` and `report_window` stay loosely typed
/// ([`serde_json::Value`]) because the surrounding system delivers them
/// as untyped JSON: a number, an array of numbers, or a numeric string
/// are all accepted and coerced during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointConfig {
    /// Base destination template. May contain macro placeholders,
    /// including `${extraUrlParams}`.
    pub base_url: String,
    /// Batching interval(s) in seconds. Absent means unbatched: every
    /// send flushes immediately.
    pub batch_interval: Option<Value>,
    /// Hard cutoff in seconds after which the endpoint stops producing
    /// any network activity.
    pub report_window: Option<Value>,
    /// Name of a registered batch plugin. Only legal when batching.
    pub batch_plugin: Option<String>,
    /// Ordered endpoint-level parameters applied to every segment.
    pub extra_url_params: Vec<(String, String)>,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn batch_interval(mut self, spec: impl Into<Value>) -> Self {
        self.batch_interval = Some(spec.into());
        self
    }

    pub fn report_window(mut self, window: impl Into<Value>) -> Self {
        self.report_window = Some(window.into());
        self
    }

    pub fn batch_plugin(mut self, name: impl Into<String>) -> Self {
        self.batch_plugin = Some(name.into());
        self
    }

    pub fn extra_url_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_url_params.push((key.into(), value.into()));
        self
    }
}

/// Coerce a loosely-typed config value to a finite number. Numeric
/// strings count, mirroring the JSON-config origin of these fields.
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Validate a raw `reportWindow` value (seconds, must be positive).
pub(crate) fn parse_report_window(value: &Value) -> Result<Duration, ConfigError> {
    let seconds = coerce_number(value)
        .filter(|v| *v > 0.0)
        .ok_or_else(|| ConfigError::InvalidReportWindow(value.to_string()))?;
    // Rejects values too large to represent as a Duration.
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| ConfigError::InvalidReportWindow(value.to_string()))
}
