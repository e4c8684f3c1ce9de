use std::time::Duration;

use serde_json::Value;

use crate::config::{self, ConfigError};

/// Smallest allowed batching interval. Guards against configurations
/// that would produce a timer storm.
pub const MIN_INTERVAL: Duration = Duration::from_millis(200);

/// Normalized batching schedule: an ordered list of wait durations plus
/// a cursor that advances once per timer firing and saturates on the
/// last entry.
#[derive(Debug, Clone)]
pub struct IntervalSchedule {
    intervals: Vec<Duration>,
    cursor: usize,
}

impl IntervalSchedule {
    /// Parse a raw `batchInterval` config value: a single number of
    /// seconds, or an ordered non-empty array of them. Every entry must
    /// coerce to a number and sit at or above [`MIN_INTERVAL`].
    pub fn parse(spec: &Value) -> Result<Self, ConfigError> {
        let raw: Vec<&Value> = match spec {
            Value::Array(entries) => entries.iter().collect(),
            other => vec![other],
        };
        if raw.is_empty() {
            return Err(ConfigError::InvalidBatchInterval(spec.to_string()));
        }

        let mut intervals = Vec::with_capacity(raw.len());
        for entry in raw {
            let seconds = config::coerce_number(entry)
                .ok_or_else(|| ConfigError::InvalidBatchInterval(entry.to_string()))?;
            // Negative values fail this check too.
            if seconds * 1000.0 < MIN_INTERVAL.as_millis() as f64 {
                return Err(ConfigError::InvalidBatchInterval(entry.to_string()));
            }
            // Rejects values too large to represent as a Duration.
            let interval = Duration::try_from_secs_f64(seconds)
                .map_err(|_| ConfigError::InvalidBatchInterval(entry.to_string()))?;
            intervals.push(interval);
        }
        Ok(Self {
            intervals,
            cursor: 0,
        })
    }

    /// The wait before the next timer firing. Advances the cursor, which
    /// never decreases and never passes the last index: once the list is
    /// exhausted the final duration repeats indefinitely.
    pub fn advance(&mut self) -> Duration {
        let duration = self.intervals[self.cursor];
        if self.cursor + 1 < self.intervals.len() {
            self.cursor += 1;
        }
        duration
    }

    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
