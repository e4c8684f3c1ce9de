use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::endpoint::DispatchError;
use crate::expand::{ExpansionError, VariableExpander};
use crate::transport::{ErrorReporter, PreconnectHinter, Transport};

/// Records every URL handed to the transport.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send_request(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_owned());
    }
}

/// Records every preconnect hint.
#[derive(Default)]
pub struct RecordingPreconnect {
    hints: Mutex<Vec<String>>,
}

impl RecordingPreconnect {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn hints(&self) -> Vec<String> {
        self.hints.lock().unwrap().clone()
    }
}

impl PreconnectHinter for RecordingPreconnect {
    fn hint(&self, url: &str) {
        self.hints.lock().unwrap().push(url.to_owned());
    }
}

/// Expands `${name}` placeholders from a fixed map; unmapped text passes
/// through unchanged.
pub struct MapExpander {
    vars: Vec<(String, String)>,
}

impl MapExpander {
    pub fn new(vars: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self { vars: vec![] })
    }
}

#[async_trait]
impl VariableExpander for MapExpander {
    async fn expand(&self, template: &str) -> Result<String, ExpansionError> {
        let mut out = template.to_owned();
        for (name, value) in &self.vars {
            out = out.replace(&format!("${{{name}}}"), value);
        }
        Ok(out)
    }
}

/// Rejects every expansion.
pub struct FailingExpander;

#[async_trait]
impl VariableExpander for FailingExpander {
    async fn expand(&self, _template: &str) -> Result<String, ExpansionError> {
        Err(ExpansionError::new("expansion unavailable"))
    }
}

/// Collects reported dispatch errors as display strings.
#[derive(Default)]
pub struct RecordingReporter {
    errors: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &DispatchError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

/// Let spawned dispatch tasks run to completion on the paused runtime.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
