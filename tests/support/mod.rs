// Mocks shared by the integration tests. Compiled independently per test
// binary via `mod support;`, so some items may appear unused in one of them.
#![allow(unused)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use beacon_dispatch::{
    DispatchError, ErrorReporter, ExpansionError, PreconnectHinter, Transport, VariableExpander,
};

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

/// Leaves templates untouched; stands in for the host's macro expander.
pub struct PassthroughExpander;

#[async_trait]
impl VariableExpander for PassthroughExpander {
    async fn expand(&self, template: &str) -> Result<String, ExpansionError> {
        Ok(template.to_owned())
    }
}

pub struct NullPreconnect;

impl PreconnectHinter for NullPreconnect {
    fn hint(&self, _url: &str) {}
}

pub struct NullReporter;

impl ErrorReporter for NullReporter {
    fn report(&self, _error: &DispatchError) {}
}

/// Let spawned dispatch tasks run to completion on the paused runtime.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
