//! Client-side telemetry dispatch.
//!
//! Callers fire discrete events at a [`DispatchEndpoint`]; the endpoint
//! coalesces them into batches on a configurable interval schedule and
//! hands finished batches to an abstract [`Transport`]. Delivery is
//! fire-and-forget: once a batch is handed off, its outcome is not
//! tracked.

pub mod config;
pub mod endpoint;
pub mod expand;
pub mod params;
pub mod plugins;
pub mod queue;
pub mod schedule;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, EndpointConfig};
pub use endpoint::{DispatchEndpoint, DispatchError, TriggerEvent};
pub use expand::{ExpansionError, VariableExpander};
pub use plugins::{PluginError, PluginRegistry};
pub use queue::Segment;
pub use transport::{ErrorReporter, PreconnectHinter, Transport};
