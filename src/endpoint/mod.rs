use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, warn};

use crate::config::{self, ConfigError, EndpointConfig};
use crate::expand::{ExpansionError, VariableExpander};
use crate::params;
use crate::plugins::{BatchPluginFn, PluginError, PluginRegistry};
use crate::queue::{BatchQueue, DEFAULT_TRIGGER, Segment};
use crate::schedule::IntervalSchedule;
use crate::transport::{ErrorReporter, PreconnectHinter, Transport};

/// Runtime flush failures. Recovered per batch: the flush is abandoned
/// (its queue was already cleared), the error goes to the
/// [`ErrorReporter`], and the endpoint keeps accepting events.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),
}

/// One `send` call: an optional trigger name, ordered call-level URL
/// parameters, and the immediate-flush override flag.
#[derive(Debug, Clone, Default)]
pub struct TriggerEvent {
    pub trigger: Option<String>,
    pub extra_url_params: Vec<(String, String)>,
    pub important: bool,
}

impl TriggerEvent {
    pub fn trigger(mut self, name: impl Into<String>) -> Self {
        self.trigger = Some(name.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_url_params.push((key.into(), value.into()));
        self
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

/// Mutable endpoint state behind a single mutex: the queue and the
/// periodic-timer handle live together so the window task can flush and
/// cancel under one lock. The lock is never held across an `.await`.
struct State {
    queue: BatchQueue,
    window_closed: bool,
    periodic: Option<JoinHandle<()>>,
}

struct Inner {
    base_url: String,
    extra_url_params: Vec<(String, String)>,
    plugin: Option<BatchPluginFn>,
    /// Construction time; segment timestamps are elapsed ms from here.
    epoch: Instant,
    transport: Arc<dyn Transport>,
    expander: Arc<dyn VariableExpander>,
    preconnect: Arc<dyn PreconnectHinter>,
    reporter: Arc<dyn ErrorReporter>,
    state: Mutex<State>,
}

/// One configured destination. Owns the batch queue, the interval timer,
/// and the report-window deadline, and drives flushes to the transport.
///
/// Must be constructed inside a tokio runtime: a batched endpoint starts
/// its interval timer at construction time, before any event is queued.
/// Dropping the endpoint cancels both timers and discards anything still
/// queued.
pub struct DispatchEndpoint {
    inner: Arc<Inner>,
    batched: bool,
    window: Option<JoinHandle<()>>,
}

impl DispatchEndpoint {
    pub fn new(
        config: EndpointConfig,
        registry: &PluginRegistry,
        transport: Arc<dyn Transport>,
        expander: Arc<dyn VariableExpander>,
        preconnect: Arc<dyn PreconnectHinter>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, ConfigError> {
        let schedule = config
            .batch_interval
            .as_ref()
            .map(IntervalSchedule::parse)
            .transpose()?;

        let plugin = match &config.batch_plugin {
            Some(name) => {
                if schedule.is_none() {
                    return Err(ConfigError::PluginWithoutBatching);
                }
                let plugin = registry
                    .resolve(name)
                    .ok_or_else(|| ConfigError::UnsupportedPlugin(name.clone()))?;
                Some(plugin)
            }
            None => None,
        };

        let window_deadline = config
            .report_window
            .as_ref()
            .map(config::parse_report_window)
            .transpose()?;

        let inner = Arc::new(Inner {
            base_url: config.base_url,
            extra_url_params: config.extra_url_params,
            plugin,
            epoch: Instant::now(),
            transport,
            expander,
            preconnect,
            reporter,
            state: Mutex::new(State {
                queue: BatchQueue::default(),
                window_closed: false,
                periodic: None,
            }),
        });

        let batched = schedule.is_some();
        if let Some(mut schedule) = schedule {
            // The deadline is anchored here, not at first poll, so the
            // timer runs from construction even if nothing is queued.
            let first = Instant::now() + schedule.advance();
            let handle = tokio::spawn(Inner::run_interval_timer(
                Arc::clone(&inner),
                schedule,
                first,
            ));
            inner.state.lock().unwrap().periodic = Some(handle);
        }

        let window = window_deadline.map(|after| {
            let deadline = Instant::now() + after;
            tokio::spawn(Inner::run_window_deadline(Arc::clone(&inner), deadline))
        });

        Ok(Self {
            inner,
            batched,
            window,
        })
    }

    /// Queue one event. Unbatched endpoints and `important` events flush
    /// in the same call; everything else waits for the next timer
    /// firing. Events arriving after the report window closed are
    /// dropped silently.
    pub fn send(&self, event: TriggerEvent) {
        let important = event.important;
        let trigger = event
            .trigger
            .unwrap_or_else(|| DEFAULT_TRIGGER.to_owned());

        let mut state = self.inner.state.lock().unwrap();
        if state.window_closed {
            warn!(trigger = %trigger, "report window closed, dropping event");
            return;
        }

        state.queue.push(Segment {
            trigger,
            timestamp_ms: self.inner.epoch.elapsed().as_millis() as u64,
            params: params::merge_params(&self.inner.extra_url_params, event.extra_url_params),
        });

        // An immediate flush bypasses the interval wait but leaves the
        // periodic timer untouched: its next firing stays on schedule.
        if !self.batched || important {
            let batch = state.queue.take();
            drop(state);
            self.inner.dispatch(batch);
        }
    }
}

// Manual impl: the collaborator fields are trait objects without Debug.
impl fmt::Debug for DispatchEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEndpoint")
            .field("base_url", &self.inner.base_url)
            .field("batched", &self.batched)
            .finish_non_exhaustive()
    }
}

impl Drop for DispatchEndpoint {
    // Teardown cancels the timers; queued-but-unflushed segments are
    // discarded, never force-flushed.
    fn drop(&mut self) {
        if let Some(handle) = self.window.take() {
            handle.abort();
        }
        if let Ok(mut state) = self.inner.state.lock()
            && let Some(handle) = state.periodic.take()
        {
            handle.abort();
        }
    }
}

impl Inner {
    async fn run_interval_timer(
        inner: Arc<Inner>,
        mut schedule: IntervalSchedule,
        mut deadline: Instant,
    ) {
        loop {
            time::sleep_until(deadline).await;
            let batch = {
                let mut state = inner.state.lock().unwrap();
                if state.window_closed {
                    break;
                }
                state.queue.take()
            };
            // An empty firing sends nothing, but the timer keeps running
            // until the report window closes.
            if !batch.is_empty() {
                inner.dispatch(batch);
            }
            deadline += schedule.advance();
        }
    }

    async fn run_window_deadline(inner: Arc<Inner>, deadline: Instant) {
        time::sleep_until(deadline).await;
        let (batch, periodic) = {
            let mut state = inner.state.lock().unwrap();
            state.window_closed = true;
            (state.queue.take(), state.periodic.take())
        };
        if let Some(handle) = periodic {
            handle.abort();
        }
        if !batch.is_empty() {
            inner.dispatch(batch);
        }
        debug!("report window closed");
    }

    /// The single flush primitive, shared by the timer firing, the
    /// `important` enqueue, and the window deadline. Fire-and-forget:
    /// the spawned task never blocks the caller and its completion
    /// order relative to later flushes is not guaranteed.
    fn dispatch(self: &Arc<Self>, batch: Vec<Segment>) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = inner.dispatch_batch(batch).await {
                error!(error = %e, "flush abandoned");
                inner.reporter.report(&e);
            }
        });
    }

    async fn dispatch_batch(&self, batch: Vec<Segment>) -> Result<(), DispatchError> {
        debug!(segments = batch.len(), "flushing batch");
        let batch = self.expand_params(batch).await?;

        let template = match &self.plugin {
            // Plugins get the decoded segments, never encoded values.
            Some(plugin) => plugin(&self.base_url, &batch)?,
            None => {
                let pairs = params::merge_segments(&batch);
                params::attach(&self.base_url, &params::serialize(&pairs))
            }
        };

        let url = self.expander.expand(&template).await?;
        self.preconnect.hint(&url);
        self.transport.send_request(&url);
        Ok(())
    }

    /// Expand each parameter value before it is encoded, so values
    /// produced by variable expansion are percent-encoded exactly once.
    async fn expand_params(&self, batch: Vec<Segment>) -> Result<Vec<Segment>, DispatchError> {
        let mut expanded = Vec::with_capacity(batch.len());
        for mut segment in batch {
            for (_, value) in &mut segment.params {
                let resolved = self.expander.expand(value).await?;
                *value = resolved;
            }
            expanded.push(segment);
        }
        Ok(expanded)
    }
}
