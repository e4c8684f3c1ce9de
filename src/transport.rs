use crate::endpoint::DispatchError;

/// Delivers a finished batch. Invoked once per flush; the outcome is
/// not consulted (fire-and-forget per batch).
pub trait Transport: Send + Sync {
    fn send_request(&self, url: &str);
}

/// Connection warm-up hint, called once per flush with the expanded URL
/// just before the transport send.
pub trait PreconnectHinter: Send + Sync {
    fn hint(&self, url: &str);
}

/// Non-fatal error channel. Receives plugin and expansion failures that
/// abandoned a flush but left the endpoint usable.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &DispatchError);
}
