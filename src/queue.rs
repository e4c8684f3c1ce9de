/// Trigger name recorded when the caller does not provide one.
pub const DEFAULT_TRIGGER: &str = "unknown";

/// One queued event awaiting inclusion in the next flushed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub trigger: String,
    /// Elapsed milliseconds since the owning endpoint was constructed.
    pub timestamp_ms: u64,
    /// Ordered key/value pairs. Duplicate keys are legal and preserved.
    pub params: Vec<(String, String)>,
}

/// Ordered pending segments accumulated between flushes. A flush always
/// consumes the whole queue via [`BatchQueue::take`].
#[derive(Debug, Default)]
pub struct BatchQueue {
    segments: Vec<Segment>,
}

impl BatchQueue {
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Take all pending segments, leaving the queue empty.
    pub fn take(&mut self) -> Vec<Segment> {
        std::mem::take(&mut self.segments)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}
