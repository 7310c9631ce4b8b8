//! Per-request context.

use common::CorrelationId;

/// Context carried explicitly through one booking operation.
///
/// Nothing about a request is kept in shared state between calls; whatever
/// the operation needs to log or notify travels with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
}

impl RequestContext {
    /// Creates a context with a fresh correlation ID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for an existing correlation ID.
    pub fn with_correlation_id(correlation_id: CorrelationId) -> Self {
        Self { correlation_id }
    }
}
