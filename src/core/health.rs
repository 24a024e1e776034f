//! # Health aggregation.
//!
//! [`HealthAggregator`] combines every registered health predicate with a logical
//! AND. Registering a worker adds its [`Worker::healthy`](crate::Worker::healthy)
//! as one predicate; callers may add their own.
//!
//! ## Rules
//! - Evaluated fresh on every call, no caching.
//! - Short-circuits on the first `false`.
//! - No predicates at all → healthy.
//! - A blocking predicate blocks the caller; keep predicates cheap.

use std::fmt;
use std::sync::Arc;

/// Zero-argument liveness/readiness predicate.
pub type HealthCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// Logical AND over a set of health predicates.
#[derive(Default, Clone)]
pub struct HealthAggregator {
    checks: Vec<HealthCheck>,
}

impl HealthAggregator {
    /// Creates an aggregator without predicates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate.
    pub fn push(&mut self, check: HealthCheck) {
        self.checks.push(check);
    }

    /// True iff every predicate currently returns `true`.
    pub fn healthy(&self) -> bool {
        self.checks.iter().all(|check| check())
    }

    /// Number of registered predicates.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthAggregator")
            .field("checks", &self.checks.len())
            .finish()
    }
}
