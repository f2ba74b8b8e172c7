//! Deduplicating submission coordinator.
//!
//! Guarantees at most one execution per fingerprint: the store's atomic
//! conditional create decides, per id, whether a submission launches the
//! executor or reuses the record another submission created. An optional
//! equivalence policy can short-circuit execution entirely by recording
//! the new id as an alias of an already-canonical one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dmatrix_core::{fingerprint, ComputationRequest};

use crate::store::{CreateOutcome, JobStore};

/// Pluggable request-equivalence hook. A policy that recognizes a
/// request as equivalent to a different canonical id lets the
/// coordinator alias it instead of executing. The equivalence relation
/// is policy; the aliasing mechanism is fixed.
pub trait EquivalencePolicy: Send + Sync {
    /// The canonical id this request is equivalent to, if any.
    fn canonical_id(&self, request: &ComputationRequest) -> Option<String>;
}

/// Default policy: no two distinct fingerprints are equivalent.
#[derive(Debug, Default)]
pub struct NoEquivalence;

impl EquivalencePolicy for NoEquivalence {
    fn canonical_id(&self, _request: &ComputationRequest) -> Option<String> {
        None
    }
}

/// What [`DedupCoordinator::submit`] decided for one request.
#[derive(Debug)]
pub enum SubmitDecision {
    /// First sight of this fingerprint; the caller must trigger the
    /// executor exactly once.
    Launch { id: String },
    /// A record for this fingerprint already exists; its eventual
    /// outcome applies to this caller too.
    Reuse { id: String },
    /// The request was recognized as equivalent to `canonical` and
    /// recorded as an alias; no execution.
    Alias { id: String, canonical: String },
}

impl SubmitDecision {
    pub fn id(&self) -> &str {
        match self {
            SubmitDecision::Launch { id }
            | SubmitDecision::Reuse { id }
            | SubmitDecision::Alias { id, .. } => id,
        }
    }

    pub fn already_satisfied(&self) -> bool {
        !matches!(self, SubmitDecision::Launch { .. })
    }
}

/// Snapshot of how effective deduplication has been.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupSnapshot {
    pub submitted: u64,
    pub launched: u64,
    pub reused: u64,
    pub aliased: u64,
}

#[derive(Debug, Default)]
struct DedupStats {
    submitted: AtomicU64,
    launched: AtomicU64,
    reused: AtomicU64,
    aliased: AtomicU64,
}

pub struct DedupCoordinator {
    store: Arc<JobStore>,
    policy: Box<dyn EquivalencePolicy>,
    stats: DedupStats,
}

impl DedupCoordinator {
    pub fn new(store: Arc<JobStore>, policy: Box<dyn EquivalencePolicy>) -> Self {
        Self {
            store,
            policy,
            stats: DedupStats::default(),
        }
    }

    /// Decide what to do with one validated request. The check-and-create
    /// against the store is a single atomic operation, so of N concurrent
    /// submissions with the same fingerprint exactly one observes
    /// [`SubmitDecision::Launch`].
    pub fn submit(&self, request: &ComputationRequest) -> SubmitDecision {
        let id = fingerprint(&request.matrix, &request.country, request.speed_profile);
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);

        if let Some(canonical) = self.policy.canonical_id(request) {
            if canonical != id && self.store.create_alias(&id, &canonical).is_ok() {
                self.stats.aliased.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(job = %id, %canonical, "recorded alias for equivalent request");
                return SubmitDecision::Alias { id, canonical };
            }
        }

        match self.store.create_pending(&id) {
            CreateOutcome::Created => {
                self.stats.launched.fetch_add(1, Ordering::Relaxed);
                tracing::info!(job = %id, "accepted new computation");
                SubmitDecision::Launch { id }
            }
            CreateOutcome::Exists => {
                self.stats.reused.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(job = %id, "deduplicated submission");
                SubmitDecision::Reuse { id }
            }
        }
    }

    pub fn snapshot(&self) -> DedupSnapshot {
        DedupSnapshot {
            submitted: self.stats.submitted.load(Ordering::Relaxed),
            launched: self.stats.launched.load(Ordering::Relaxed),
            reused: self.stats.reused.load(Ordering::Relaxed),
            aliased: self.stats.aliased.load(Ordering::Relaxed),
        }
    }
}
