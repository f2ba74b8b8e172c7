//! Job/result store: fingerprint-keyed computation records with TTL and
//! single-level alias forwarding.
//!
//! All mutation is expressed as atomic single-record operations on a
//! `DashMap`; the conditional create in [`JobStore::create_pending`] is
//! the point that keeps concurrent submissions of the same fingerprint
//! from launching duplicate executions.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use dmatrix_core::JobState;

/// Result payload holder. `Aliased` forwards reads to the canonical
/// record; chains deeper than one are refused at construction.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Direct(String),
    Aliased(String),
}

#[derive(Debug, Clone)]
struct ComputationRecord {
    state: JobState,
    outcome: Option<JobOutcome>,
    error: Option<String>,
    expires_at: Instant,
}

impl ComputationRecord {
    fn pending(expires_at: Instant) -> Self {
        Self {
            state: JobState::Pending,
            outcome: None,
            error: None,
            expires_at,
        }
    }

    fn alias(canonical: String, expires_at: Instant) -> Self {
        Self {
            state: JobState::Complete,
            outcome: Some(JobOutcome::Aliased(canonical)),
            error: None,
            expires_at,
        }
    }
}

/// Outcome of the atomic conditional create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record was created; the caller owns launching the execution.
    Created,
    /// A live record already exists; its eventual outcome applies.
    Exists,
}

/// Expiry-aware view of a record's state.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub state: JobState,
    pub error: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum FetchError {
    #[error("computation is not ready yet")]
    NotReady,
    #[error("result expired or never existed")]
    Expired,
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum AliasError {
    #[error("canonical record \"{0}\" does not exist")]
    MissingCanonical(String),
    #[error("canonical record \"{0}\" is not a completed direct result")]
    NotCanonical(String),
    #[error("a record for \"{0}\" already exists")]
    RecordExists(String),
}

pub struct JobStore {
    records: DashMap<String, ComputationRecord>,
    ttl: Duration,
}

impl JobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: DashMap::new(),
            ttl,
        }
    }

    /// Atomically create a pending record for `id` unless a live one
    /// already exists. An expired occupant is replaced inside the same
    /// entry guard, so two concurrent submissions can never both observe
    /// "does not exist".
    pub fn create_pending(&self, id: &str) -> CreateOutcome {
        let now = Instant::now();
        match self.records.entry(id.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().expires_at <= now => {
                occupied.insert(ComputationRecord::pending(now + self.ttl));
                CreateOutcome::Created
            }
            Entry::Occupied(_) => CreateOutcome::Exists,
            Entry::Vacant(vacant) => {
                vacant.insert(ComputationRecord::pending(now + self.ttl));
                CreateOutcome::Created
            }
        }
    }

    /// Create a record for `id` directly in `complete`, forwarding reads
    /// to `canonical`. Refused when `canonical` is not a live, completed,
    /// direct result (keeping alias chains at depth one) or when a live
    /// record for `id` already exists.
    pub fn create_alias(&self, id: &str, canonical: &str) -> Result<(), AliasError> {
        let now = Instant::now();
        {
            let target = self
                .records
                .get(canonical)
                .ok_or_else(|| AliasError::MissingCanonical(canonical.to_string()))?;
            if target.expires_at <= now {
                return Err(AliasError::MissingCanonical(canonical.to_string()));
            }
            if !matches!(
                (&target.state, &target.outcome),
                (JobState::Complete, Some(JobOutcome::Direct(_)))
            ) {
                return Err(AliasError::NotCanonical(canonical.to_string()));
            }
        }
        match self.records.entry(id.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().expires_at <= now => {
                occupied.insert(ComputationRecord::alias(canonical.to_string(), now + self.ttl));
                Ok(())
            }
            Entry::Occupied(_) => Err(AliasError::RecordExists(id.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(ComputationRecord::alias(canonical.to_string(), now + self.ttl));
                Ok(())
            }
        }
    }

    /// Transition a pending record into `complete` with its payload.
    /// Returns false if the record is unknown, expired or already
    /// terminal; terminal states are never overwritten.
    pub fn complete(&self, id: &str, payload: String) -> bool {
        self.finish(id, JobState::Complete, Some(JobOutcome::Direct(payload)), None)
    }

    /// Transition a pending record into `failed` with the cause.
    pub fn fail(&self, id: &str, error: String) -> bool {
        self.finish(id, JobState::Failed, None, Some(error))
    }

    fn finish(
        &self,
        id: &str,
        state: JobState,
        outcome: Option<JobOutcome>,
        error: Option<String>,
    ) -> bool {
        let now = Instant::now();
        match self.records.get_mut(id) {
            Some(mut record) if record.state == JobState::Pending && record.expires_at > now => {
                record.state = state;
                record.outcome = outcome;
                record.error = error;
                // terminal write re-arms the retention window
                record.expires_at = now + self.ttl;
                true
            }
            Some(_) => {
                tracing::warn!(job = id, ?state, "ignoring transition on non-pending record");
                false
            }
            None => {
                tracing::warn!(job = id, ?state, "ignoring transition on unknown record");
                false
            }
        }
    }

    /// Expiry-aware state read. Expired records report as absent.
    pub fn status(&self, id: &str) -> Option<JobStatus> {
        let record = self.records.get(id)?;
        if record.expires_at <= Instant::now() {
            return None;
        }
        Some(JobStatus {
            state: record.state,
            error: record.error.clone(),
        })
    }

    /// Resolve a result, following an alias exactly one hop. Read-only.
    pub fn resolve(&self, id: &str) -> Result<String, FetchError> {
        let now = Instant::now();
        let outcome = {
            let record = self.records.get(id).ok_or(FetchError::Expired)?;
            if record.expires_at <= now {
                return Err(FetchError::Expired);
            }
            match record.state {
                JobState::Pending => return Err(FetchError::NotReady),
                JobState::Failed => {
                    let cause = record
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown failure".to_string());
                    return Err(FetchError::Failed(cause));
                }
                JobState::Complete => record.outcome.clone(),
            }
        };
        match outcome {
            Some(JobOutcome::Direct(payload)) => Ok(payload),
            Some(JobOutcome::Aliased(canonical)) => {
                let target = self.records.get(&canonical).ok_or(FetchError::Expired)?;
                if target.expires_at <= now {
                    return Err(FetchError::Expired);
                }
                match (&target.state, &target.outcome) {
                    (JobState::Complete, Some(JobOutcome::Direct(payload))) => Ok(payload.clone()),
                    _ => Err(FetchError::Expired),
                }
            }
            // complete records always carry an outcome through this API
            None => Err(FetchError::Expired),
        }
    }

    /// Drop expired records. Reads already treat them as absent; this
    /// reclaims their memory.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.records.len();
        self.records.retain(|_, record| record.expires_at > now);
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
