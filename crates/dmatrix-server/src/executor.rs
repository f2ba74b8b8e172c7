//! Bounded asynchronous execution of accepted computations.
//!
//! Admission control caps how many jobs may be queued or running at
//! once; a semaphore caps how many path-engine invocations run
//! concurrently. The HTTP caller never awaits a job; completion is
//! observable only through the store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use dmatrix_core::{ComputationRequest, PathEngine};

use crate::store::JobStore;

pub struct Executor {
    permits: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
    max_queued: usize,
}

/// Admission ticket for one job. Releases its slot when dropped, whether
/// the job ran or the submission was answered from the cache.
pub struct JobSlot {
    queued: Arc<AtomicUsize>,
}

impl Drop for JobSlot {
    fn drop(&mut self) {
        self.queued.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Executor {
    pub fn new(max_concurrent: usize, max_queued: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            queued: Arc::new(AtomicUsize::new(0)),
            max_queued,
        }
    }

    /// Reserve capacity for one job. `None` means the queue is full and
    /// the submission must be rejected before any record is created.
    pub fn try_reserve(&self) -> Option<JobSlot> {
        let mut current = self.queued.load(Ordering::Relaxed);
        loop {
            if current >= self.max_queued {
                return None;
            }
            match self.queued.compare_exchange(
                current,
                current + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    return Some(JobSlot {
                        queued: Arc::clone(&self.queued),
                    })
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Run the computation for `id` outside the request cycle. Invoked
    /// exactly once per fingerprint by the submitting path; the request
    /// parameters are handed over here rather than re-fetched from the
    /// store. The slot is held until the terminal state is written.
    pub fn spawn(
        &self,
        slot: JobSlot,
        store: Arc<JobStore>,
        engine: Arc<dyn PathEngine>,
        id: String,
        request: ComputationRequest,
    ) {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let _slot = slot;
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    store.fail(&id, "executor shut down".to_string());
                    return;
                }
            };

            let started = Instant::now();
            match engine
                .travel_time_matrix(&request.matrix, &request.country, request.speed_profile)
                .await
            {
                Ok(result) => match serde_json::to_string(&result) {
                    Ok(payload) => {
                        store.complete(&id, payload);
                        tracing::info!(
                            job = %id,
                            points = request.matrix.len(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "computation complete"
                        );
                    }
                    Err(err) => {
                        store.fail(&id, format!("result serialization failed: {err}"));
                        tracing::error!(job = %id, %err, "result serialization failed");
                    }
                },
                Err(err) => {
                    store.fail(&id, err.to_string());
                    tracing::error!(job = %id, %err, "computation failed");
                }
            }
        });
    }

    /// Jobs currently queued or running.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn max_queued(&self) -> usize {
        self.max_queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dmatrix_core::{
        Coord, CoordinatePath, EngineError, GreatCircleEngine, JobState, Location, NetworkNode,
        PathsInput,
    };
    use std::time::Duration;

    fn sample_request() -> ComputationRequest {
        ComputationRequest {
            matrix: vec![Coord(60.1, 24.9), Coord(60.2, 25.0)],
            country: "FI".to_string(),
            speed_profile: 80,
        }
    }

    async fn wait_for_terminal(store: &JobStore, id: &str) -> JobState {
        for _ in 0..200 {
            if let Some(status) = store.status(id) {
                if status.state != JobState::Pending {
                    return status.state;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {id} never reached a terminal state");
    }

    #[test]
    fn reservation_honors_the_queue_bound() {
        let executor = Executor::new(4, 2);
        let first = executor.try_reserve().unwrap();
        let _second = executor.try_reserve().unwrap();
        assert!(executor.try_reserve().is_none());

        drop(first);
        assert!(executor.try_reserve().is_some());
    }

    #[tokio::test]
    async fn spawn_writes_the_result_through_the_store() {
        let executor = Executor::new(2, 8);
        let store = Arc::new(JobStore::new(Duration::from_secs(60)));
        let engine: Arc<dyn PathEngine> = Arc::new(GreatCircleEngine);

        store.create_pending("job");
        let slot = executor.try_reserve().unwrap();
        executor.spawn(
            slot,
            Arc::clone(&store),
            engine,
            "job".to_string(),
            sample_request(),
        );

        assert_eq!(wait_for_terminal(&store, "job").await, JobState::Complete);
        let payload = store.resolve("job").unwrap();
        let matrix: Vec<Vec<f64>> = serde_json::from_str(&payload).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(executor.queued(), 0);
    }

    /// Engine that records how many invocations overlap.
    struct OverlapProbe {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl OverlapProbe {
        fn new() -> Self {
            Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PathEngine for OverlapProbe {
        async fn travel_time_matrix(
            &self,
            _matrix: &[Coord],
            _country: &str,
            _speed_profile: u32,
        ) -> Result<Vec<Vec<f64>>, EngineError> {
            let running = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![vec![0.0]])
        }

        async fn correct_point(
            &self,
            _coord: Coord,
            _country: &str,
        ) -> Result<NetworkNode, EngineError> {
            Err(EngineError::Internal("not scripted".to_string()))
        }

        async fn node_coordinates(
            &self,
            _country: &str,
            _nodes: &[i64],
        ) -> Result<Vec<Coord>, EngineError> {
            Err(EngineError::Internal("not scripted".to_string()))
        }

        async fn coordinate_paths(
            &self,
            _input: &PathsInput,
        ) -> Result<Vec<CoordinatePath>, EngineError> {
            Err(EngineError::Internal("not scripted".to_string()))
        }

        async fn resolve_location(&self, _location: &Location) -> Result<Location, EngineError> {
            Err(EngineError::Internal("not scripted".to_string()))
        }
    }

    #[tokio::test]
    async fn engine_invocations_respect_the_concurrency_cap() {
        let executor = Executor::new(1, 8);
        let store = Arc::new(JobStore::new(Duration::from_secs(60)));
        let probe = Arc::new(OverlapProbe::new());

        for i in 0..4 {
            let id = format!("job-{i}");
            store.create_pending(&id);
            let slot = executor.try_reserve().unwrap();
            let mut request = sample_request();
            request.speed_profile = 40 + 20 * (i % 3) as u32;
            executor.spawn(
                slot,
                Arc::clone(&store),
                Arc::clone(&probe) as Arc<dyn PathEngine>,
                id,
                request,
            );
        }

        for i in 0..4 {
            let id = format!("job-{i}");
            assert_eq!(wait_for_terminal(&store, &id).await, JobState::Complete);
        }
        assert_eq!(probe.peak.load(Ordering::SeqCst), 1, "cap of 1 was exceeded");
    }
}
