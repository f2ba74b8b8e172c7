//! Shared application state, handed to every route.
//!
//! All collaborators are constructed here and passed down explicitly;
//! there is no package-level mutable state anywhere in the server.

use std::sync::Arc;

use dmatrix_core::{GreatCircleEngine, PathEngine};

use crate::config::Config;
use crate::dedup::{DedupCoordinator, EquivalencePolicy, NoEquivalence};
use crate::executor::Executor;
use crate::store::JobStore;

pub struct AppState {
    config: Config,
    store: Arc<JobStore>,
    engine: Arc<dyn PathEngine>,
    dedup: DedupCoordinator,
    executor: Executor,
}

impl AppState {
    /// State with the built-in great-circle engine.
    pub fn new(config: Config) -> Self {
        Self::with_engine(config, Arc::new(GreatCircleEngine))
    }

    /// State with an injected path engine.
    pub fn with_engine(config: Config, engine: Arc<dyn PathEngine>) -> Self {
        Self::with_engine_and_policy(config, engine, Box::new(NoEquivalence))
    }

    /// State with an injected engine and equivalence policy.
    pub fn with_engine_and_policy(
        config: Config,
        engine: Arc<dyn PathEngine>,
        policy: Box<dyn EquivalencePolicy>,
    ) -> Self {
        let store = Arc::new(JobStore::new(config.result_ttl));
        let executor = Executor::new(config.max_concurrent_jobs, config.max_queued_jobs);
        let dedup = DedupCoordinator::new(Arc::clone(&store), policy);
        Self {
            config,
            store,
            engine,
            dedup,
            executor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn engine(&self) -> &Arc<dyn PathEngine> {
        &self.engine
    }

    pub fn dedup(&self) -> &DedupCoordinator {
        &self.dedup
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}
