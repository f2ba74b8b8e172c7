//! Periodic TTL sweep over the job store.
//!
//! Reads already treat expired records as absent; this loop reclaims
//! their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::store::JobStore;

pub async fn run_expiry_loop(store: Arc<JobStore>, period: Duration) {
    let mut ticker = interval(period);

    loop {
        ticker.tick().await;

        let dropped = store.prune_expired();
        if dropped > 0 {
            tracing::debug!(
                dropped,
                remaining = store.len(),
                "pruned expired computation records"
            );
        }
    }
}
