//! # Key Pool Manager
//!
//! Two bounded FIFO pools of pre-generated key pairs, one per family.
//!
//! - `borrow` pops the oldest pair. An empty pool is not an error: a fresh
//!   pair is generated on the caller's thread and handed out directly.
//! - `refill` tops each pool up to its target. Generation runs outside the
//!   queue lock; the lock is held only for `push_back` / `pop_front`.
//! - At most one refill pass runs at a time. A pass that finds another in
//!   progress returns immediately.

use parking_lot::Mutex;
use pqc_crypto::{AlgorithmFamily, KeyPair, PqcProvider};
use pqc_telemetry::PqcMetrics;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::config::PoolConfig;

/// One family's queue.
struct KeyPool {
    family: AlgorithmFamily,
    target: usize,
    queue: Mutex<VecDeque<KeyPair>>,
}

impl KeyPool {
    fn new(family: AlgorithmFamily, target: usize) -> Self {
        Self {
            family,
            target,
            queue: Mutex::new(VecDeque::with_capacity(target)),
        }
    }

    fn pop(&self) -> Option<KeyPair> {
        self.queue.lock().pop_front()
    }

    fn push(&self, pair: KeyPair) -> usize {
        let mut queue = self.queue.lock();
        queue.push_back(pair);
        queue.len()
    }

    fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

/// Snapshot of pool depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub kem_pool_size: usize,
    pub dsa_pool_size: usize,
}

/// What one refill pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefillReport {
    /// Pairs added to the KEM pool
    pub kem_generated: usize,
    /// Pairs added to the DSA pool
    pub dsa_generated: usize,
    /// Another pass was already running
    pub skipped: bool,
}

impl RefillReport {
    fn record(&mut self, family: AlgorithmFamily, generated: usize) {
        match family {
            AlgorithmFamily::KeyExchange => self.kem_generated = generated,
            AlgorithmFamily::Signature => self.dsa_generated = generated,
        }
    }
}

/// Owner of both key pools.
pub struct KeyPoolManager {
    provider: Arc<dyn PqcProvider>,
    kem: KeyPool,
    dsa: KeyPool,
    refill_guard: Mutex<()>,
    metrics: Arc<PqcMetrics>,
}

impl KeyPoolManager {
    /// Create empty pools. Call [`refill`](Self::refill) to prime them.
    pub fn new(provider: Arc<dyn PqcProvider>, config: &PoolConfig, metrics: Arc<PqcMetrics>) -> Self {
        Self {
            provider,
            kem: KeyPool::new(AlgorithmFamily::KeyExchange, config.kem_size),
            dsa: KeyPool::new(AlgorithmFamily::Signature, config.dsa_size),
            refill_guard: Mutex::new(()),
            metrics,
        }
    }

    fn pool(&self, family: AlgorithmFamily) -> &KeyPool {
        match family {
            AlgorithmFamily::KeyExchange => &self.kem,
            AlgorithmFamily::Signature => &self.dsa,
        }
    }

    /// Take ownership of a key pair for `family`.
    ///
    /// Never blocks on refill and never fails.
    pub fn borrow(&self, family: AlgorithmFamily) -> KeyPair {
        let pool = self.pool(family);
        if let Some(pair) = pool.pop() {
            self.metrics.set_pool_size(family.label(), pool.len());
            return pair;
        }

        warn!(
            family = family.label(),
            "Key pool exhausted, generating key pair synchronously"
        );
        self.metrics.record_pool_exhausted(family.label());
        self.provider.generate_key_pair(family)
    }

    /// Top every pool up to its target size.
    pub fn refill(&self) -> RefillReport {
        let Some(_guard) = self.refill_guard.try_lock() else {
            debug!("Refill already in progress, skipping");
            return RefillReport {
                skipped: true,
                ..RefillReport::default()
            };
        };

        let mut report = RefillReport::default();
        for family in AlgorithmFamily::ALL {
            let pool = self.pool(family);
            let mut generated = 0;
            let mut size = pool.len();

            while size < pool.target {
                let pair = self.provider.generate_key_pair(family);
                debug_assert_eq!(pair.family(), pool.family);
                size = pool.push(pair);
                generated += 1;
            }

            self.metrics.set_pool_size(family.label(), size);
            if generated > 0 {
                debug!(
                    family = family.label(),
                    generated,
                    size,
                    "Key pool refilled"
                );
            }
            report.record(family, generated);
        }
        report
    }

    /// Current depth of one pool.
    pub fn size(&self, family: AlgorithmFamily) -> usize {
        self.pool(family).len()
    }

    /// Read-only snapshot for observability.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            kem_pool_size: self.kem.len(),
            dsa_pool_size: self.dsa.len(),
        }
    }
}
