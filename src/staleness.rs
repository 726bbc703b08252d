//! Lookup generation tracking.
//! Ensures a late-arriving translation cannot overwrite a newer hover's tooltip.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic generation counter for lookups. Each new lookup advances the
/// generation; results from earlier generations are stale.
///
/// In-flight lookups are never aborted. They run to completion and their
/// result is applied or discarded based on the guard they carry.
pub struct LookupGeneration {
    current: Arc<AtomicU64>,
}

impl LookupGeneration {
    pub fn new() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance the generation and return a guard for the new lookup.
    pub fn advance(&self) -> GenerationGuard {
        let issued = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        GenerationGuard {
            current: Arc::clone(&self.current),
            issued,
        }
    }

    /// Read the current generation.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

impl Default for LookupGeneration {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard a lookup task carries; checked before its result is applied.
/// Shares the live counter, so advancing the generation invalidates all
/// previously issued guards.
#[derive(Clone)]
pub struct GenerationGuard {
    current: Arc<AtomicU64>,
    issued: u64,
}

impl GenerationGuard {
    /// Returns true if no newer lookup has been issued since this guard.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.issued
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}
