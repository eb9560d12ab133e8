//! The process-wide random engine.
//!
//! Every random `Quaternion` and `Transform` draws from this single stream. It starts seeded
//! with [`DEFAULT_SEED`], can be reseeded at any time with [`set_random_seed`], and hands out
//! values in strict call order. Access is serialised by a mutex; when several threads sample
//! concurrently the interleaving, and therefore which thread receives which values, is not
//! reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub const DEFAULT_SEED: u64 = 0;

static RANDOM_ENGINE: LazyLock<Mutex<StdRng>> =
    LazyLock::new(|| Mutex::new(StdRng::seed_from_u64(DEFAULT_SEED)));

fn engine() -> MutexGuard<'static, StdRng> {
    // The generator state stays valid even if a holder panicked mid-draw.
    RANDOM_ENGINE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Reseeds the shared engine; all later random sampling restarts from this seed.
pub fn set_random_seed(seed: u64) {
    debug!("Reseeding process-wide random engine with {}.", seed);
    *engine() = StdRng::seed_from_u64(seed);
}

/// Runs `f` with exclusive access to the shared engine.
///
/// Draws made inside one call are contiguous in the stream, even with other threads sampling.
pub fn with_random_engine<F, R>(f: F) -> R
where
    F: FnOnce(&mut StdRng) -> R,
{
    let mut guard = engine();
    f(&mut guard)
}
