use std::sync::OnceLock;

use crate::foundation::error::{ScrubError, ScrubResult};

static SHARED_DECODE_POOL: OnceLock<rayon::ThreadPool> = OnceLock::new();

/// Process-wide decode pool, built on first use.
///
/// Sections that do not ask for a dedicated pool share this one, so the thread start-up cost is
/// paid once and only when the first sequence is actually preloaded.
pub fn shared_decode_pool() -> ScrubResult<&'static rayon::ThreadPool> {
    if let Some(pool) = SHARED_DECODE_POOL.get() {
        return Ok(pool);
    }
    let pool = build_thread_pool(None)?;
    // A racing initializer may win; its pool is kept and ours is dropped.
    Ok(SHARED_DECODE_POOL.get_or_init(|| pool))
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> ScrubResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ScrubError::validation("preload 'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("scrubreel-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ScrubError::lifecycle(format!("failed to build rayon thread pool: {e}")))
}
