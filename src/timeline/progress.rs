use crate::foundation::core::{FrameCount, FrameIndex};
use crate::foundation::math::clamp01;

/// Map scroll progress to the frame to show.
///
/// Progress is clamped into `[0, 1]` first (NaN counts as 0), then snapped to the nearest frame:
/// `round(progress * (N - 1))`. The result is monotonic non-decreasing in `progress`, always in
/// `[0, N - 1]`, and never blends between frames. Pure; safe to call on every tick.
pub fn index_for(progress: f64, count: FrameCount) -> FrameIndex {
    let p = clamp01(progress);
    let last = f64::from(count.last().0);
    let idx = (p * last).round();
    // `p * last` is within `[0, last]`, so the cast cannot truncate outside the range.
    FrameIndex((idx as u32).min(count.last().0))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/progress.rs"]
mod tests;
