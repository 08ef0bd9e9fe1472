use std::collections::BTreeMap;

use crate::animation::ease::Ease;
use crate::foundation::core::Vec2;
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::{clamp01, lerp};

/// Element property a track animates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuxProperty {
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Horizontal translation in pixels.
    TranslateX,
    /// Vertical translation in pixels.
    TranslateY,
    /// Gaussian blur radius in pixels.
    Blur,
}

fn full_window() -> [f64; 2] {
    [0.0, 1.0]
}

/// One tween of an element property, keyed to timeline progress.
///
/// The tween runs over `window` (a sub-range of progress); outside it the value holds at `from`
/// before and `to` after.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuxTrack {
    /// Host element identifier.
    pub target: String,
    /// Animated property.
    pub property: AuxProperty,
    /// Value at the start of the window.
    pub from: f64,
    /// Value at the end of the window.
    pub to: f64,
    /// Progress sub-range `[start, end]` within `[0, 1]`.
    #[serde(default = "full_window")]
    pub window: [f64; 2],
    /// Easing applied to local time.
    #[serde(default)]
    pub ease: Ease,
}

impl AuxTrack {
    /// Reject empty targets, non-finite values and malformed windows.
    pub fn validate(&self) -> ScrubResult<()> {
        if self.target.trim().is_empty() {
            return Err(ScrubError::validation("track target must be non-empty"));
        }
        if !self.from.is_finite() || !self.to.is_finite() {
            return Err(ScrubError::validation(format!(
                "track '{}' from/to must be finite",
                self.target
            )));
        }
        let [a, b] = self.window;
        if !(0.0..=1.0).contains(&a) || !(0.0..=1.0).contains(&b) || a > b {
            return Err(ScrubError::validation(format!(
                "track '{}' window must satisfy 0 <= start <= end <= 1",
                self.target
            )));
        }
        Ok(())
    }

    /// Value at timeline `progress`.
    pub fn value_at(&self, progress: f64) -> f64 {
        let p = clamp01(progress);
        let [a, b] = self.window;
        let local = if b <= a {
            if p < a { 0.0 } else { 1.0 }
        } else {
            clamp01((p - a) / (b - a))
        };
        lerp(self.from, self.to, self.ease.apply(local))
    }
}

/// Resolved style of one host element for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ElementStyle {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Translation in pixels.
    pub translate: Vec2,
    /// Blur radius in pixels.
    pub blur_px: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate: Vec2::ZERO,
            blur_px: 0.0,
        }
    }
}

impl ElementStyle {
    fn set(&mut self, property: AuxProperty, value: f64) {
        match property {
            AuxProperty::Opacity => self.opacity = value.clamp(0.0, 1.0),
            AuxProperty::TranslateX => self.translate.x = value,
            AuxProperty::TranslateY => self.translate.y = value,
            AuxProperty::Blur => self.blur_px = value.max(0.0),
        }
    }
}

/// Auxiliary animation state sampled from one progress value.
///
/// Derived data only: recomputed on every tick, keyed by target for stable iteration order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct AuxFrame {
    /// Progress the frame was sampled at.
    pub progress: f64,
    /// Style per target element.
    pub elements: BTreeMap<String, ElementStyle>,
}

impl AuxFrame {
    /// Style of `target`, if any track animates it.
    pub fn element(&self, target: &str) -> Option<&ElementStyle> {
        self.elements.get(target)
    }
}

#[derive(Clone, Debug)]
struct Channel {
    target: String,
    property: AuxProperty,
    // Sorted by window start; ties keep declaration order.
    tracks: Vec<AuxTrack>,
}

impl Channel {
    fn value_at(&self, progress: f64) -> f64 {
        let p = clamp01(progress);
        let active = self.tracks.iter().rev().find(|t| t.window[0] <= p);
        match active {
            Some(t) => t.value_at(p),
            // Before every window: hold the first tween's starting value.
            None => self.tracks[0].from,
        }
    }
}

/// Every auxiliary track of one pinned section.
///
/// Tracks on the same `(target, property)` form a sequence: the latest track whose window has
/// started owns the value. All channels are sampled from the same progress scalar, so text and
/// element motion stay in lockstep with the canvas.
#[derive(Clone, Debug, Default)]
pub struct AuxTimeline {
    channels: Vec<Channel>,
}

impl AuxTimeline {
    /// Group and validate `tracks`.
    pub fn new(tracks: Vec<AuxTrack>) -> ScrubResult<Self> {
        let mut by_key: BTreeMap<(String, AuxProperty), Vec<AuxTrack>> = BTreeMap::new();
        for t in tracks {
            t.validate()?;
            by_key
                .entry((t.target.clone(), t.property))
                .or_default()
                .push(t);
        }

        let channels = by_key
            .into_iter()
            .map(|((target, property), mut tracks)| {
                tracks.sort_by(|a, b| a.window[0].total_cmp(&b.window[0]));
                Channel {
                    target,
                    property,
                    tracks,
                }
            })
            .collect();
        Ok(Self { channels })
    }

    /// `true` when no tracks are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Sample every channel at `progress`.
    pub fn sample(&self, progress: f64) -> AuxFrame {
        let mut out = AuxFrame::default();
        self.sample_into(progress, &mut out);
        out
    }

    /// Sample into `out`, reusing its allocation.
    pub fn sample_into(&self, progress: f64, out: &mut AuxFrame) {
        out.progress = clamp01(progress);
        for style in out.elements.values_mut() {
            *style = ElementStyle::default();
        }
        for ch in &self.channels {
            let v = ch.value_at(progress);
            if let Some(style) = out.elements.get_mut(&ch.target) {
                style.set(ch.property, v);
            } else {
                let mut style = ElementStyle::default();
                style.set(ch.property, v);
                out.elements.insert(ch.target.clone(), style);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tracks.rs"]
mod tests;
