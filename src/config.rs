use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::animation::tracks::{AuxTimeline, AuxTrack};
use crate::assets::preload::PreloadOpts;
use crate::assets::template::FramePathTemplate;
use crate::foundation::core::{Canvas, FrameCount, Viewport};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::render::presenter::MissingFrame;
use crate::timeline::controller::{ControllerOpts, Scrub};
use crate::timeline::geometry::PinGeometry;

fn default_first_number() -> u32 {
    1
}

/// Frame asset naming.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FramesConfig {
    /// Relative path template with one `{}` or `{:0N}` placeholder.
    pub template: String,
    /// Number of frames `N`.
    pub count: u32,
    /// Sequence number of frame index 0.
    #[serde(default = "default_first_number")]
    pub first_number: u32,
}

/// Decode pool settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreloadConfig {
    /// Dedicated decode threads; absent uses the shared pool.
    #[serde(default)]
    pub threads: Option<usize>,
}

/// JSON description of one scroll-pinned frame-scrub section.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionConfig {
    /// Frame asset naming.
    pub frames: FramesConfig,
    /// Fixed canvas resolution.
    pub canvas: Canvas,
    /// Pin geometry.
    pub pin: PinGeometry,
    /// Scrub smoothing lag in seconds (0 = immediate).
    #[serde(default)]
    pub scrub: f64,
    /// Behaviour for frames that failed to load.
    #[serde(default)]
    pub missing_frame: MissingFrame,
    /// Decode pool settings.
    #[serde(default)]
    pub preload: PreloadConfig,
    /// Auxiliary element tracks sharing the section timeline.
    #[serde(default)]
    pub tracks: Vec<AuxTrack>,
}

impl SectionConfig {
    /// Parse a section from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrubResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ScrubError::serde(format!("parse section JSON: {e}")))
    }

    /// Parse a section from a JSON string.
    pub fn from_json_str(s: &str) -> ScrubResult<Self> {
        serde_json::from_str(s).map_err(|e| ScrubError::serde(format!("parse section JSON: {e}")))
    }

    /// Parse and validate a section from a JSON file on disk.
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> ScrubResult<Self> {
        let f = File::open(path).map_err(|e| {
            ScrubError::validation(format!("open section JSON '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field; the first problem found is reported.
    pub fn validate(&self) -> ScrubResult<()> {
        self.frame_count()?;
        self.template()?;
        self.canvas.validate()?;
        self.pin.validate()?;
        self.scrub()?;
        if let Some(0) = self.preload.threads {
            return Err(ScrubError::validation("preload 'threads' must be >= 1 when set"));
        }
        for t in &self.tracks {
            t.validate()?;
        }
        Ok(())
    }

    /// Validated frame count.
    pub fn frame_count(&self) -> ScrubResult<FrameCount> {
        FrameCount::new(self.frames.count)
    }

    /// Parsed frame path template.
    pub fn template(&self) -> ScrubResult<FramePathTemplate> {
        FramePathTemplate::parse(&self.frames.template, self.frames.first_number)
    }

    /// Validated scrub smoothing.
    pub fn scrub(&self) -> ScrubResult<Scrub> {
        Scrub::lagged(self.scrub)
    }

    /// Auxiliary timeline built from `tracks`.
    pub fn aux_timeline(&self) -> ScrubResult<AuxTimeline> {
        AuxTimeline::new(self.tracks.clone())
    }

    /// Preload options.
    pub fn preload_opts(&self) -> PreloadOpts {
        PreloadOpts {
            threads: self.preload.threads,
        }
    }

    /// Controller options for `viewport`.
    pub fn controller_opts(&self, viewport: Viewport) -> ScrubResult<ControllerOpts> {
        Ok(ControllerOpts {
            geometry: self.pin,
            viewport,
            scrub: self.scrub()?,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
