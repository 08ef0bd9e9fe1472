use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::assets::template::normalize_rel_path;
use crate::foundation::error::{ScrubError, ScrubResult};

/// Where encoded frame bytes come from.
///
/// Implementations are called concurrently from the preload pool, one call per frame. A failure is
/// reported per asset and never aborts the sequence.
pub trait FrameSource: Send + Sync {
    /// Fetch the encoded bytes of the frame at normalized relative `path`.
    fn fetch(&self, path: &str) -> ScrubResult<Vec<u8>>;
}

/// Frames read from files under a root directory.
#[derive(Clone, Debug)]
pub struct FsFrameSource {
    root: PathBuf,
}

impl FsFrameSource {
    /// Resolve frame paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used when resolving relative frame paths.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameSource for FsFrameSource {
    fn fetch(&self, path: &str) -> ScrubResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path)
            .with_context(|| format!("read frame bytes from '{}'", path.display()))
            .map_err(ScrubError::from)
    }
}

/// Frames held in memory, keyed by normalized relative path.
#[derive(Clone, Debug, Default)]
pub struct MemoryFrameSource {
    frames: HashMap<String, Vec<u8>>,
}

impl MemoryFrameSource {
    /// Empty source; every fetch fails until frames are inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `path`.
    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) -> ScrubResult<()> {
        let norm = normalize_rel_path(path)?;
        self.frames.insert(norm, bytes);
        Ok(())
    }

    /// Number of registered frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when no frames are registered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemoryFrameSource {
    fn fetch(&self, path: &str) -> ScrubResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        self.frames
            .get(&norm)
            .cloned()
            .ok_or_else(|| ScrubError::asset(format!("no in-memory frame at '{norm}'")))
    }
}

/// Frames fetched with HTTP GET from `base_url/<path>`.
///
/// Any non-2xx status is a per-asset failure, like a missing file.
#[cfg(feature = "http")]
pub struct HttpFrameSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFrameSource {
    /// Build a source rooted at `base_url` (trailing `/` optional).
    pub fn new(base_url: impl Into<String>) -> ScrubResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ScrubError::validation("http frame source needs a base url"));
        }
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self { base_url, client })
    }

    fn url_for(&self, norm: &str) -> String {
        format!("{}/{norm}", self.base_url)
    }
}

#[cfg(feature = "http")]
impl FrameSource for HttpFrameSource {
    fn fetch(&self, path: &str) -> ScrubResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        let url = self.url_for(&norm);
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET '{url}'"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrubError::asset(format!("GET '{url}' returned {status}")));
        }
        let bytes = resp
            .bytes()
            .with_context(|| format!("read body of '{url}'"))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
