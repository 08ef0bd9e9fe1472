use crate::foundation::core::{FrameCount, FrameIndex};
use crate::foundation::error::{ScrubError, ScrubResult};

/// Predictable asset name for each frame of a sequence.
///
/// A template is a relative path with exactly one placeholder: `{}` for the bare sequence number
/// or `{:0N}` for a number zero-padded to `N` digits, e.g. `frames/frame_{:04}.jpg`. Sequence
/// numbers start at `first_number`, so with the default of 1 index 0 names `frame_0001.jpg`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePathTemplate {
    prefix: String,
    suffix: String,
    pad_width: usize,
    first_number: u32,
}

impl FramePathTemplate {
    /// Parse `pattern`, normalizing the path part.
    pub fn parse(pattern: &str, first_number: u32) -> ScrubResult<Self> {
        let Some(open) = pattern.find('{') else {
            return Err(ScrubError::validation(format!(
                "frame template '{pattern}' has no '{{}}' placeholder"
            )));
        };
        let Some(close_rel) = pattern[open..].find('}') else {
            return Err(ScrubError::validation(format!(
                "frame template '{pattern}' has an unclosed placeholder"
            )));
        };
        let close = open + close_rel;
        let placeholder = &pattern[open + 1..close];
        let prefix = &pattern[..open];
        let suffix = &pattern[close + 1..];

        if suffix.contains('{') || suffix.contains('}') || prefix.contains('}') {
            return Err(ScrubError::validation(format!(
                "frame template '{pattern}' must contain exactly one placeholder"
            )));
        }

        let pad_width = parse_pad_width(placeholder).ok_or_else(|| {
            ScrubError::validation(format!(
                "frame template placeholder '{{{placeholder}}}' must be '{{}}' or '{{:0N}}'"
            ))
        })?;

        // Validate the shape of a rendered name once, so every index yields a usable path.
        let first_path = format!("{prefix}{first_number}{suffix}");
        normalize_rel_path(&first_path)?;

        Ok(Self {
            prefix: prefix.replace('\\', "/"),
            suffix: suffix.to_string(),
            pad_width,
            first_number,
        })
    }

    /// Sequence number written into the name for `index`.
    pub fn number_for(&self, index: FrameIndex) -> u64 {
        u64::from(self.first_number) + u64::from(index.0)
    }

    /// Normalized relative path of frame `index`.
    pub fn path_for(&self, index: FrameIndex) -> String {
        let n = self.number_for(index);
        let raw = format!(
            "{}{:0width$}{}",
            self.prefix,
            n,
            self.suffix,
            width = self.pad_width
        );
        // `parse` already proved the shape is valid; only the digits differ between indices.
        normalize_rel_path(&raw).unwrap_or(raw)
    }

    /// All paths of a sequence of `count` frames, in index order.
    pub fn paths(&self, count: FrameCount) -> Vec<String> {
        count.indices().map(|i| self.path_for(i)).collect()
    }
}

fn parse_pad_width(placeholder: &str) -> Option<usize> {
    if placeholder.is_empty() {
        return Some(0);
    }
    let digits = placeholder.strip_prefix(":0")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let w: usize = digits.parse().ok()?;
    (w <= 12).then_some(w)
}

/// Normalize and validate a relative asset path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> ScrubResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ScrubError::validation("frame paths must be relative"));
    }
    if s.is_empty() {
        return Err(ScrubError::validation("frame path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ScrubError::validation("frame paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ScrubError::validation("frame path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/template.rs"]
mod tests;
