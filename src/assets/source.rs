use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::{
    assets::decode::decode_image,
    foundation::error::{ChainError, ChainResult},
};

/// Read-only view of the image root directory.
#[derive(Clone, Debug)]
pub struct SourceRoot {
    root: PathBuf,
}

impl SourceRoot {
    /// Serve sources from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a request filename, rejecting traversal outside the root.
    pub fn resolve(&self, filename: &str) -> ChainResult<PathBuf> {
        let norm = normalize_rel_path(filename)?;
        Ok(self.root.join(Path::new(&norm)))
    }

    /// Read and decode `filename` into RGBA8.
    pub fn open(&self, filename: &str) -> ChainResult<RgbaImage> {
        let path = self.resolve(filename)?;
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound || path.is_dir() => {
                return Err(ChainError::source_not_found(filename));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read source '{}'", path.display()))
                    .into());
            }
        };
        decode_image(&bytes).map_err(|e| ChainError::source_decode(format!("{filename}: {e}")))
    }
}

/// Normalize and validate a root-relative filename.
///
/// The normalized result uses `/` separators, removes `.` and empty segments, and rejects absolute
/// paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> ChainResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || has_drive_prefix(&s) {
        return Err(ChainError::invalid_source_path("paths must be relative"));
    }
    if s.is_empty() {
        return Err(ChainError::invalid_source_path("path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ChainError::invalid_source_path("paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ChainError::invalid_source_path(
            "path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

fn has_drive_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
