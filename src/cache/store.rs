use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    assets::decode::DEFAULT_JPEG_QUALITY,
    cache::key::{CacheKey, settings_tag},
    foundation::{
        core::OutputFormat,
        error::{ChainError, ChainResult},
    },
    pipeline::executor::UnknownOps,
};

/// Whether a lookup was served from disk or computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Entry already existed; nothing was computed.
    Hit,
    /// Entry was computed and persisted by this call.
    Miss,
}

impl CacheStatus {
    /// Header-friendly label.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Result of [`CacheStore::lookup_or_compute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Digest this entry is stored under.
    pub key: CacheKey,
    /// Path of the complete, encoded file.
    pub path: PathBuf,
    /// Hit or miss.
    pub status: CacheStatus,
}

/// Flat, append-only directory of encoded images named `<digest>.<ext>`.
///
/// Entries are written to a temporary file in the same directory and renamed into place, so a
/// reader either sees no file or a complete one. Concurrent misses on the same key may both
/// compute; the last rename wins and both renames carry identical bytes. Entries are never
/// updated, expired or deleted here, and a hit does not re-check the source image.
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
    format: OutputFormat,
    settings: String,
}

impl CacheStore {
    /// Open (creating if needed) a cache directory. Keys carry the default settings tag for
    /// `format` until [`CacheStore::with_settings`] replaces it.
    pub fn open(dir: impl Into<PathBuf>, format: OutputFormat) -> ChainResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create cache dir '{}'", dir.display()))?;
        Ok(Self {
            dir,
            format,
            settings: settings_tag(format, DEFAULT_JPEG_QUALITY, UnknownOps::default()),
        })
    }

    /// Fold `settings` (see [`settings_tag`]) into every key this store derives.
    pub fn with_settings(mut self, settings: impl Into<String>) -> Self {
        self.settings = settings.into();
        self
    }

    /// Settings tag folded into keys.
    pub fn settings(&self) -> &str {
        &self.settings
    }

    /// Key of the entry for `(filename, chain)` under this store's settings.
    pub fn key_for(&self, filename: &str, chain: &str) -> CacheKey {
        CacheKey::derive(&self.settings, filename, chain)
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encoding of stored entries.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Deterministic location of `key`'s entry.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name(self.format))
    }

    /// Existing entry for `key`, if any.
    pub fn lookup(&self, key: &CacheKey) -> Option<PathBuf> {
        let path = self.path_for(key);
        path.is_file().then_some(path)
    }

    /// Return the entry for `(filename, chain)`, running `compute` to produce its encoded bytes
    /// only when it is absent. Errors from `compute` propagate unchanged and nothing is stored.
    pub fn lookup_or_compute<F>(
        &self,
        filename: &str,
        chain: &str,
        compute: F,
    ) -> ChainResult<CacheEntry>
    where
        F: FnOnce() -> ChainResult<Vec<u8>>,
    {
        let key = self.key_for(filename, chain);
        if let Some(path) = self.lookup(&key) {
            tracing::debug!(key = %key, "cache hit");
            return Ok(CacheEntry {
                key,
                path,
                status: CacheStatus::Hit,
            });
        }

        let bytes = compute()?;
        let path = self.path_for(&key);
        self.persist(&path, &bytes)?;
        tracing::debug!(key = %key, path = %path.display(), bytes = bytes.len(), "cache store");
        Ok(CacheEntry {
            key,
            path,
            status: CacheStatus::Miss,
        })
    }

    fn persist(&self, path: &Path, bytes: &[u8]) -> ChainResult<()> {
        let write_err = |e: &dyn std::fmt::Display| {
            ChainError::cache_write(format!("'{}': {e}", path.display()))
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp-")
            .tempfile_in(&self.dir)
            .map_err(|e| write_err(&e))?;
        tmp.write_all(bytes).map_err(|e| write_err(&e))?;
        tmp.as_file().sync_all().map_err(|e| write_err(&e))?;
        tmp.persist(path).map_err(|e| write_err(&e.error))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
