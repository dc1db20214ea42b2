use std::{net::SocketAddr, path::PathBuf};

use crate::{
    assets::decode::DEFAULT_JPEG_QUALITY, foundation::core::OutputFormat,
    pipeline::executor::UnknownOps,
};

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Options controlling the HTTP image service.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub listen: SocketAddr,
    /// Root directory that request filenames resolve against.
    pub images_dir: PathBuf,
    /// Directory holding `<digest>.<ext>` entries. Created if missing.
    pub cache_dir: PathBuf,
    /// Encoding of cache entries and responses.
    pub format: OutputFormat,
    /// JPEG quality in `1..=100`; ignored for PNG.
    pub jpeg_quality: u8,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// What to do with operation names missing from the registry.
    pub unknown_ops: UnknownOps,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            images_dir: PathBuf::from("images"),
            cache_dir: PathBuf::from(".cache"),
            format: OutputFormat::Jpeg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            threads: None,
            unknown_ops: UnknownOps::Reject,
        }
    }
}

impl ServerConfig {
    /// Reject settings that would only fail later at request time.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=100).contains(&self.jpeg_quality),
            "jpeg quality must be in 1..=100, got {}",
            self.jpeg_quality
        );
        if let Some(n) = self.threads
            && n == 0
        {
            anyhow::bail!("'threads' must be >= 1 when set");
        }
        anyhow::ensure!(
            self.images_dir != self.cache_dir,
            "images dir and cache dir must differ ('{}')",
            self.images_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
