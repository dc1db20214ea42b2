use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::{
    assets::{
        decode::encode_image,
        source::{SourceRoot, normalize_rel_path},
    },
    cache::{
        key::settings_tag,
        store::{CacheEntry, CacheStatus, CacheStore},
    },
    config::ServerConfig,
    foundation::{core::OutputFormat, error::ChainResult},
    ops::registry::Registry,
    pipeline::executor::Pipeline,
};

/// Request counters. Updated lock-free from worker threads.
#[derive(Debug, Default)]
pub struct ServiceStats {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    pipeline_runs: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`ServiceStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatsSnapshot {
    /// Requests handled, successful or not.
    pub requests: u64,
    /// Requests answered from an existing cache entry.
    pub cache_hits: u64,
    /// Requests that computed and stored a new entry.
    pub cache_misses: u64,
    /// Times the operation pipeline actually ran (including runs that later failed).
    pub pipeline_runs: u64,
    /// Requests that ended in an error.
    pub failures: u64,
}

impl ServiceStats {
    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            pipeline_runs: self.pipeline_runs.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Transport-agnostic request handler: source lookup, cache protocol, pipeline, encoding.
///
/// `handle` is synchronous and CPU bound; callers on an async runtime should run it on a worker
/// pool. The only shared mutable state is the cache directory and the counters.
#[derive(Debug)]
pub struct ImageService {
    sources: SourceRoot,
    cache: CacheStore,
    pipeline: Pipeline,
    jpeg_quality: u8,
    stats: ServiceStats,
}

impl ImageService {
    /// Assemble a service from its parts. The cache is re-tagged with this service's output
    /// settings, so services that would produce different bytes never share entries.
    pub fn new(
        sources: SourceRoot,
        cache: CacheStore,
        pipeline: Pipeline,
        jpeg_quality: u8,
    ) -> Self {
        let tag = settings_tag(cache.format(), jpeg_quality, pipeline.unknown_ops());
        Self {
            sources,
            cache: cache.with_settings(tag),
            pipeline,
            jpeg_quality,
            stats: ServiceStats::default(),
        }
    }

    /// Build a service from validated configuration, creating the cache directory.
    pub fn from_config(config: &ServerConfig) -> ChainResult<Self> {
        config.validate()?;
        let cache = CacheStore::open(&config.cache_dir, config.format)?;
        Ok(Self::new(
            SourceRoot::new(&config.images_dir),
            cache,
            Pipeline::new(Registry::builtin(), config.unknown_ops),
            config.jpeg_quality,
        ))
    }

    /// Encoding of every response body.
    pub fn format(&self) -> OutputFormat {
        self.cache.format()
    }

    /// `Content-Type` of every response body.
    pub fn content_type(&self) -> &'static str {
        self.cache.format().content_type()
    }

    /// Cache backing this service.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Live counters.
    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    /// Return the cache entry for `filename` transformed by `chain`, computing it on a miss.
    ///
    /// On a miss the source is opened before the chain is looked at, so a missing source is
    /// reported as not found whatever the chain says. A hit never touches the source.
    #[tracing::instrument(skip(self), fields(status = tracing::field::Empty))]
    pub fn handle(&self, filename: &str, chain: &str) -> ChainResult<CacheEntry> {
        ServiceStats::bump(&self.stats.requests);
        let res = self.handle_inner(filename, chain);
        match &res {
            Ok(entry) => {
                tracing::Span::current().record("status", entry.status.as_str());
                match entry.status {
                    CacheStatus::Hit => ServiceStats::bump(&self.stats.cache_hits),
                    CacheStatus::Miss => ServiceStats::bump(&self.stats.cache_misses),
                }
            }
            Err(e) => {
                ServiceStats::bump(&self.stats.failures);
                tracing::debug!(error = %e, "request failed");
            }
        }
        res
    }

    fn handle_inner(&self, filename: &str, chain: &str) -> ChainResult<CacheEntry> {
        let filename = normalize_rel_path(filename)?;
        self.cache.lookup_or_compute(&filename, chain, || {
            let img = self.sources.open(&filename)?;
            ServiceStats::bump(&self.stats.pipeline_runs);
            let t0 = Instant::now();
            let out = self.pipeline.apply(img, chain)?;
            tracing::debug!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                width = out.width(),
                height = out.height(),
                "pipeline done"
            );
            encode_image(&out, self.cache.format(), self.jpeg_quality)
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
