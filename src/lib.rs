//! imgchain is an HTTP image-transformation server.
//!
//! A request names a source image and a comma-separated chain of operations in its path:
//!
//! ```text
//! GET /images/fill=200x200@center,grayscale/photos/cat.jpg
//! ```
//!
//! # Request flow
//!
//! 1. **Resolve**: the filename is normalised and confined to the image root ([`SourceRoot`]).
//! 2. **Look up**: a digest of `(settings, filename, chain)` names the cache entry
//!    ([`CacheKey`], [`settings_tag`]). A hit is served as-is and nothing else runs.
//! 3. **Compile**: on a miss the source is decoded, then the chain is parsed and every step is
//!    resolved against the [`Registry`] before any pixel work ([`Pipeline::compile`]).
//! 4. **Run**: steps are applied strictly left to right ([`Pipeline::run`]).
//! 5. **Store**: the encoded result is written to a temp file and renamed into place
//!    ([`CacheStore`]), so concurrent readers never observe a partial entry.
//!
//! [`ImageService`] ties these together independently of HTTP; [`server`] adapts it to axum.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod service;

pub mod cache;
pub mod ops;
pub mod pipeline;
/// axum routes, status mapping and the worker-pool bridge.
pub mod server;

pub use assets::decode::{DEFAULT_JPEG_QUALITY, decode_image, encode_image};
pub use assets::source::{SourceRoot, normalize_rel_path};
pub use cache::key::{CacheKey, settings_tag};
pub use cache::store::{CacheEntry, CacheStatus, CacheStore};
pub use config::{DEFAULT_LISTEN, ServerConfig};
pub use foundation::core::{Anchor, Dimensions, OutputFormat};
pub use foundation::error::{ChainError, ChainResult, ErrorKind, ParamError};
pub use ops::registry::{OpSpec, ParamShape, Registry, Transform};
pub use pipeline::chain::{Operation, OperationChain};
pub use pipeline::executor::{CompiledChain, CompiledStep, Pipeline, UnknownOps};
pub use server::{AppState, router, serve, status_for};
pub use service::{ImageService, ServiceStats, StatsSnapshot};
