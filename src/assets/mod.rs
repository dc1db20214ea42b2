//! Source image access and encoding.

/// Decoding source bytes and encoding cache entries.
pub mod decode;
/// Image-root path validation and loading.
pub mod source;
