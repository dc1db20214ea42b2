//! Content-addressed on-disk cache of transformed images.

/// Digest derivation.
pub mod key;
/// Read-or-compute-and-write protocol.
pub mod store;
