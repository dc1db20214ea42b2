use std::fmt;

use sha2::Digest as _;

use crate::{foundation::core::OutputFormat, pipeline::executor::UnknownOps};

// Bump when the key encoding changes so old entries are never misread.
const KEY_DOMAIN: &[u8] = b"imgchain/v2\0";

/// Tag naming every server setting that changes what a chain produces.
///
/// Two servers sharing a cache directory only share entries when their tags match, so a lenient
/// server never answers for a strict one and a quality change is never served stale bytes.
pub fn settings_tag(format: OutputFormat, jpeg_quality: u8, unknown: UnknownOps) -> String {
    let unknown = match unknown {
        UnknownOps::Reject => "reject",
        UnknownOps::Skip => "skip",
    };
    match format {
        OutputFormat::Jpeg => format!("jpg;q={jpeg_quality};unknown={unknown}"),
        OutputFormat::Png => format!("png;unknown={unknown}"),
    }
}

/// Content address of a transformed image: SHA-256 over (settings, filename, chain), lowercase
/// hex.
///
/// Each field is length-prefixed, so `("ab", "c")` and `("a", "bc")` never collide. The digest is
/// a cache index only and carries no integrity guarantee about the source file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hex: String,
}

impl CacheKey {
    /// Derive the key for `filename` transformed by the raw `chain` string under `settings`
    /// (see [`settings_tag`]).
    pub fn derive(settings: &str, filename: &str, chain: &str) -> Self {
        let mut h = sha2::Sha256::new();
        h.update(KEY_DOMAIN);
        write_field(&mut h, settings.as_bytes());
        write_field(&mut h, filename.as_bytes());
        write_field(&mut h, chain.as_bytes());
        Self {
            hex: hex_lower(&h.finalize()),
        }
    }

    /// Hex digest (64 characters).
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Cache file name, `<digest>.<ext>`.
    pub fn file_name(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.hex, format.extension())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

fn write_field(h: &mut sha2::Sha256, bytes: &[u8]) {
    h.update((bytes.len() as u64).to_le_bytes());
    h.update(bytes);
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/cache/key.rs"]
mod tests;
