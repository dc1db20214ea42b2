//! Parameter grammar for operation arguments.
//!
//! Each parser takes the raw text after `=` and returns a typed value or a [`ParamError`] naming
//! the offending input. Parsers never see the operation name; the registry attaches it.

use crate::foundation::{
    core::{Anchor, Dimensions},
    error::ParamError,
};

/// Parse a decimal scalar such as `1.5` or `-20`.
pub fn parse_float(raw: &str) -> Result<f64, ParamError> {
    let v: f64 = raw
        .parse()
        .map_err(|_| ParamError::InvalidParameter(raw.to_string()))?;
    if !v.is_finite() {
        return Err(ParamError::InvalidParameter(raw.to_string()));
    }
    Ok(v)
}

/// Parse `<width>x<height>`. Either side may be `0` (auto).
pub fn parse_dimensions(raw: &str) -> Result<Dimensions, ParamError> {
    let invalid = || ParamError::InvalidDimensions(raw.to_string());

    let mut parts = raw.split('x');
    let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    Ok(Dimensions {
        width: parse_axis(w).ok_or_else(invalid)?,
        height: parse_axis(h).ok_or_else(invalid)?,
    })
}

fn parse_axis(s: &str) -> Option<u32> {
    // `u32::from_str` accepts a leading `+`; the grammar is digits only.
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse one of the nine anchor tokens (`top-left` .. `bottom-right`).
pub fn parse_anchor(raw: &str) -> Result<Anchor, ParamError> {
    Anchor::ALL
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, a)| *a)
        .ok_or_else(|| ParamError::InvalidAnchor(raw.to_string()))
}

/// Parse `<width>x<height>@<anchor>`.
pub fn parse_dimensions_anchor(raw: &str) -> Result<(Dimensions, Anchor), ParamError> {
    let mut parts = raw.split('@');
    let (Some(dims), Some(anchor), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParamError::InvalidCropSpec(raw.to_string()));
    };
    Ok((parse_dimensions(dims)?, parse_anchor(anchor)?))
}

#[cfg(test)]
#[path = "../../tests/unit/ops/params.rs"]
mod tests;
