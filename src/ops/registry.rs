//! Static operation table.
//!
//! The registry maps an operation name to its parameter shape and a builder that turns the raw
//! parameter into a typed [`Transform`]. The executor only ever calls [`Registry::get`], so adding
//! an operation means adding a table row (and its [`Transform`] variant), nothing else.

use image::RgbaImage;

use crate::{
    foundation::{
        core::{Anchor, Dimensions},
        error::ParamError,
    },
    ops::{kernels, params},
};

/// Parameter grammar expected after `name=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamShape {
    /// No parameter.
    None,
    /// One decimal scalar.
    Float,
    /// `<width>x<height>`.
    Dimensions,
    /// `<width>x<height>@<anchor>`.
    DimensionsAnchor,
}

/// A fully parsed operation, ready to run against an image.
#[derive(Clone, Debug, PartialEq)]
pub enum Transform {
    /// Gaussian blur, sigma.
    Blur(f64),
    /// Unsharp mask, sigma.
    Sharpen(f64),
    /// Gamma correction.
    Gamma(f64),
    /// Contrast, percent.
    Contrast(f64),
    /// Brightness, percent.
    Brightness(f64),
    /// Saturation, percent.
    Saturation(f64),
    /// Hue rotation, degrees.
    Hue(f64),
    /// Scale to size.
    Resize(Dimensions),
    /// Scale to fit inside a box.
    Fit(Dimensions),
    /// Scale and crop to fill a box.
    Fill(Dimensions, Anchor),
    /// Crop an anchored window.
    Crop(Dimensions, Anchor),
    /// Desaturate.
    Grayscale,
    /// Invert color channels.
    Invert,
}

impl Transform {
    /// Run this transform. The input is never modified.
    pub fn apply(&self, img: &RgbaImage) -> Result<RgbaImage, String> {
        match *self {
            Transform::Blur(v) => kernels::blur(img, v),
            Transform::Sharpen(v) => kernels::sharpen(img, v),
            Transform::Gamma(v) => Ok(kernels::gamma(img, v)),
            Transform::Contrast(v) => Ok(kernels::contrast(img, v)),
            Transform::Brightness(v) => Ok(kernels::brightness(img, v)),
            Transform::Saturation(v) => Ok(kernels::saturation(img, v)),
            Transform::Hue(v) => Ok(kernels::hue(img, v)),
            Transform::Resize(d) => kernels::resize(img, d),
            Transform::Fit(d) => kernels::fit(img, d),
            Transform::Fill(d, a) => kernels::fill(img, d, a),
            Transform::Crop(d, a) => kernels::crop(img, d, a),
            Transform::Grayscale => Ok(kernels::grayscale(img)),
            Transform::Invert => Ok(kernels::invert(img)),
        }
    }
}

/// Builder from raw parameter text to a typed transform.
pub type BuildFn = fn(&str) -> Result<Transform, ParamError>;

/// One registry row.
#[derive(Clone, Copy, Debug)]
pub struct OpSpec {
    /// Name as written in the chain.
    pub name: &'static str,
    /// Expected parameter grammar.
    pub shape: ParamShape,
    /// Parameter parser.
    pub build: BuildFn,
}

/// Immutable name -> operation table.
#[derive(Clone, Copy, Debug)]
pub struct Registry {
    ops: &'static [OpSpec],
}

static BUILTIN_OPS: &[OpSpec] = &[
    OpSpec {
        name: "blur",
        shape: ParamShape::Float,
        build: |raw| Ok(Transform::Blur(params::parse_float(raw)?)),
    },
    OpSpec {
        name: "sharpen",
        shape: ParamShape::Float,
        build: |raw| Ok(Transform::Sharpen(params::parse_float(raw)?)),
    },
    OpSpec {
        name: "gamma",
        shape: ParamShape::Float,
        build: |raw| Ok(Transform::Gamma(params::parse_float(raw)?)),
    },
    OpSpec {
        name: "contrast",
        shape: ParamShape::Float,
        build: |raw| Ok(Transform::Contrast(params::parse_float(raw)?)),
    },
    OpSpec {
        name: "brightness",
        shape: ParamShape::Float,
        build: |raw| Ok(Transform::Brightness(params::parse_float(raw)?)),
    },
    OpSpec {
        name: "saturation",
        shape: ParamShape::Float,
        build: |raw| Ok(Transform::Saturation(params::parse_float(raw)?)),
    },
    OpSpec {
        name: "hue",
        shape: ParamShape::Float,
        build: |raw| Ok(Transform::Hue(params::parse_float(raw)?)),
    },
    OpSpec {
        name: "resize",
        shape: ParamShape::Dimensions,
        build: |raw| Ok(Transform::Resize(params::parse_dimensions(raw)?)),
    },
    OpSpec {
        name: "fit",
        shape: ParamShape::Dimensions,
        build: |raw| Ok(Transform::Fit(params::parse_dimensions(raw)?)),
    },
    OpSpec {
        name: "fill",
        shape: ParamShape::DimensionsAnchor,
        build: |raw| {
            let (d, a) = params::parse_dimensions_anchor(raw)?;
            Ok(Transform::Fill(d, a))
        },
    },
    OpSpec {
        name: "crop",
        shape: ParamShape::DimensionsAnchor,
        build: |raw| {
            let (d, a) = params::parse_dimensions_anchor(raw)?;
            Ok(Transform::Crop(d, a))
        },
    },
    OpSpec {
        name: "grayscale",
        shape: ParamShape::None,
        build: |raw| no_param(raw, Transform::Grayscale),
    },
    OpSpec {
        name: "invert",
        shape: ParamShape::None,
        build: |raw| no_param(raw, Transform::Invert),
    },
];

static BUILTIN: Registry = Registry::new(BUILTIN_OPS);

impl Registry {
    /// Wrap a static table. Later rows never shadow earlier ones.
    pub const fn new(ops: &'static [OpSpec]) -> Self {
        Self { ops }
    }

    /// The thirteen built-in operations.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Look up an operation by exact name.
    pub fn get(&self, name: &str) -> Option<&'static OpSpec> {
        self.ops.iter().find(|op| op.name == name)
    }

    /// Registered names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.ops.iter().map(|op| op.name)
    }
}

impl OpSpec {
    /// Parse `raw` into a transform for this operation.
    pub fn build(&self, raw: &str) -> Result<Transform, ParamError> {
        (self.build)(raw)
    }
}

fn no_param(raw: &str, t: Transform) -> Result<Transform, ParamError> {
    if raw.is_empty() {
        Ok(t)
    } else {
        Err(ParamError::InvalidParameter(raw.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/registry.rs"]
mod tests;
