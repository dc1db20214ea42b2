//! Pixel kernels on straight-alpha RGBA8 buffers.
//!
//! Every kernel is pure: it borrows its input and returns a new image. Color adjustments touch
//! RGB only and leave alpha unchanged. Geometry and blur kernels report misuse as `Err(String)` so
//! the executor can attribute the failure to the operation that caused it.

use image::{
    RgbaImage,
    imageops::{self, FilterType},
};

use crate::foundation::core::{Anchor, Dimensions};

const RESAMPLE: FilterType = FilterType::Lanczos3;

/// Largest width or height a resize may produce.
pub const MAX_DIMENSION: u32 = 16_384;

/// Largest blur or sharpen sigma. Kernel size and run time grow linearly with sigma.
pub const MAX_SIGMA: f64 = 250.0;

/// Gaussian blur with standard deviation `sigma`. `sigma <= 0` is the identity.
pub fn blur(img: &RgbaImage, sigma: f64) -> Result<RgbaImage, String> {
    if sigma <= 0.0 {
        return Ok(img.clone());
    }
    check_sigma(sigma)?;
    Ok(imageops::blur(img, sigma as f32))
}

/// Unsharp mask with blur radius `sigma`. `sigma <= 0` is the identity.
pub fn sharpen(img: &RgbaImage, sigma: f64) -> Result<RgbaImage, String> {
    if sigma <= 0.0 {
        return Ok(img.clone());
    }
    check_sigma(sigma)?;
    Ok(imageops::unsharpen(img, sigma as f32, 0))
}

/// Gamma correction; `1.0` is the identity, values above brighten midtones.
pub fn gamma(img: &RgbaImage, gamma: f64) -> RgbaImage {
    let e = 1.0 / gamma.max(1.0e-4);
    map_rgb_lut(img, |i| clamp_u8((i / 255.0).powf(e) * 255.0))
}

/// Contrast change in percent, clamped to `-100..=100`.
pub fn contrast(img: &RgbaImage, percentage: f64) -> RgbaImage {
    let p = percentage.clamp(-100.0, 100.0);
    let v = (100.0 + p) / 100.0;
    map_rgb_lut(img, |i| {
        let x = i / 255.0 - 0.5;
        if v <= 1.0 {
            clamp_u8((0.5 + x * v) * 255.0)
        } else if v < 2.0 {
            clamp_u8((0.5 + x / (2.0 - v)) * 255.0)
        } else if i < 128.0 {
            0
        } else {
            255
        }
    })
}

/// Brightness shift in percent of full scale, clamped to `-100..=100`.
pub fn brightness(img: &RgbaImage, percentage: f64) -> RgbaImage {
    let shift = 255.0 * percentage.clamp(-100.0, 100.0) / 100.0;
    map_rgb_lut(img, |i| clamp_u8(i + shift))
}

/// Saturation change in percent, clamped to `-100..=500`.
pub fn saturation(img: &RgbaImage, percentage: f64) -> RgbaImage {
    let m = 1.0 + percentage.clamp(-100.0, 500.0) / 100.0;
    map_hsl(img, |h, s, l| (h, (s * m).min(1.0), l))
}

/// Hue rotation in degrees. Multiples of 360 are the identity.
pub fn hue(img: &RgbaImage, degrees: f64) -> RgbaImage {
    if degrees % 360.0 == 0.0 {
        return img.clone();
    }
    let shift = degrees / 360.0;
    map_hsl(img, |h, s, l| ((h + shift).rem_euclid(1.0), s, l))
}

/// Rec. 601 luma desaturation; the result is still RGBA8.
pub fn grayscale(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let [r, g, b, _] = px.0;
        let y = clamp_u8(0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b));
        px.0[0] = y;
        px.0[1] = y;
        px.0[2] = y;
    }
    out
}

/// Invert color channels.
pub fn invert(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = 255 - *c;
        }
    }
    out
}

/// Scale to `dims`; a zero axis is derived from the source aspect ratio.
pub fn resize(img: &RgbaImage, dims: Dimensions) -> Result<RgbaImage, String> {
    let (sw, sh) = img.dimensions();
    let (w, h) = match (dims.width, dims.height) {
        (0, 0) => return Err("width and height cannot both be 0".to_string()),
        (0, h) => (scale_axis(sw, h, sh), h),
        (w, 0) => (w, scale_axis(sh, w, sw)),
        (w, h) => (w, h),
    };
    if w > MAX_DIMENSION || h > MAX_DIMENSION {
        return Err(format!("target {w}x{h} exceeds the {MAX_DIMENSION}px limit"));
    }
    if (w, h) == (sw, sh) {
        return Ok(img.clone());
    }
    Ok(imageops::resize(img, w, h, RESAMPLE))
}

/// Downscale to fit inside `dims` preserving aspect ratio. Never upscales.
pub fn fit(img: &RgbaImage, dims: Dimensions) -> Result<RgbaImage, String> {
    if dims.is_unbounded() {
        return Err("width and height cannot both be 0".to_string());
    }
    let (sw, sh) = img.dimensions();
    let max_w = if dims.width == 0 { u32::MAX } else { dims.width };
    let max_h = if dims.height == 0 { u32::MAX } else { dims.height };
    if sw <= max_w && sh <= max_h {
        return Ok(img.clone());
    }

    let src_aspect = f64::from(sw) / f64::from(sh);
    let max_aspect = f64::from(max_w) / f64::from(max_h);
    let (w, h) = if src_aspect > max_aspect {
        (max_w, round_px(f64::from(max_w) / src_aspect))
    } else {
        (round_px(f64::from(max_h) * src_aspect), max_h)
    };
    Ok(imageops::resize(img, w, h, RESAMPLE))
}

/// Scale to cover `dims` then crop the overflow around `anchor`.
pub fn fill(img: &RgbaImage, dims: Dimensions, anchor: Anchor) -> Result<RgbaImage, String> {
    if !dims.is_fixed() {
        return Err("fill requires non-zero width and height".to_string());
    }
    let (sw, sh) = img.dimensions();
    if (sw, sh) == (dims.width, dims.height) {
        return Ok(img.clone());
    }

    let src_aspect = f64::from(sw) / f64::from(sh);
    let dst_aspect = f64::from(dims.width) / f64::from(dims.height);
    let scaled = if src_aspect < dst_aspect {
        resize(img, Dimensions::new(dims.width, 0))?
    } else {
        resize(img, Dimensions::new(0, dims.height))?
    };
    crop(&scaled, dims, anchor)
}

/// Cut a `dims` window positioned by `anchor`. The window is clamped to the image bounds.
pub fn crop(img: &RgbaImage, dims: Dimensions, anchor: Anchor) -> Result<RgbaImage, String> {
    if !dims.is_fixed() {
        return Err("crop requires non-zero width and height".to_string());
    }
    let (sw, sh) = img.dimensions();
    let w = dims.width.min(sw);
    let h = dims.height.min(sh);
    let (x, y) = anchor.origin(sw, sh, w, h);
    Ok(imageops::crop_imm(img, x, y, w, h).to_image())
}

fn check_sigma(sigma: f64) -> Result<(), String> {
    if sigma > MAX_SIGMA {
        return Err(format!("sigma {sigma} exceeds maximum {MAX_SIGMA}"));
    }
    Ok(())
}

fn scale_axis(src_other: u32, dst: u32, src: u32) -> u32 {
    let num = u64::from(src_other) * u64::from(dst);
    let den = u64::from(src.max(1));
    let v = (num + den / 2) / den;
    u32::try_from(v).unwrap_or(u32::MAX).max(1)
}

fn round_px(v: f64) -> u32 {
    (v.round() as u32).max(1)
}

fn clamp_u8(v: f64) -> u8 {
    (v + 0.5).clamp(0.0, 255.0) as u8
}

fn map_rgb_lut(img: &RgbaImage, f: impl Fn(f64) -> u8) -> RgbaImage {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = f(i as f64);
    }
    let mut out = img.clone();
    for px in out.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = lut[usize::from(*c)];
        }
    }
    out
}

fn map_hsl(img: &RgbaImage, f: impl Fn(f64, f64, f64) -> (f64, f64, f64)) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let [r, g, b, _] = px.0;
        let (h, s, l) = rgb_to_hsl(r, g, b);
        let (h, s, l) = f(h, s, l);
        let (r, g, b) = hsl_to_rgb(h, s, l);
        px.0[0] = r;
        px.0[1] = g;
        px.0[2] = b;
    }
    out
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s == 0.0 {
        let v = clamp_u8(l * 255.0);
        return (v, v, v);
    }
    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    (
        clamp_u8(hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0),
        clamp_u8(hue_to_channel(p, q, h) * 255.0),
        clamp_u8(hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0),
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/kernels.rs"]
mod tests;
