/// Target box in pixels. A zero axis means "derive from the other axis".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels, `0` for auto.
    pub width: u32,
    /// Height in pixels, `0` for auto.
    pub height: u32,
}

impl Dimensions {
    /// Construct a box from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` if neither axis is the auto sentinel.
    pub fn is_fixed(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// `true` if both axes are the auto sentinel.
    pub fn is_unbounded(self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Anchor position used to place a crop window inside a larger image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Top edge, horizontally centered.
    Top,
    /// Top-right corner.
    TopRight,
    /// Left edge, vertically centered.
    Left,
    /// Center.
    Center,
    /// Right edge, vertically centered.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge, horizontally centered.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// All anchors with their user-facing tokens.
    pub const ALL: [(&'static str, Anchor); 9] = [
        ("top-left", Anchor::TopLeft),
        ("top", Anchor::Top),
        ("top-right", Anchor::TopRight),
        ("left", Anchor::Left),
        ("center", Anchor::Center),
        ("right", Anchor::Right),
        ("bottom-left", Anchor::BottomLeft),
        ("bottom", Anchor::Bottom),
        ("bottom-right", Anchor::BottomRight),
    ];

    /// Relative position in halves: `(0|1|2, 0|1|2)` for (left|center|right, top|middle|bottom).
    pub fn halves(self) -> (u32, u32) {
        match self {
            Anchor::TopLeft => (0, 0),
            Anchor::Top => (1, 0),
            Anchor::TopRight => (2, 0),
            Anchor::Left => (0, 1),
            Anchor::Center => (1, 1),
            Anchor::Right => (2, 1),
            Anchor::BottomLeft => (0, 2),
            Anchor::Bottom => (1, 2),
            Anchor::BottomRight => (2, 2),
        }
    }

    /// Top-left origin of a `(w, h)` window anchored inside a `(src_w, src_h)` image.
    ///
    /// The window must not be larger than the image on either axis.
    pub fn origin(self, src_w: u32, src_h: u32, w: u32, h: u32) -> (u32, u32) {
        let (hx, hy) = self.halves();
        let free_x = src_w.saturating_sub(w);
        let free_y = src_h.saturating_sub(h);
        (free_x * hx / 2, free_y * hy / 2)
    }

    /// User-facing token for this anchor.
    pub fn as_str(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, a)| *a == self)
            .map(|(name, _)| *name)
            .unwrap_or("center")
    }
}

/// Encoded format of cache entries and responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Baseline JPEG (alpha is dropped).
    #[default]
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// File extension used for cache entries.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// MIME type used for HTTP responses.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
