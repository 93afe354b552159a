//! Glyph records
//!
//! A [`Glyph`] is both the request and the result of a scaler operation:
//! callers create it from a packed id, scaler contexts fill in its metrics,
//! image and path.

use std::fmt;
use std::sync::Arc;

use tiny_skia::Path;
use ttf_parser::GlyphId;

use crate::arena::ScratchArena;

/// Number of subpixel positions per pixel along each axis
pub const SUBPIXEL_ROUNDING: u8 = 4;

/// Glyph id plus quantized subpixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedGlyphId {
    /// Glyph ID in font
    pub glyph: GlyphId,
    /// Horizontal subpixel step (0..SUBPIXEL_ROUNDING)
    pub sub_x: u8,
    /// Vertical subpixel step (0..SUBPIXEL_ROUNDING)
    pub sub_y: u8,
}

impl PackedGlyphId {
    /// Pixel-aligned glyph
    pub fn new(glyph: GlyphId) -> Self {
        Self { glyph, sub_x: 0, sub_y: 0 }
    }

    /// Glyph positioned at (x, y); only the fractional part is kept
    pub fn with_position(glyph: GlyphId, x: f32, y: f32) -> Self {
        Self {
            glyph,
            sub_x: quantize(x),
            sub_y: quantize(y),
        }
    }

    /// Subpixel offset in pixels
    pub fn subpixel_offset(&self) -> (f32, f32) {
        let step = SUBPIXEL_ROUNDING as f32;
        (self.sub_x as f32 / step, self.sub_y as f32 / step)
    }

    /// Same glyph, pixel-aligned
    pub fn aligned(&self) -> Self {
        Self::new(self.glyph)
    }
}

impl From<GlyphId> for PackedGlyphId {
    fn from(glyph: GlyphId) -> Self {
        Self::new(glyph)
    }
}

impl fmt::Display for PackedGlyphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{},{}", self.glyph.0, self.sub_x, self.sub_y)
    }
}

fn quantize(v: f32) -> u8 {
    let frac = v - v.floor();
    let step = SUBPIXEL_ROUNDING as f32;
    (frac * step).round() as u8 % SUBPIXEL_ROUNDING
}

/// Pixel format of a glyph image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaskFormat {
    /// Not computed yet
    #[default]
    Unknown,
    /// Known to have no image (zeroed metrics)
    Empty,
    /// 1 bit per pixel
    Bw,
    /// 8-bit coverage
    A8,
    /// 16-bit LCD coverage (565)
    Lcd16,
    /// 32-bit color (emoji)
    Argb32,
}

impl MaskFormat {
    /// Bytes per image row
    pub fn row_bytes(&self, width: u16) -> usize {
        let width = width as usize;
        match self {
            Self::Unknown | Self::Empty => 0,
            Self::Bw => width.div_ceil(8),
            Self::A8 => width,
            Self::Lcd16 => width * 2,
            Self::Argb32 => width * 4,
        }
    }

    /// Total image size in bytes
    pub fn image_size(&self, width: u16, height: u16) -> usize {
        self.row_bytes(width) * height as usize
    }
}

/// Glyph metrics, everything a scaler fills in except the payloads
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    pub mask_format: MaskFormat,
    /// Image width in pixels
    pub width: u16,
    /// Image height in pixels
    pub height: u16,
    /// Offset from origin to the image's left edge
    pub left: i16,
    /// Offset from origin to the image's top edge (y down)
    pub top: i16,
    /// Horizontal advance
    pub advance_x: f32,
    /// Vertical advance
    pub advance_y: f32,
}

/// A glyph request and its results
#[derive(Debug, Clone)]
pub struct Glyph {
    id: PackedGlyphId,
    pub metrics: GlyphMetrics,
    /// Image bytes in `metrics.mask_format`
    pub image: Option<Arc<[u8]>>,
    /// Device space outline
    pub path: Option<Arc<Path>>,
}

impl Glyph {
    /// Create an unfilled glyph request
    pub fn new(id: impl Into<PackedGlyphId>) -> Self {
        Self {
            id: id.into(),
            metrics: GlyphMetrics::default(),
            image: None,
            path: None,
        }
    }

    pub fn id(&self) -> PackedGlyphId {
        self.id
    }

    pub fn glyph_id(&self) -> GlyphId {
        self.id.glyph
    }

    pub fn mask_format(&self) -> MaskFormat {
        self.metrics.mask_format
    }

    /// True until a scaler has resolved the mask format
    pub fn is_unresolved(&self) -> bool {
        self.metrics.mask_format == MaskFormat::Unknown
    }

    /// No pixels to draw
    pub fn is_empty(&self) -> bool {
        self.metrics.width == 0 || self.metrics.height == 0
    }

    /// Size the image must have for the current metrics
    pub fn image_size(&self) -> usize {
        self.metrics
            .mask_format
            .image_size(self.metrics.width, self.metrics.height)
    }

    /// Clear all metrics and mark the glyph as known-empty
    pub fn zero_metrics(&mut self) {
        self.metrics = GlyphMetrics {
            mask_format: MaskFormat::Empty,
            ..GlyphMetrics::default()
        };
        self.image = None;
    }

    /// Copy metrics and a deep copy of the image from another glyph.
    ///
    /// The id of `self` is kept; image bytes are owned by `arena`.
    pub fn copy_image_data(&mut self, from: &Glyph, arena: &mut ScratchArena) {
        self.metrics = from.metrics;
        self.image = from.image.as_deref().map(|bytes| arena.alloc_bytes(bytes));
    }

    /// Attach an outline
    pub fn set_path(&mut self, path: Path) {
        self.path = Some(Arc::new(path));
    }
}

/// Validity flags for [`FontMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontMetricsFlags(pub u32);

impl FontMetricsFlags {
    pub const UNDERLINE_THICKNESS_VALID: FontMetricsFlags = FontMetricsFlags(1 << 0);
    pub const UNDERLINE_POSITION_VALID: FontMetricsFlags = FontMetricsFlags(1 << 1);
    pub const STRIKEOUT_THICKNESS_VALID: FontMetricsFlags = FontMetricsFlags(1 << 2);
    pub const STRIKEOUT_POSITION_VALID: FontMetricsFlags = FontMetricsFlags(1 << 3);
    pub const BOUNDS_INVALID: FontMetricsFlags = FontMetricsFlags(1 << 4);

    pub fn contains(&self, other: FontMetricsFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: FontMetricsFlags) {
        self.0 |= other.0;
    }
}

/// Font-wide metrics in pixels, y down (ascent is negative)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    pub flags: FontMetricsFlags,
    /// Greatest extent above the baseline for any glyph
    pub top: f32,
    /// Recommended distance above the baseline
    pub ascent: f32,
    /// Recommended distance below the baseline
    pub descent: f32,
    /// Greatest extent below the baseline for any glyph
    pub bottom: f32,
    /// Recommended distance to add between lines
    pub leading: f32,
    pub avg_char_width: f32,
    pub max_char_width: f32,
    pub x_min: f32,
    pub x_max: f32,
    pub x_height: f32,
    pub cap_height: f32,
    pub underline_thickness: f32,
    pub underline_position: f32,
    pub strikeout_thickness: f32,
    pub strikeout_position: f32,
}

impl FontMetrics {
    /// Line height (descent - ascent + leading)
    pub fn line_height(&self) -> f32 {
        self.descent - self.ascent + self.leading
    }
}
