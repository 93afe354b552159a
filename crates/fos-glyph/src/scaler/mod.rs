//! Scaler contexts
//!
//! A scaler context turns glyph ids into metrics, images and paths for one
//! [`ScalerRec`]. Which implementation backs a context is decided by the
//! [`Typeface`] that creates it: file-backed fonts produce a
//! [`FontScalerContext`], remote typefaces produce a proxy that only knows
//! what is already resident in the strike cache.

mod font;

use std::fmt;
use std::sync::Arc;

use tiny_skia::PathBuilder;
use ttf_parser::GlyphId;

use crate::descriptor::{ScalerDescriptor, ScalerEffects, ScalerRec};
use crate::font::{FontId, FontStyle};
use crate::glyph::{FontMetrics, Glyph};
use crate::Result;

pub use font::FontScalerContext;

/// A source of scaler contexts
pub trait Typeface: Send + Sync + fmt::Debug {
    fn font_id(&self) -> FontId;

    fn style(&self) -> FontStyle {
        FontStyle::Normal
    }

    /// Create the context variant that matches this typeface
    fn create_scaler_context(
        self: Arc<Self>,
        rec: ScalerRec,
        effects: ScalerEffects,
    ) -> Box<dyn ScalerContext>;
}

/// Glyph operations for one scaler configuration
pub trait ScalerContext: Send {
    fn rec(&self) -> &ScalerRec;

    fn effects(&self) -> &ScalerEffects;

    /// Descriptor of this context's configuration
    fn descriptor(&self) -> ScalerDescriptor {
        ScalerDescriptor::new(self.rec(), self.effects())
    }

    /// Number of glyphs in the font
    fn generate_glyph_count(&mut self) -> Result<u16>;

    /// Map a code point to a glyph id (0 when unmapped)
    fn generate_char_to_glyph(&mut self, c: char) -> Result<GlyphId>;

    /// Fill in the advance; by default the full metrics are computed
    fn generate_advance(&mut self, glyph: &mut Glyph) {
        self.generate_metrics(glyph);
    }

    /// Fill in mask format, bounds and advance
    fn generate_metrics(&mut self, glyph: &mut Glyph);

    /// Render `glyph` (with metrics already filled) into `image`
    fn generate_image(&mut self, glyph: &Glyph, image: &mut [u8]);

    /// Append the device space outline of `glyph` to `path`.
    ///
    /// Returns false and leaves `path` untouched when no outline exists.
    fn generate_path(&mut self, glyph: GlyphId, path: &mut PathBuilder) -> bool;

    /// Fill in font-wide metrics
    fn generate_font_metrics(&mut self, metrics: &mut FontMetrics);
}
