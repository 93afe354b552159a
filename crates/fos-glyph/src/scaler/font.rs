//! File-backed scaler context
//!
//! Scales glyphs straight from font data with ttf-parser and rasterizes
//! outlines with tiny-skia.

use std::sync::Arc;

use tiny_skia::{Path, PathBuilder, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use super::ScalerContext;
use crate::descriptor::{HintingMode, ScalerEffects, ScalerRec};
use crate::font::FontTypeface;
use crate::glyph::{FontMetrics, FontMetricsFlags, Glyph, GlyphMetrics, MaskFormat};
use crate::{GlyphError, Result};

/// Scaler context with access to the font program
#[derive(Debug)]
pub struct FontScalerContext {
    typeface: Arc<FontTypeface>,
    rec: ScalerRec,
    effects: ScalerEffects,
}

impl FontScalerContext {
    pub fn new(typeface: Arc<FontTypeface>, rec: ScalerRec, effects: ScalerEffects) -> Self {
        Self {
            typeface,
            rec,
            effects,
        }
    }

    pub fn typeface(&self) -> &FontTypeface {
        &self.typeface
    }

    /// Font units (y up) to device pixels (y down)
    fn units_to_device(&self, face: &Face<'_>) -> Transform {
        let upem = face.units_per_em() as f32;
        self.rec
            .device_transform()
            .pre_scale(1.0 / upem, -1.0 / upem)
    }

    /// Snap advances unless linear metrics were requested
    fn round_advance(&self, advance: f32) -> f32 {
        if self.rec.flags.linear_metrics || self.rec.hinting == HintingMode::None {
            advance
        } else {
            advance.round()
        }
    }

    fn outline(&self, face: &Face<'_>, glyph: GlyphId, transform: Transform) -> Option<Path> {
        let mut builder = DevicePathBuilder::new(transform);
        face.outline_glyph(glyph, &mut builder)?;
        builder.finish()
    }
}

impl ScalerContext for FontScalerContext {
    fn rec(&self) -> &ScalerRec {
        &self.rec
    }

    fn effects(&self) -> &ScalerEffects {
        &self.effects
    }

    fn generate_glyph_count(&mut self) -> Result<u16> {
        Ok(self.typeface.face()?.number_of_glyphs())
    }

    fn generate_char_to_glyph(&mut self, c: char) -> Result<GlyphId> {
        Ok(self.typeface.face()?.glyph_index(c).unwrap_or(GlyphId(0)))
    }

    fn generate_metrics(&mut self, glyph: &mut Glyph) {
        let face = match self.typeface.face() {
            Ok(face) => face,
            Err(e) => {
                tracing::warn!("generate_metrics: {}", e);
                glyph.zero_metrics();
                return;
            }
        };

        let to_device = self.units_to_device(&face);
        let advance = face.glyph_hor_advance(glyph.glyph_id()).unwrap_or(0) as f32;

        let mut metrics = GlyphMetrics {
            mask_format: self.rec.mask_format,
            advance_x: self.round_advance(to_device.sx * advance),
            advance_y: to_device.ky * advance,
            ..GlyphMetrics::default()
        };

        if let Some(bbox) = face.glyph_bounding_box(glyph.glyph_id()) {
            let (sub_x, sub_y) = glyph.id().subpixel_offset();
            let corners = [
                (bbox.x_min, bbox.y_min),
                (bbox.x_min, bbox.y_max),
                (bbox.x_max, bbox.y_min),
                (bbox.x_max, bbox.y_max),
            ];

            let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
            let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
            for (x, y) in corners {
                let (dx, dy) = map_point(&to_device, x as f32, y as f32);
                min_x = min_x.min(dx + sub_x);
                min_y = min_y.min(dy + sub_y);
                max_x = max_x.max(dx + sub_x);
                max_y = max_y.max(dy + sub_y);
            }

            let left = min_x.floor();
            let top = min_y.floor();
            metrics.left = left.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            metrics.top = top.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            metrics.width = (max_x.ceil() - left).clamp(0.0, u16::MAX as f32) as u16;
            metrics.height = (max_y.ceil() - top).clamp(0.0, u16::MAX as f32) as u16;
        }

        glyph.metrics = metrics;
    }

    fn generate_image(&mut self, glyph: &Glyph, image: &mut [u8]) {
        if glyph.is_empty() {
            return;
        }

        let needed = glyph.image_size();
        if image.len() < needed {
            let err = GlyphError::ImageBufferTooSmall {
                needed,
                actual: image.len(),
            };
            tracing::warn!("generate_image: glyph {}: {}", glyph.id(), err);
            return;
        }

        let face = match self.typeface.face() {
            Ok(face) => face,
            Err(e) => {
                tracing::warn!("generate_image: {}", e);
                return;
            }
        };

        let metrics = glyph.metrics;
        let (sub_x, sub_y) = glyph.id().subpixel_offset();
        let transform = self.units_to_device(&face).post_translate(
            sub_x - metrics.left as f32,
            sub_y - metrics.top as f32,
        );

        let Some(path) = self.outline(&face, glyph.glyph_id(), transform) else {
            return;
        };
        let Some(mut pixmap) = tiny_skia::Pixmap::new(metrics.width as u32, metrics.height as u32)
        else {
            return;
        };

        let mut paint = tiny_skia::Paint::default();
        paint.set_color(tiny_skia::Color::WHITE);
        paint.anti_alias = metrics.mask_format != MaskFormat::Bw;

        pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );

        let coverage: Vec<u8> = pixmap.pixels().iter().map(|p| p.alpha()).collect();
        write_mask(metrics.mask_format, metrics.width as usize, &coverage, image);
    }

    fn generate_path(&mut self, glyph: GlyphId, path: &mut PathBuilder) -> bool {
        let face = match self.typeface.face() {
            Ok(face) => face,
            Err(e) => {
                tracing::warn!("generate_path: {}", e);
                return false;
            }
        };

        let transform = self.units_to_device(&face);
        match self.outline(&face, glyph, transform) {
            Some(outline) => {
                path.push_path(&outline);
                true
            }
            None => false,
        }
    }

    fn generate_font_metrics(&mut self, metrics: &mut FontMetrics) {
        *metrics = FontMetrics::default();

        let face = match self.typeface.face() {
            Ok(face) => face,
            Err(e) => {
                tracing::warn!("generate_font_metrics: {}", e);
                return;
            }
        };

        let scale = self.rec.text_size / face.units_per_em() as f32;
        let bbox = face.global_bounding_box();

        metrics.ascent = -(face.ascender() as f32) * scale;
        metrics.descent = -(face.descender() as f32) * scale;
        metrics.leading = face.line_gap() as f32 * scale;
        metrics.top = -(bbox.y_max as f32) * scale;
        metrics.bottom = -(bbox.y_min as f32) * scale;
        metrics.x_min = bbox.x_min as f32 * scale;
        metrics.x_max = bbox.x_max as f32 * scale;
        metrics.max_char_width = metrics.x_max - metrics.x_min;

        if bbox.x_min >= bbox.x_max || bbox.y_min >= bbox.y_max {
            metrics.flags.insert(FontMetricsFlags::BOUNDS_INVALID);
        }

        if let Some(x_height) = face.x_height() {
            metrics.x_height = x_height as f32 * scale;
        }
        if let Some(cap_height) = face.capital_height() {
            metrics.cap_height = cap_height as f32 * scale;
        }

        if let Some(underline) = face.underline_metrics() {
            metrics.underline_thickness = underline.thickness as f32 * scale;
            metrics.underline_position = -(underline.position as f32) * scale;
            metrics.flags.insert(FontMetricsFlags::UNDERLINE_THICKNESS_VALID);
            metrics.flags.insert(FontMetricsFlags::UNDERLINE_POSITION_VALID);
        }
        if let Some(strikeout) = face.strikeout_metrics() {
            metrics.strikeout_thickness = strikeout.thickness as f32 * scale;
            metrics.strikeout_position = -(strikeout.position as f32) * scale;
            metrics.flags.insert(FontMetricsFlags::STRIKEOUT_THICKNESS_VALID);
            metrics.flags.insert(FontMetricsFlags::STRIKEOUT_POSITION_VALID);
        }
    }
}

fn map_point(ts: &Transform, x: f32, y: f32) -> (f32, f32) {
    (
        ts.sx * x + ts.kx * y + ts.tx,
        ts.ky * x + ts.sy * y + ts.ty,
    )
}

/// Convert 8-bit coverage into `format`
fn write_mask(format: MaskFormat, width: usize, coverage: &[u8], image: &mut [u8]) {
    match format {
        MaskFormat::Unknown | MaskFormat::Empty => {}
        MaskFormat::A8 => image[..coverage.len()].copy_from_slice(coverage),
        MaskFormat::Bw => {
            let row_bytes = width.div_ceil(8);
            for (row, line) in coverage.chunks(width).enumerate() {
                for (x, &a) in line.iter().enumerate() {
                    let byte = &mut image[row * row_bytes + x / 8];
                    if a >= 0x80 {
                        *byte |= 0x80 >> (x % 8);
                    } else {
                        *byte &= !(0x80 >> (x % 8));
                    }
                }
            }
        }
        MaskFormat::Lcd16 => {
            for (i, &a) in coverage.iter().enumerate() {
                let (r, g, b) = ((a >> 3) as u16, (a >> 2) as u16, (a >> 3) as u16);
                let packed = (r << 11) | (g << 5) | b;
                image[i * 2..i * 2 + 2].copy_from_slice(&packed.to_le_bytes());
            }
        }
        MaskFormat::Argb32 => {
            for (i, &a) in coverage.iter().enumerate() {
                image[i * 4..i * 4 + 4].copy_from_slice(&[a, a, a, a]);
            }
        }
    }
}

/// Outline builder that maps font units through a transform into a
/// tiny-skia path
struct DevicePathBuilder {
    builder: PathBuilder,
    transform: Transform,
}

impl DevicePathBuilder {
    fn new(transform: Transform) -> Self {
        Self {
            builder: PathBuilder::new(),
            transform,
        }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        map_point(&self.transform, x, y)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for DevicePathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
