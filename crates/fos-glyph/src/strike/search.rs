//! Desperation search
//!
//! Best-effort lookup of glyph data in strikes that are close to, but not
//! exactly, the requested configuration. Used by scaler contexts that cannot
//! compute glyphs themselves. Searches only take read locks and never touch
//! strike order or contents.

use tiny_skia::PathBuilder;
use ttf_parser::GlyphId;

use super::{find_any_subpixel, find_any_subpixel_path, read, StrikeCache};
use crate::arena::ScratchArena;
use crate::descriptor::ScalerDescriptor;
use crate::glyph::{Glyph, PackedGlyphId};

impl StrikeCache {
    /// Copy metrics and image of a substitute glyph into `glyph`.
    ///
    /// The first accepted strike holding the glyph wins: the exact subpixel
    /// position is preferred, any other position of the same glyph is taken
    /// otherwise. Returns false (leaving `glyph` untouched) when nothing
    /// resident qualifies.
    pub fn search_for_image(
        &self,
        descriptor: &ScalerDescriptor,
        glyph: &mut Glyph,
        arena: &mut ScratchArena,
    ) -> bool {
        let strikes = read(&self.strikes);
        let id = glyph.id();

        for strike in strikes
            .iter()
            .filter(|s| self.policy.accepts(descriptor, s.descriptor()))
        {
            let glyphs = strike.glyphs();
            let fallback = glyphs
                .get(&id)
                .or_else(|| find_any_subpixel(&glyphs, id.glyph));

            if let Some(fallback) = fallback {
                tracing::trace!(
                    "Desperation image match for glyph {} in {}",
                    id,
                    strike.descriptor()
                );
                glyph.copy_image_data(fallback, arena);
                return true;
            }
        }

        false
    }

    /// Append a substitute outline for `glyph` to `path`.
    ///
    /// Outlines do not depend on the subpixel position: the pixel-aligned
    /// entry is tried first, then any subpixel variant carrying path data.
    /// Returns false and leaves `path` untouched when nothing resident
    /// qualifies.
    pub fn search_for_path(
        &self,
        descriptor: &ScalerDescriptor,
        glyph: GlyphId,
        path: &mut PathBuilder,
    ) -> bool {
        let strikes = read(&self.strikes);
        let id = PackedGlyphId::new(glyph);

        for strike in strikes
            .iter()
            .filter(|s| self.policy.accepts(descriptor, s.descriptor()))
        {
            let glyphs = strike.glyphs();
            let source = glyphs
                .get(&id)
                .and_then(|g| g.path.as_ref())
                .or_else(|| find_any_subpixel_path(&glyphs, glyph));

            if let Some(source) = source {
                tracing::trace!(
                    "Desperation path match for glyph {} in {}",
                    glyph.0,
                    strike.descriptor()
                );
                path.push_path(source);
                return true;
            }
        }

        false
    }
}
