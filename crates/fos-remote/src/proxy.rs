//! Scaler context proxy
//!
//! Scaler context for a font the local process cannot read. Every request
//! is a cache miss: the proxy reports it to the discardable handle manager
//! so the remote side can ship real data, and in the meantime tries to
//! borrow glyphs from a close enough resident strike.

use std::sync::Arc;

use fos_glyph::{
    FontMetrics, Glyph, GlyphError, GlyphId, PathBuilder, Result, ScalerContext, ScalerDescriptor,
    ScalerEffects, ScalerRec, ScratchArena, StrikeCache,
};

use crate::miss::{CacheMissKind, DiscardableHandleManager};
use crate::typeface::TypefaceProxy;

/// Scaler context backed by resident strikes and miss reports
#[derive(Debug)]
pub struct ScalerContextProxy {
    typeface: Arc<TypefaceProxy>,
    rec: ScalerRec,
    effects: ScalerEffects,
    manager: Arc<dyn DiscardableHandleManager>,
    strike_cache: Arc<StrikeCache>,
    /// Owns substitute image bytes handed out by `generate_metrics`
    arena: ScratchArena,
}

impl ScalerContextProxy {
    pub fn new(typeface: Arc<TypefaceProxy>, rec: ScalerRec, effects: ScalerEffects) -> Self {
        let manager = Arc::clone(typeface.manager());
        let strike_cache = Arc::clone(typeface.strike_cache());
        let arena = ScratchArena::with_budget(typeface.scratch_budget());
        Self {
            typeface,
            rec,
            effects,
            manager,
            strike_cache,
            arena,
        }
    }

    pub fn proxy_typeface(&self) -> &TypefaceProxy {
        &self.typeface
    }

    pub fn arena(&self) -> &ScratchArena {
        &self.arena
    }

    fn log_miss(&self, operation: &str) {
        if self.typeface.is_logging() {
            tracing::debug!("GlyphCacheMiss {}: {}", operation, self.rec);
        }
    }

    fn contract_violation(&self, operation: &'static str) -> GlyphError {
        tracing::error!(
            "{} called on remote scaler context for font {}",
            operation,
            self.rec.font_id.0
        );
        GlyphError::ContractViolation {
            operation,
            context: "remote",
        }
    }
}

impl ScalerContext for ScalerContextProxy {
    fn rec(&self) -> &ScalerRec {
        &self.rec
    }

    fn effects(&self) -> &ScalerEffects {
        &self.effects
    }

    fn generate_glyph_count(&mut self) -> Result<u16> {
        Err(self.contract_violation("generate_glyph_count"))
    }

    fn generate_char_to_glyph(&mut self, _c: char) -> Result<GlyphId> {
        Err(self.contract_violation("generate_char_to_glyph"))
    }

    fn generate_metrics(&mut self, glyph: &mut Glyph) {
        let _span = tracing::trace_span!("generate_metrics", rec = %self.rec).entered();
        self.log_miss("generate_metrics");

        let descriptor = ScalerDescriptor::new(&self.rec, &self.effects);
        self.strike_cache
            .search_for_image(&descriptor, glyph, &mut self.arena);

        // Nothing borrowed: draw nothing rather than garbage
        if glyph.is_unresolved() {
            glyph.zero_metrics();
        }

        self.manager.notify_cache_miss(CacheMissKind::GlyphMetrics);
    }

    fn generate_image(&mut self, _glyph: &Glyph, _image: &mut [u8]) {
        let _span = tracing::trace_span!("generate_image", rec = %self.rec).entered();
        self.log_miss("generate_image");

        self.manager.notify_cache_miss(CacheMissKind::GlyphImage);
    }

    fn generate_path(&mut self, glyph: GlyphId, path: &mut PathBuilder) -> bool {
        let _span = tracing::trace_span!("generate_path", rec = %self.rec).entered();
        self.log_miss("generate_path");

        let descriptor = ScalerDescriptor::new(&self.rec, &self.effects);
        let found = self
            .strike_cache
            .search_for_path(&descriptor, glyph, path);

        self.manager.notify_cache_miss(CacheMissKind::GlyphPath);
        found
    }

    fn generate_font_metrics(&mut self, metrics: &mut FontMetrics) {
        let _span = tracing::trace_span!("generate_font_metrics", rec = %self.rec).entered();
        if self.typeface.is_logging() {
            tracing::debug!("GlyphCacheMiss generate_font_metrics: {}", self.rec);
            #[cfg(any(debug_assertions, feature = "strike-dump"))]
            self.strike_cache.dump();
        }

        self.manager.notify_cache_miss(CacheMissKind::FontMetrics);
        *metrics = FontMetrics::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miss::DiscardableLedger;
    use crate::typeface::WireTypeface;
    use fos_glyph::{FontId, GlyphMetrics, MaskFormat, PackedGlyphId, Typeface};

    struct Fixture {
        ledger: Arc<DiscardableLedger>,
        cache: Arc<StrikeCache>,
        typeface: Arc<TypefaceProxy>,
    }

    impl Fixture {
        fn new() -> Self {
            let ledger = Arc::new(DiscardableLedger::new());
            let cache = Arc::new(StrikeCache::default());
            let typeface = Arc::new(TypefaceProxy::new(
                FontId(1),
                &WireTypeface::new(10, 100),
                ledger.clone(),
                cache.clone(),
            ));
            Self {
                ledger,
                cache,
                typeface,
            }
        }

        fn proxy(&self, rec: ScalerRec) -> ScalerContextProxy {
            ScalerContextProxy::new(self.typeface.clone(), rec, ScalerEffects::default())
        }
    }

    #[test]
    fn test_metrics_miss_zeroes() {
        let fx = Fixture::new();
        let mut proxy = fx.proxy(ScalerRec::new(FontId(1), 12.0));
        let mut glyph = Glyph::new(GlyphId(5));
        glyph.metrics.advance_x = 3.0;

        proxy.generate_metrics(&mut glyph);
        assert_eq!(glyph.mask_format(), MaskFormat::Empty);
        assert_eq!(glyph.metrics.advance_x, 0.0);
        assert_eq!(fx.ledger.misses().glyph_metrics, 1);
        assert_eq!(fx.ledger.misses().total(), 1);
    }

    #[test]
    fn test_metrics_copied_into_arena() {
        let fx = Fixture::new();
        let rec = ScalerRec::new(FontId(1), 12.0);
        let strike = fx.cache.attach_strike(ScalerDescriptor::new(&rec, &ScalerEffects::default()));
        let mut resident = Glyph::new(GlyphId(5));
        resident.metrics = GlyphMetrics {
            mask_format: MaskFormat::A8,
            width: 1,
            height: 2,
            left: 0,
            top: -2,
            advance_x: 1.0,
            advance_y: 0.0,
        };
        resident.image = Some(Arc::from(vec![7u8, 8]));
        strike.insert_glyph(resident.clone());

        let mut proxy = fx.proxy(rec);
        let mut glyph = Glyph::new(PackedGlyphId::new(GlyphId(5)));
        proxy.generate_metrics(&mut glyph);

        assert_eq!(glyph.metrics, resident.metrics);
        assert_eq!(glyph.image.as_deref(), Some(&[7u8, 8][..]));
        assert_eq!(proxy.arena().bytes_used(), 2);
    }

    #[test]
    fn test_advance_delegates_to_metrics() {
        let fx = Fixture::new();
        let mut proxy = fx.proxy(ScalerRec::new(FontId(1), 12.0));
        let mut glyph = Glyph::new(GlyphId(5));
        proxy.generate_advance(&mut glyph);
        assert_eq!(glyph.mask_format(), MaskFormat::Empty);
        assert_eq!(fx.ledger.misses().glyph_metrics, 1);
    }

    #[test]
    fn test_contract_violations() {
        let fx = Fixture::new();
        let mut proxy = fx.proxy(ScalerRec::new(FontId(1), 12.0));
        for _ in 0..2 {
            assert!(matches!(
                proxy.generate_glyph_count(),
                Err(GlyphError::ContractViolation {
                    operation: "generate_glyph_count",
                    ..
                })
            ));
            assert!(matches!(
                proxy.generate_char_to_glyph('a'),
                Err(GlyphError::ContractViolation {
                    operation: "generate_char_to_glyph",
                    ..
                })
            ));
        }
        // Not a miss
        assert!(fx.ledger.misses().is_empty());
    }

    #[test]
    fn test_typeface_accessor() {
        let fx = Fixture::new();
        let proxy = fx.typeface.clone().create_scaler_context(ScalerRec::new(FontId(9), 12.0), ScalerEffects::default());
        assert_eq!(proxy.rec().font_id, FontId(1));
        assert_eq!(fx.proxy(ScalerRec::new(FontId(1), 12.0)).proxy_typeface().remote_id(), 10);
    }
}
