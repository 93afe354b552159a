//! Remote typefaces
//!
//! A `TypefaceProxy` stands for a font that lives in another process. It
//! knows only what the remote side told it at registration time.

use std::sync::Arc;

use fos_glyph::{FontId, FontStyle, ScalerContext, ScalerEffects, ScalerRec, StrikeCache, Typeface};

use crate::miss::DiscardableHandleManager;
use crate::proxy::ScalerContextProxy;

/// Typeface description received from the remote side
#[derive(Debug, Clone, PartialEq)]
pub struct WireTypeface {
    pub typeface_id: u32,
    pub glyph_count: u16,
    pub style: FontStyle,
    pub is_fixed_pitch: bool,
}

impl WireTypeface {
    pub fn new(typeface_id: u32, glyph_count: u16) -> Self {
        Self {
            typeface_id,
            glyph_count,
            style: FontStyle::Normal,
            is_fixed_pitch: false,
        }
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_fixed_pitch(mut self, fixed: bool) -> Self {
        self.is_fixed_pitch = fixed;
        self
    }
}

/// Local handle for a remote font
#[derive(Debug)]
pub struct TypefaceProxy {
    font_id: FontId,
    remote_id: u32,
    glyph_count: u16,
    style: FontStyle,
    is_fixed_pitch: bool,
    logging: bool,
    scratch_budget: usize,
    manager: Arc<dyn DiscardableHandleManager>,
    strike_cache: Arc<StrikeCache>,
}

impl TypefaceProxy {
    pub fn new(
        font_id: FontId,
        wire: &WireTypeface,
        manager: Arc<dyn DiscardableHandleManager>,
        strike_cache: Arc<StrikeCache>,
    ) -> Self {
        Self {
            font_id,
            remote_id: wire.typeface_id,
            glyph_count: wire.glyph_count,
            style: wire.style,
            is_fixed_pitch: wire.is_fixed_pitch,
            logging: false,
            scratch_budget: fos_glyph::arena::DEFAULT_BUDGET,
            manager,
            strike_cache,
        }
    }

    /// Emit a debug event for every cache miss of this typeface's proxies
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Scratch budget for each proxy created from this typeface
    pub fn with_scratch_budget(mut self, budget: usize) -> Self {
        self.scratch_budget = budget;
        self
    }

    pub fn remote_id(&self) -> u32 {
        self.remote_id
    }

    /// Glyph count announced by the remote side
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.is_fixed_pitch
    }

    pub fn is_logging(&self) -> bool {
        self.logging
    }

    pub fn scratch_budget(&self) -> usize {
        self.scratch_budget
    }

    pub fn manager(&self) -> &Arc<dyn DiscardableHandleManager> {
        &self.manager
    }

    pub fn strike_cache(&self) -> &Arc<StrikeCache> {
        &self.strike_cache
    }
}

impl Typeface for TypefaceProxy {
    fn font_id(&self) -> FontId {
        self.font_id
    }

    fn style(&self) -> FontStyle {
        self.style
    }

    fn create_scaler_context(
        self: Arc<Self>,
        mut rec: ScalerRec,
        effects: ScalerEffects,
    ) -> Box<dyn ScalerContext> {
        rec.font_id = self.font_id;
        Box::new(ScalerContextProxy::new(self, rec, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miss::DiscardableLedger;

    fn proxy(logging: bool) -> Arc<TypefaceProxy> {
        let wire = WireTypeface::new(42, 512)
            .with_style(FontStyle::Italic)
            .with_fixed_pitch(true);
        Arc::new(
            TypefaceProxy::new(
                FontId(3),
                &wire,
                Arc::new(DiscardableLedger::new()),
                Arc::new(StrikeCache::default()),
            )
            .with_logging(logging),
        )
    }

    #[test]
    fn test_wire_fields() {
        let tf = proxy(false);
        assert_eq!(tf.font_id(), FontId(3));
        assert_eq!(tf.remote_id(), 42);
        assert_eq!(tf.glyph_count(), 512);
        assert_eq!(tf.style(), FontStyle::Italic);
        assert!(tf.is_fixed_pitch());
        assert!(!tf.is_logging());
        assert!(proxy(true).is_logging());
    }

    #[test]
    fn test_context_uses_local_font_id() {
        let ctx = proxy(false).create_scaler_context(ScalerRec::new(FontId(42), 12.0), ScalerEffects::default());
        assert_eq!(ctx.rec().font_id, FontId(3));
    }
}
