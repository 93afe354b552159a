//! Strike client
//!
//! Renderer-side registry of remote typefaces. Owns the strike cache shared
//! by all proxies and hands out scaler contexts for registered fonts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use fos_glyph::{FontId, ScalerContext, ScalerEffects, ScalerRec, StrikeCache, Typeface};

use crate::config::RemoteGlyphConfig;
use crate::miss::DiscardableHandleManager;
use crate::typeface::{TypefaceProxy, WireTypeface};
use crate::{RemoteError, Result};

/// Registry of remote typefaces
#[derive(Debug)]
pub struct StrikeClient {
    config: RemoteGlyphConfig,
    manager: Arc<dyn DiscardableHandleManager>,
    strike_cache: Arc<StrikeCache>,
    /// Keyed by remote typeface id
    typefaces: RwLock<HashMap<u32, Arc<TypefaceProxy>>>,
    next_font_id: AtomicU32,
}

impl StrikeClient {
    pub fn new(config: RemoteGlyphConfig, manager: Arc<dyn DiscardableHandleManager>) -> Self {
        let strike_cache = Arc::new(StrikeCache::with_policy(
            config.max_strikes,
            config.match_policy,
        ));
        Self {
            config,
            manager,
            strike_cache,
            typefaces: RwLock::new(HashMap::new()),
            next_font_id: AtomicU32::new(1),
        }
    }

    pub fn config(&self) -> &RemoteGlyphConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<dyn DiscardableHandleManager> {
        &self.manager
    }

    /// Cache the transport attaches received strikes to
    pub fn strike_cache(&self) -> &Arc<StrikeCache> {
        &self.strike_cache
    }

    /// Register a remote typeface, or return the one already registered
    /// under the same remote id.
    pub fn add_typeface(&self, wire: WireTypeface) -> Arc<TypefaceProxy> {
        let mut typefaces = self
            .typefaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = typefaces.get(&wire.typeface_id) {
            return Arc::clone(existing);
        }

        let font_id = FontId(self.next_font_id.fetch_add(1, Ordering::Relaxed));
        let typeface = Arc::new(
            TypefaceProxy::new(
                font_id,
                &wire,
                Arc::clone(&self.manager),
                Arc::clone(&self.strike_cache),
            )
            .with_logging(self.config.logging)
            .with_scratch_budget(self.config.scratch_budget),
        );
        tracing::info!(
            "Registered remote typeface {} as font {} ({} glyphs)",
            wire.typeface_id,
            font_id.0,
            wire.glyph_count
        );
        typefaces.insert(wire.typeface_id, Arc::clone(&typeface));
        typeface
    }

    /// Look up a registered typeface by remote id
    pub fn typeface(&self, remote_id: u32) -> Result<Arc<TypefaceProxy>> {
        self.typefaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&remote_id)
            .cloned()
            .ok_or(RemoteError::UnknownTypeface(remote_id))
    }

    pub fn typeface_count(&self) -> usize {
        self.typefaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Create a scaler context for a registered typeface
    pub fn create_scaler_context(
        &self,
        remote_id: u32,
        rec: ScalerRec,
        effects: ScalerEffects,
    ) -> Result<Box<dyn ScalerContext>> {
        let typeface = self.typeface(remote_id)?;
        Ok(typeface.create_scaler_context(rec, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miss::DiscardableLedger;

    fn client() -> StrikeClient {
        StrikeClient::new(RemoteGlyphConfig::default(), Arc::new(DiscardableLedger::new()))
    }

    #[test]
    fn test_add_typeface_assigns_ids() {
        let client = client();
        let a = client.add_typeface(WireTypeface::new(100, 10));
        let b = client.add_typeface(WireTypeface::new(200, 10));
        assert_ne!(a.font_id(), b.font_id());
        assert_eq!(client.typeface_count(), 2);
    }

    #[test]
    fn test_add_typeface_idempotent() {
        let client = client();
        let a = client.add_typeface(WireTypeface::new(100, 10));
        let again = client.add_typeface(WireTypeface::new(100, 99));
        assert!(Arc::ptr_eq(&a, &again));
        assert_eq!(again.glyph_count(), 10);
    }

    #[test]
    fn test_unknown_typeface() {
        let client = client();
        assert!(matches!(client.typeface(5), Err(RemoteError::UnknownTypeface(5))));
        assert!(client
            .create_scaler_context(5, ScalerRec::new(FontId(0), 12.0), ScalerEffects::default())
            .is_err());
    }

    #[test]
    fn test_config_flows_to_typefaces() {
        let config = RemoteGlyphConfig::new().with_logging(true).with_scratch_budget(256);
        let client = StrikeClient::new(config, Arc::new(DiscardableLedger::new()));
        let tf = client.add_typeface(WireTypeface::new(1, 1));
        assert!(tf.is_logging());
        assert_eq!(tf.scratch_budget(), 256);
        assert!(Arc::ptr_eq(tf.strike_cache(), client.strike_cache()));
    }
}
