//! Strike cache
//!
//! A strike holds the glyphs computed for one exact scaler configuration.
//! The cache keeps resident strikes in most-recently-attached order; that is
//! also the order desperation searches walk them in.

mod policy;
mod search;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ttf_parser::GlyphId;

use crate::descriptor::ScalerDescriptor;
use crate::glyph::{Glyph, PackedGlyphId, SUBPIXEL_ROUNDING};

pub use policy::MatchPolicy;

/// Default strike budget
pub const DEFAULT_MAX_STRIKES: usize = 256;

/// Glyphs for one scaler configuration
#[derive(Debug)]
pub struct Strike {
    descriptor: ScalerDescriptor,
    glyphs: RwLock<HashMap<PackedGlyphId, Glyph>>,
}

impl Strike {
    pub fn new(descriptor: ScalerDescriptor) -> Self {
        Self {
            descriptor,
            glyphs: RwLock::new(HashMap::new()),
        }
    }

    pub fn descriptor(&self) -> &ScalerDescriptor {
        &self.descriptor
    }

    /// Store (or replace) a glyph
    pub fn insert_glyph(&self, glyph: Glyph) {
        write(&self.glyphs).insert(glyph.id(), glyph);
    }

    /// Exact lookup, subpixel position included
    pub fn glyph(&self, id: PackedGlyphId) -> Option<Glyph> {
        read(&self.glyphs).get(&id).cloned()
    }

    /// True if the glyph is cached at any subpixel position
    pub fn contains_any_subpixel(&self, glyph: GlyphId) -> bool {
        let glyphs = read(&self.glyphs);
        find_any_subpixel(&glyphs, glyph).is_some()
    }

    /// Number of cached glyphs
    pub fn len(&self) -> usize {
        read(&self.glyphs).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.glyphs).is_empty()
    }

    /// Bytes held by glyph images
    pub fn image_bytes(&self) -> usize {
        read(&self.glyphs)
            .values()
            .filter_map(|g| g.image.as_ref().map(|image| image.len()))
            .sum()
    }

    fn glyphs(&self) -> RwLockReadGuard<'_, HashMap<PackedGlyphId, Glyph>> {
        read(&self.glyphs)
    }
}

/// First cached subpixel variant of `glyph`, in (x, y) order
fn find_any_subpixel(glyphs: &HashMap<PackedGlyphId, Glyph>, glyph: GlyphId) -> Option<&Glyph> {
    (0..SUBPIXEL_ROUNDING)
        .flat_map(|sub_x| (0..SUBPIXEL_ROUNDING).map(move |sub_y| (sub_x, sub_y)))
        .find_map(|(sub_x, sub_y)| glyphs.get(&PackedGlyphId { glyph, sub_x, sub_y }))
}

/// First subpixel variant of `glyph` that carries an outline, in (x, y) order
fn find_any_subpixel_path(
    glyphs: &HashMap<PackedGlyphId, Glyph>,
    glyph: GlyphId,
) -> Option<&Arc<tiny_skia::Path>> {
    (0..SUBPIXEL_ROUNDING)
        .flat_map(|sub_x| (0..SUBPIXEL_ROUNDING).map(move |sub_y| (sub_x, sub_y)))
        .find_map(|(sub_x, sub_y)| {
            glyphs
                .get(&PackedGlyphId { glyph, sub_x, sub_y })
                .and_then(|g| g.path.as_ref())
        })
}

/// Cache of resident strikes
#[derive(Debug)]
pub struct StrikeCache {
    /// Most recently attached first
    strikes: RwLock<Vec<Arc<Strike>>>,
    max_strikes: usize,
    policy: MatchPolicy,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StrikeCache {
    /// Create a cache holding at most `max_strikes` strikes
    pub fn new(max_strikes: usize) -> Self {
        Self::with_policy(max_strikes, MatchPolicy::default())
    }

    pub fn with_policy(max_strikes: usize, policy: MatchPolicy) -> Self {
        Self {
            strikes: RwLock::new(Vec::new()),
            max_strikes: max_strikes.max(1),
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the strike for `descriptor`, creating it if needed.
    ///
    /// New strikes go to the front; the oldest are dropped past the budget.
    pub fn attach_strike(&self, descriptor: ScalerDescriptor) -> Arc<Strike> {
        let mut strikes = write(&self.strikes);

        if let Some(pos) = strikes.iter().position(|s| *s.descriptor() == descriptor) {
            let strike = strikes.remove(pos);
            strikes.insert(0, Arc::clone(&strike));
            return strike;
        }

        let strike = Arc::new(Strike::new(descriptor));
        strikes.insert(0, Arc::clone(&strike));

        while strikes.len() > self.max_strikes {
            if let Some(evicted) = strikes.pop() {
                tracing::debug!(
                    "Evicted strike {} ({} glyphs)",
                    evicted.descriptor(),
                    evicted.len()
                );
            }
        }

        strike
    }

    /// Exact lookup
    pub fn find_strike(&self, descriptor: &ScalerDescriptor) -> Option<Arc<Strike>> {
        let strikes = read(&self.strikes);
        match strikes.iter().find(|s| s.descriptor() == descriptor) {
            Some(strike) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(strike))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Number of resident strikes
    pub fn strike_count(&self) -> usize {
        read(&self.strikes).len()
    }

    /// Drop every strike; strikes still referenced elsewhere stay alive
    pub fn purge_all(&self) {
        let mut strikes = write(&self.strikes);
        tracing::debug!("Purging {} strikes", strikes.len());
        strikes.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> StrikeCacheStats {
        let strikes = read(&self.strikes);
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        StrikeCacheStats {
            strikes: strikes.len(),
            max_strikes: self.max_strikes,
            glyphs: strikes.iter().map(|s| s.len()).sum(),
            image_bytes: strikes.iter().map(|s| s.image_bytes()).sum(),
            hits,
            misses,
            hit_rate: if hits + misses > 0 {
                hits as f64 / (hits + misses) as f64
            } else {
                0.0
            },
        }
    }

    /// One line per resident strike
    #[cfg(any(debug_assertions, feature = "strike-dump"))]
    pub fn dump_lines(&self) -> Vec<String> {
        let strikes = read(&self.strikes);
        let mut lines = Vec::with_capacity(strikes.len() + 1);
        lines.push(format!(
            "StrikeCache: {} strikes (budget {})",
            strikes.len(),
            self.max_strikes
        ));
        for strike in strikes.iter() {
            lines.push(format!(
                "  {} glyphs: {} image bytes: {}",
                strike.descriptor(),
                strike.len(),
                strike.image_bytes()
            ));
        }
        lines
    }

    /// Log the resident strikes at debug level
    #[cfg(any(debug_assertions, feature = "strike-dump"))]
    pub fn dump(&self) {
        for line in self.dump_lines() {
            tracing::debug!("{}", line);
        }
    }
}

impl Default for StrikeCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STRIKES)
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct StrikeCacheStats {
    pub strikes: usize,
    pub max_strikes: usize,
    pub glyphs: usize,
    pub image_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
