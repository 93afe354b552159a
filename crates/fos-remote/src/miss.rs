//! Cache-miss reporting
//!
//! Scaler proxies report every glyph request they could not satisfy. The
//! manager only does bounded bookkeeping here; shipping the requests to the
//! process that owns the fonts is the transport's job.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// What a scaler proxy could not provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheMissKind {
    GlyphMetrics,
    GlyphImage,
    GlyphPath,
    FontMetrics,
}

impl CacheMissKind {
    pub const ALL: [CacheMissKind; 4] = [
        CacheMissKind::GlyphMetrics,
        CacheMissKind::GlyphImage,
        CacheMissKind::GlyphPath,
        CacheMissKind::FontMetrics,
    ];

    fn index(self) -> usize {
        match self {
            Self::GlyphMetrics => 0,
            Self::GlyphImage => 1,
            Self::GlyphPath => 2,
            Self::FontMetrics => 3,
        }
    }
}

impl fmt::Display for CacheMissKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GlyphMetrics => "glyph-metrics",
            Self::GlyphImage => "glyph-image",
            Self::GlyphPath => "glyph-path",
            Self::FontMetrics => "font-metrics",
        };
        f.write_str(name)
    }
}

/// Id of a discardable memory handle shared with the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub u32);

/// Tracks discardable handles and receives cache misses.
///
/// Implementations are shared between threads and must return quickly.
pub trait DiscardableHandleManager: Send + Sync + fmt::Debug {
    /// Release the memory behind `handle`; false if it cannot be released
    fn delete_handle(&self, handle: HandleId) -> bool;

    fn is_handle_deleted(&self, handle: HandleId) -> bool;

    /// Record one unsatisfied request
    fn notify_cache_miss(&self, kind: CacheMissKind);
}

/// Miss counts per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissCounts {
    pub glyph_metrics: u64,
    pub glyph_image: u64,
    pub glyph_path: u64,
    pub font_metrics: u64,
}

impl MissCounts {
    pub fn get(&self, kind: CacheMissKind) -> u64 {
        match kind {
            CacheMissKind::GlyphMetrics => self.glyph_metrics,
            CacheMissKind::GlyphImage => self.glyph_image,
            CacheMissKind::GlyphPath => self.glyph_path,
            CacheMissKind::FontMetrics => self.font_metrics,
        }
    }

    pub fn total(&self) -> u64 {
        self.glyph_metrics + self.glyph_image + self.glyph_path + self.font_metrics
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn from_fn(mut f: impl FnMut(CacheMissKind) -> u64) -> Self {
        Self {
            glyph_metrics: f(CacheMissKind::GlyphMetrics),
            glyph_image: f(CacheMissKind::GlyphImage),
            glyph_path: f(CacheMissKind::GlyphPath),
            font_metrics: f(CacheMissKind::FontMetrics),
        }
    }
}

/// In-process manager: atomic miss counters and a deleted-handle set
#[derive(Debug, Default)]
pub struct DiscardableLedger {
    /// Lifetime totals
    totals: [AtomicU64; 4],
    /// Since the last `take_pending`
    pending: [AtomicU64; 4],
    deleted: Mutex<HashSet<HandleId>>,
}

impl DiscardableLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime miss counts
    pub fn misses(&self) -> MissCounts {
        MissCounts::from_fn(|kind| self.totals[kind.index()].load(Ordering::Relaxed))
    }

    /// Misses since the previous call, resetting the pending counters
    pub fn take_pending(&self) -> MissCounts {
        MissCounts::from_fn(|kind| self.pending[kind.index()].swap(0, Ordering::AcqRel))
    }

    /// Number of handles released so far
    pub fn deleted_count(&self) -> usize {
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl DiscardableHandleManager for DiscardableLedger {
    fn delete_handle(&self, handle: HandleId) -> bool {
        let newly = self
            .deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle);
        if newly {
            tracing::trace!("Deleted discardable handle {}", handle.0);
        }
        true
    }

    fn is_handle_deleted(&self, handle: HandleId) -> bool {
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&handle)
    }

    fn notify_cache_miss(&self, kind: CacheMissKind) {
        self.totals[kind.index()].fetch_add(1, Ordering::Relaxed);
        self.pending[kind.index()].fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counts_per_kind() {
        let ledger = DiscardableLedger::new();
        ledger.notify_cache_miss(CacheMissKind::GlyphMetrics);
        ledger.notify_cache_miss(CacheMissKind::GlyphMetrics);
        ledger.notify_cache_miss(CacheMissKind::FontMetrics);

        let misses = ledger.misses();
        assert_eq!(misses.glyph_metrics, 2);
        assert_eq!(misses.font_metrics, 1);
        assert_eq!(misses.get(CacheMissKind::GlyphImage), 0);
        assert_eq!(misses.total(), 3);
    }

    #[test]
    fn test_take_pending_drains() {
        let ledger = DiscardableLedger::new();
        ledger.notify_cache_miss(CacheMissKind::GlyphPath);

        let pending = ledger.take_pending();
        assert_eq!(pending.glyph_path, 1);
        assert!(ledger.take_pending().is_empty());
        // Totals are not drained
        assert_eq!(ledger.misses().glyph_path, 1);
    }

    #[test]
    fn test_handles() {
        let ledger = DiscardableLedger::new();
        assert!(!ledger.is_handle_deleted(HandleId(3)));
        assert!(ledger.delete_handle(HandleId(3)));
        assert!(ledger.delete_handle(HandleId(3)));
        assert!(ledger.is_handle_deleted(HandleId(3)));
        assert_eq!(ledger.deleted_count(), 1);
    }

    #[test]
    fn test_concurrent_notify() {
        let ledger = Arc::new(DiscardableLedger::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for _ in 0..250 {
                        ledger.notify_cache_miss(CacheMissKind::GlyphImage);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ledger.misses().glyph_image, 1000);
    }

    #[test]
    fn test_kind_display() {
        let names: Vec<String> = CacheMissKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, ["glyph-metrics", "glyph-image", "glyph-path", "font-metrics"]);
    }
}
