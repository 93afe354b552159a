//! Scratch Arena
//!
//! Per-context store for substitute glyph data. Image bytes copied out of
//! another strike are owned here so they stay valid after the source strike
//! is purged.

use std::sync::Arc;

/// Default retained bytes before the arena recycles (64KB)
pub const DEFAULT_BUDGET: usize = 64 * 1024;

/// Byte arena for copied glyph images
#[derive(Debug)]
pub struct ScratchArena {
    blocks: Vec<Arc<[u8]>>,
    used: usize,
    budget: usize,
}

impl ScratchArena {
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_BUDGET)
    }

    pub fn with_budget(budget: usize) -> Self {
        Self {
            blocks: Vec::new(),
            used: 0,
            budget,
        }
    }

    /// Copy `bytes` into the arena.
    ///
    /// When the budget would be exceeded the arena drops its own references
    /// first; blocks already handed out stay alive through their `Arc`.
    pub fn alloc_bytes(&mut self, bytes: &[u8]) -> Arc<[u8]> {
        if self.used + bytes.len() > self.budget {
            self.reset();
        }

        let block: Arc<[u8]> = Arc::from(bytes);
        self.used += bytes.len();
        self.blocks.push(Arc::clone(&block));
        block
    }

    /// Release all retained blocks
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.used = 0;
    }

    /// Bytes currently retained
    pub fn bytes_used(&self) -> usize {
        self.used
    }

    /// Number of retained blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}
