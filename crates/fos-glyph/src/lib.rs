//! fOS Glyph - Scaler contexts and strike cache
//!
//! This crate provides the glyph side of the fOS text pipeline:
//! - Glyph records, packed glyph ids and font metrics
//! - Scaler recs, effects and the descriptors built from them
//! - The `ScalerContext` / `Typeface` contract and the file-backed scaler
//! - Resident strikes and the desperation search over them
//! - A per-context scratch arena for substitute glyph data

pub mod arena;
pub mod descriptor;
pub mod font;
pub mod glyph;
pub mod scaler;
pub mod strike;

pub use arena::ScratchArena;
pub use descriptor::{
    AntialiasMode, EffectId, HintingMode, RecFlags, ScalerDescriptor, ScalerEffects, ScalerRec,
};
pub use font::{FontId, FontStyle, FontTypeface, FontWeight};
pub use glyph::{FontMetrics, FontMetricsFlags, Glyph, GlyphMetrics, MaskFormat, PackedGlyphId};
pub use scaler::{FontScalerContext, ScalerContext, Typeface};
pub use strike::{MatchPolicy, Strike, StrikeCache, StrikeCacheStats};

/// Re-exported so callers can name glyph ids and paths without extra deps.
pub use tiny_skia::{Path, PathBuilder, Transform};
pub use ttf_parser::GlyphId;

/// Glyph pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum GlyphError {
    #[error("{operation} must not be called on a {context} scaler context")]
    ContractViolation {
        operation: &'static str,
        context: &'static str,
    },

    #[error("Failed to parse font: {0}")]
    FontParsing(String),

    #[error("Image buffer too small: need {needed} bytes, got {actual}")]
    ImageBufferTooSmall { needed: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, GlyphError>;
