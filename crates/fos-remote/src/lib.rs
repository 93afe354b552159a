//! fOS Remote - Glyph scaling without the font program
//!
//! Sandboxed renderers cannot open font files. They get glyph data shipped
//! from a trusted process instead, and use the types in this crate to stand
//! in for a real scaler in the meantime:
//! - `ScalerContextProxy` answers glyph requests from resident strikes
//!   (desperation search) and reports every miss
//! - `DiscardableHandleManager` receives those misses; `DiscardableLedger`
//!   is the in-process implementation
//! - `TypefaceProxy` / `StrikeClient` register remote typefaces and hand out
//!   proxies for them
//!
//! # Example
//! ```rust,ignore
//! use fos_remote::{RemoteGlyphConfig, StrikeClient, WireTypeface, DiscardableLedger};
//!
//! let client = StrikeClient::new(RemoteGlyphConfig::default(), Arc::new(DiscardableLedger::new()));
//! let typeface = client.add_typeface(WireTypeface::new(42, 512));
//! let mut ctx = client.create_scaler_context(42, ScalerRec::new(typeface.font_id(), 12.0), Default::default())?;
//! ctx.generate_metrics(&mut glyph);
//! ```

mod client;
mod config;
mod miss;
mod proxy;
mod typeface;

pub use client::StrikeClient;
pub use config::RemoteGlyphConfig;
pub use miss::{CacheMissKind, DiscardableHandleManager, DiscardableLedger, HandleId, MissCounts};
pub use proxy::ScalerContextProxy;
pub use typeface::{TypefaceProxy, WireTypeface};

/// Remote glyph error types
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Unknown remote typeface: {0}")]
    UnknownTypeface(u32),

    #[error(transparent)]
    Glyph(#[from] fos_glyph::GlyphError),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
