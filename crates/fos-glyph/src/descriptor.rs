//! Scaler recs and descriptors
//!
//! A [`ScalerRec`] holds everything that changes how glyphs of one font are
//! scaled. Together with [`ScalerEffects`] it produces a [`ScalerDescriptor`],
//! the key strikes are stored and matched under.

use std::fmt;
use std::hash::{Hash, Hasher};

use tiny_skia::Transform;

use crate::font::FontId;
use crate::glyph::MaskFormat;

/// How strongly outlines are fitted to the pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HintingMode {
    /// Outlines as designed, advances unrounded
    None,
    Light,
    #[default]
    Normal,
    Full,
}

impl HintingMode {
    fn word(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Light => 1,
            Self::Normal => 2,
            Self::Full => 3,
        }
    }
}

/// Edge smoothing requested by the caller; selects the rec's mask format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntialiasMode {
    None,
    #[default]
    Grayscale,
    /// LCD coverage
    Subpixel,
}

impl AntialiasMode {
    /// Mask format a scaler produces in this mode
    pub fn mask_format(&self) -> MaskFormat {
        match self {
            Self::None => MaskFormat::Bw,
            Self::Grayscale => MaskFormat::A8,
            Self::Subpixel => MaskFormat::Lcd16,
        }
    }
}

/// Rendering flags of a rec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RecFlags {
    pub subpixel_positioning: bool,
    pub linear_metrics: bool,
    pub embolden: bool,
    pub vertical: bool,
}

impl RecFlags {
    fn word(&self) -> u32 {
        (self.subpixel_positioning as u32)
            | (self.linear_metrics as u32) << 1
            | (self.embolden as u32) << 2
            | (self.vertical as u32) << 3
    }
}

/// Identity of a path effect or mask filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u32);

/// Effects applied on top of the scaled outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScalerEffects {
    pub path_effect: Option<EffectId>,
    pub mask_filter: Option<EffectId>,
}

impl ScalerEffects {
    pub fn is_empty(&self) -> bool {
        self.path_effect.is_none() && self.mask_filter.is_none()
    }
}

/// Scaling parameters for one font configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalerRec {
    pub font_id: FontId,
    /// Text size in points
    pub text_size: f32,
    /// Horizontal pre-scale (condensed/expanded)
    pub pre_scale_x: f32,
    /// Horizontal pre-skew (synthetic oblique)
    pub pre_skew_x: f32,
    /// Post matrix as [xx, xy, yx, yy]
    pub post_2x2: [f32; 4],
    pub hinting: HintingMode,
    pub mask_format: MaskFormat,
    pub flags: RecFlags,
}

impl ScalerRec {
    /// Identity rec for `font_id` at `text_size`
    pub fn new(font_id: FontId, text_size: f32) -> Self {
        Self {
            font_id,
            text_size,
            pre_scale_x: 1.0,
            pre_skew_x: 0.0,
            post_2x2: [1.0, 0.0, 0.0, 1.0],
            hinting: HintingMode::default(),
            mask_format: MaskFormat::A8,
            flags: RecFlags::default(),
        }
    }

    /// Take the 2x2 part of `transform` as the post matrix
    pub fn with_matrix(mut self, transform: Transform) -> Self {
        self.post_2x2 = [transform.sx, transform.kx, transform.ky, transform.sy];
        self
    }

    pub fn with_pre_scale_x(mut self, scale: f32) -> Self {
        self.pre_scale_x = scale;
        self
    }

    pub fn with_pre_skew_x(mut self, skew: f32) -> Self {
        self.pre_skew_x = skew;
        self
    }

    pub fn with_hinting(mut self, hinting: HintingMode) -> Self {
        self.hinting = hinting;
        self
    }

    pub fn with_antialias(mut self, mode: AntialiasMode) -> Self {
        self.mask_format = mode.mask_format();
        self
    }

    pub fn with_flags(mut self, flags: RecFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Post matrix as a transform
    pub fn matrix(&self) -> Transform {
        let [xx, xy, yx, yy] = self.post_2x2;
        Transform::from_row(xx, yx, xy, yy, 0.0, 0.0)
    }

    /// Full em-space to device transform (size, pre-scale/skew, post matrix)
    pub fn device_transform(&self) -> Transform {
        let size = self.text_size;
        let pre = Transform::from_row(
            size * self.pre_scale_x,
            0.0,
            size * self.pre_skew_x,
            size,
            0.0,
            0.0,
        );
        self.matrix().pre_concat(pre)
    }

    /// Alias kept for log output, matches the `Display` impl
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ScalerRec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [xx, xy, yx, yy] = self.post_2x2;
        write!(
            f,
            "font_id: {} text_size: {} pre_scale_x: {} pre_skew_x: {} matrix: [{} {} {} {}] \
             hinting: {:?} mask: {:?} flags: {:#x}",
            self.font_id.0,
            self.text_size,
            self.pre_scale_x,
            self.pre_skew_x,
            xx,
            xy,
            yx,
            yy,
            self.hinting,
            self.mask_format,
            self.flags.word(),
        )
    }
}

const DESCRIPTOR_WORDS: usize = 15;

/// Canonical key for a (rec, effects) pair.
///
/// Floats compare by bit pattern (with -0.0 folded into 0.0) so `Eq` and
/// `Hash` agree.
#[derive(Debug, Clone, Copy)]
pub struct ScalerDescriptor {
    rec: ScalerRec,
    effects: ScalerEffects,
    words: [u32; DESCRIPTOR_WORDS],
    checksum: u32,
}

impl ScalerDescriptor {
    /// Build the descriptor for `rec` and `effects`
    pub fn new(rec: &ScalerRec, effects: &ScalerEffects) -> Self {
        let [xx, xy, yx, yy] = rec.post_2x2;
        let words = [
            rec.font_id.0,
            float_word(rec.text_size),
            float_word(rec.pre_scale_x),
            float_word(rec.pre_skew_x),
            float_word(xx),
            float_word(xy),
            float_word(yx),
            float_word(yy),
            rec.hinting.word(),
            mask_word(rec.mask_format),
            rec.flags.word(),
            effects.path_effect.is_some() as u32,
            effects.path_effect.map_or(0, |e| e.0),
            effects.mask_filter.is_some() as u32,
            effects.mask_filter.map_or(0, |e| e.0),
        ];

        Self {
            rec: *rec,
            effects: *effects,
            words,
            checksum: checksum(&words),
        }
    }

    pub fn rec(&self) -> &ScalerRec {
        &self.rec
    }

    pub fn effects(&self) -> &ScalerEffects {
        &self.effects
    }

    pub fn font_id(&self) -> FontId {
        self.rec.font_id
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

impl PartialEq for ScalerDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum && self.words == other.words
    }
}

impl Eq for ScalerDescriptor {}

impl Hash for ScalerDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
        self.words.hash(state);
    }
}

impl fmt::Display for ScalerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:08x}] {}", self.checksum, self.rec)
    }
}

fn float_word(v: f32) -> u32 {
    (v + 0.0).to_bits()
}

fn mask_word(format: MaskFormat) -> u32 {
    match format {
        MaskFormat::Unknown => 0,
        MaskFormat::Empty => 1,
        MaskFormat::Bw => 2,
        MaskFormat::A8 => 3,
        MaskFormat::Lcd16 => 4,
        MaskFormat::Argb32 => 5,
    }
}

/// FNV-1a over the descriptor words
fn checksum(words: &[u32]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for word in words {
        for byte in word.to_le_bytes() {
            hash ^= byte as u32;
            hash = hash.wrapping_mul(0x0100_0193);
        }
    }
    hash
}
