//! File-backed typeface

use std::sync::Arc;

use ttf_parser::Face;

use super::{FontId, FontStyle, FontWeight};
use crate::descriptor::{ScalerEffects, ScalerRec};
use crate::scaler::{FontScalerContext, ScalerContext, Typeface};
use crate::{GlyphError, Result};

/// Typeface backed by font file data held in memory
#[derive(Debug, Clone)]
pub struct FontTypeface {
    id: FontId,
    data: Arc<[u8]>,
    index: u32,
    style: FontStyle,
    weight: FontWeight,
}

impl FontTypeface {
    /// Validate `data` and read the face's style
    pub fn from_data(id: FontId, data: impl Into<Arc<[u8]>>, index: u32) -> Result<Self> {
        let data = data.into();
        let (style, weight) = {
            let face = parse_face(&data, index)?;
            let style = if face.is_italic() {
                FontStyle::Italic
            } else if face.is_oblique() {
                FontStyle::Oblique
            } else {
                FontStyle::Normal
            };
            (style, FontWeight::from(face.weight().to_number()))
        };

        tracing::debug!("Loaded typeface {} ({} bytes, {:?} {:?})", id.0, data.len(), style, weight);

        Ok(Self {
            id,
            data,
            index,
            style,
            weight,
        })
    }

    /// Parse the face; cheap, tables are read lazily
    pub fn face(&self) -> Result<Face<'_>> {
        parse_face(&self.data, self.index)
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }
}

impl Typeface for FontTypeface {
    fn font_id(&self) -> FontId {
        self.id
    }

    fn style(&self) -> FontStyle {
        self.style
    }

    fn create_scaler_context(
        self: Arc<Self>,
        rec: ScalerRec,
        effects: ScalerEffects,
    ) -> Box<dyn ScalerContext> {
        let rec = ScalerRec {
            font_id: self.id,
            ..rec
        };
        Box::new(FontScalerContext::new(self, rec, effects))
    }
}

fn parse_face(data: &[u8], index: u32) -> Result<Face<'_>> {
    Face::parse(data, index).map_err(|e| GlyphError::FontParsing(e.to_string()))
}
