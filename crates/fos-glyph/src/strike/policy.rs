//! Match policy for desperation searches
//!
//! Decides whether a resident strike is close enough to a requested
//! configuration to lend its glyph data. Font identity always has to match;
//! everything else is configurable.

use serde::Deserialize;

use crate::descriptor::ScalerDescriptor;

/// Acceptance predicate for substitute strikes
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Max relative text size difference (0.0 = equal sizes only)
    pub text_size_tolerance: f32,
    /// Max difference per pre-scale, pre-skew and 2x2 matrix component,
    /// relative to `max(|a|, |b|, 1)`
    pub transform_tolerance: f32,
    /// Require the same hinting mode
    pub match_hinting: bool,
    /// Require the same requested mask format
    pub match_mask_format: bool,
    /// Require the same path effect and mask filter
    pub match_effects: bool,
    /// Require the same rendering flags
    pub match_flags: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            text_size_tolerance: 0.0,
            transform_tolerance: 0.05,
            match_hinting: false,
            match_mask_format: false,
            match_effects: true,
            match_flags: false,
        }
    }
}

impl MatchPolicy {
    /// Only identical configurations match
    pub fn exact() -> Self {
        Self {
            text_size_tolerance: 0.0,
            transform_tolerance: 0.0,
            match_hinting: true,
            match_mask_format: true,
            match_effects: true,
            match_flags: true,
        }
    }

    /// Can `candidate`'s glyphs stand in for `target`'s?
    pub fn accepts(&self, target: &ScalerDescriptor, candidate: &ScalerDescriptor) -> bool {
        let (a, b) = (target.rec(), candidate.rec());

        if a.font_id != b.font_id {
            return false;
        }
        if !within(a.text_size, b.text_size, self.text_size_tolerance) {
            return false;
        }

        let tol = self.transform_tolerance;
        if !within(a.pre_scale_x, b.pre_scale_x, tol) || !within(a.pre_skew_x, b.pre_skew_x, tol) {
            return false;
        }
        if !a
            .post_2x2
            .iter()
            .zip(b.post_2x2.iter())
            .all(|(&x, &y)| within(x, y, tol))
        {
            return false;
        }

        if self.match_hinting && a.hinting != b.hinting {
            return false;
        }
        if self.match_mask_format && a.mask_format != b.mask_format {
            return false;
        }
        if self.match_flags && a.flags != b.flags {
            return false;
        }
        if self.match_effects && target.effects() != candidate.effects() {
            return false;
        }

        true
    }
}

fn within(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EffectId, HintingMode, ScalerEffects, ScalerRec};
    use crate::font::FontId;
    use tiny_skia::Transform;

    fn desc(rec: ScalerRec) -> ScalerDescriptor {
        ScalerDescriptor::new(&rec, &ScalerEffects::default())
    }

    #[test]
    fn test_transform_tolerant() {
        let policy = MatchPolicy::default();
        let identity = desc(ScalerRec::new(FontId(1), 12.0));
        let nudged = desc(ScalerRec::new(FontId(1), 12.0).with_matrix(Transform::from_scale(1.01, 1.01)));
        let rotated = desc(
            ScalerRec::new(FontId(1), 12.0).with_matrix(Transform::from_row(0.0, 1.0, -1.0, 0.0, 0.0, 0.0)),
        );

        assert!(policy.accepts(&nudged, &identity));
        assert!(!policy.accepts(&rotated, &identity));
    }

    #[test]
    fn test_font_identity_required() {
        let policy = MatchPolicy::default();
        let a = desc(ScalerRec::new(FontId(1), 12.0));
        let b = desc(ScalerRec::new(FontId(2), 12.0));
        assert!(!policy.accepts(&a, &b));
    }

    #[test]
    fn test_text_size() {
        let a = desc(ScalerRec::new(FontId(1), 12.0));
        let b = desc(ScalerRec::new(FontId(1), 12.5));
        assert!(!MatchPolicy::default().accepts(&a, &b));

        let loose = MatchPolicy {
            text_size_tolerance: 0.05,
            ..MatchPolicy::default()
        };
        assert!(loose.accepts(&a, &b));
    }

    #[test]
    fn test_hinting_only_when_asked() {
        let a = desc(ScalerRec::new(FontId(1), 12.0).with_hinting(HintingMode::None));
        let b = desc(ScalerRec::new(FontId(1), 12.0).with_hinting(HintingMode::Full));
        assert!(MatchPolicy::default().accepts(&a, &b));
        assert!(!MatchPolicy::exact().accepts(&a, &b));
    }

    #[test]
    fn test_effects() {
        let rec = ScalerRec::new(FontId(1), 12.0);
        let plain = ScalerDescriptor::new(&rec, &ScalerEffects::default());
        let blurred = ScalerDescriptor::new(
            &rec,
            &ScalerEffects {
                mask_filter: Some(EffectId(4)),
                ..Default::default()
            },
        );
        assert!(!MatchPolicy::default().accepts(&plain, &blurred));

        let ignore = MatchPolicy {
            match_effects: false,
            ..MatchPolicy::default()
        };
        assert!(ignore.accepts(&plain, &blurred));
    }

    #[test]
    fn test_exact_matches_itself() {
        let a = desc(ScalerRec::new(FontId(1), 12.0));
        assert!(MatchPolicy::exact().accepts(&a, &a));
    }

    #[test]
    fn test_deserialize_partial() {
        let policy: MatchPolicy = serde_json::from_str(r#"{"transform_tolerance": 0.2}"#).unwrap();
        assert_eq!(policy.transform_tolerance, 0.2);
        assert_eq!(policy.text_size_tolerance, 0.0);
        assert!(policy.match_effects);
    }
}
