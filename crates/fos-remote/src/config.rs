//! Remote glyph configuration

use fos_glyph::arena::DEFAULT_BUDGET;
use fos_glyph::strike::DEFAULT_MAX_STRIKES;
use fos_glyph::MatchPolicy;
use serde::Deserialize;

/// Settings for a [`StrikeClient`](crate::StrikeClient)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteGlyphConfig {
    /// Log every cache miss at debug level
    pub logging: bool,
    /// Resident strike budget
    pub max_strikes: usize,
    /// Scratch arena budget per scaler proxy, in bytes
    pub scratch_budget: usize,
    /// Which resident strikes may stand in for a request
    pub match_policy: MatchPolicy,
}

impl Default for RemoteGlyphConfig {
    fn default() -> Self {
        Self {
            logging: false,
            max_strikes: DEFAULT_MAX_STRIKES,
            scratch_budget: DEFAULT_BUDGET,
            match_policy: MatchPolicy::default(),
        }
    }
}

impl RemoteGlyphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_max_strikes(mut self, max: usize) -> Self {
        self.max_strikes = max;
        self
    }

    pub fn with_scratch_budget(mut self, budget: usize) -> Self {
        self.scratch_budget = budget;
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteError;

    #[test]
    fn test_defaults() {
        let config = RemoteGlyphConfig::default();
        assert!(!config.logging);
        assert_eq!(config.max_strikes, DEFAULT_MAX_STRIKES);
        assert_eq!(config.scratch_budget, DEFAULT_BUDGET);
        assert_eq!(config.match_policy, MatchPolicy::default());
    }

    #[test]
    fn test_from_json_partial() {
        let config = RemoteGlyphConfig::from_json(
            r#"{"logging": true, "match_policy": {"transform_tolerance": 0.1}}"#,
        )
        .unwrap();
        assert!(config.logging);
        assert_eq!(config.max_strikes, DEFAULT_MAX_STRIKES);
        assert_eq!(config.match_policy.transform_tolerance, 0.1);
        assert!(config.match_policy.match_effects);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = RemoteGlyphConfig::from_json(r#"{"max_strikes": "many"}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Config(_)));
    }

    #[test]
    fn test_builder() {
        let config = RemoteGlyphConfig::new()
            .with_logging(true)
            .with_max_strikes(4)
            .with_scratch_budget(128)
            .with_match_policy(MatchPolicy::exact());
        assert_eq!(config.max_strikes, 4);
        assert_eq!(config.scratch_budget, 128);
        assert_eq!(config.match_policy, MatchPolicy::exact());
    }
}
