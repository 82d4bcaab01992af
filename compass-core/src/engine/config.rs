//! Engine tuning knobs

use serde::{Deserialize, Serialize};

/// Default number of questions returned per batch
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default confidence attached to question-logic suggestions
pub const DEFAULT_PREPOPULATION_CONFIDENCE: f64 = 0.8;

/// Minutes a skipped or pre-populated question is assumed to save
pub const MINUTES_SAVED_PER_QUESTION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub batch_size: usize,
    pub prepopulation_confidence: f64,
    pub minutes_saved_per_question: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            prepopulation_confidence: DEFAULT_PREPOPULATION_CONFIDENCE,
            minutes_saved_per_question: MINUTES_SAVED_PER_QUESTION,
        }
    }
}

impl EngineConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_prepopulation_confidence(mut self, confidence: f64) -> Self {
        self.prepopulation_confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.prepopulation_confidence, 0.8);
        assert_eq!(config.minutes_saved_per_question, 2);
    }

    #[test]
    fn test_builders_clamp() {
        let config = EngineConfig::default()
            .with_batch_size(0)
            .with_prepopulation_confidence(1.5);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.prepopulation_confidence, 1.0);
    }
}
