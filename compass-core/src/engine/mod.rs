//! Adaptive assessment engine
//!
//! [`AdaptiveEngine`] ties the catalog, the persona classifier and the
//! store together. Every operation is a single unit of work against the
//! store, keyed by user id; the engine keeps no per-user state of its own.

mod analytics;
mod config;
mod error;
mod prepopulation;
mod service;
mod types;

pub use config::{
    DEFAULT_BATCH_SIZE, DEFAULT_PREPOPULATION_CONFIDENCE, EngineConfig,
    MINUTES_SAVED_PER_QUESTION,
};
pub use error::EngineError;
pub use prepopulation::QUESTION_LOGIC_SOURCE;
pub use service::AdaptiveEngine;
pub use types::{
    AssessmentAnalytics, PathUpdate, PrePopulationOpportunity, ProgressSummary, QuestionBatch,
    QuestionPrompt, RecordedResponse, ResponseSubmission, SeedReport, StartedAssessment,
};
