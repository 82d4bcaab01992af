//! compass-core: Core library for the compass adaptive assessment backend
//!
//! This crate provides the building blocks behind the compass server and CLI:
//!
//! - **Expressions** - [`expr`] parses and evaluates catalog conditions against known answers
//! - **Catalog** - [`CatalogDocument`] with questions and pre-population rules
//! - **Personas** - [`classify`] picks an assessment path from known answers
//! - **Engine** - [`AdaptiveEngine`] selects questions, records answers and reports progress
//! - **Phases** - [`PhaseService`] tracks the seven assessment phases and the entrepreneur profile
//! - **Store** - [`SqliteStore`] persists catalog, responses, paths, phases and sessions
//! - **Auth** - [`SessionManager`] issues and resolves bearer tokens
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use compass_core::{AdaptiveEngine, CatalogDocument, SqliteStore};
//! use compass_core::expr::Responses;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("compass.db")?);
//!     let engine = AdaptiveEngine::new(store);
//!     engine.load_catalog(&CatalogDocument::builtin()?)?;
//!
//!     let started = engine.start(1, &Responses::new())?;
//!     println!("Path: {}", started.path_type);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod expr;
pub mod path;
pub mod persona;
pub mod phase;
pub mod store;

pub use auth::{AuthContext, AuthError, Identity, SessionManager};
pub use catalog::{CatalogDocument, CatalogError, PrePopulationRule, Priority, Question};
pub use engine::{
    AdaptiveEngine, AssessmentAnalytics, EngineConfig, EngineError, PathUpdate,
    PrePopulationOpportunity, ProgressSummary, QuestionBatch, QuestionPrompt, RecordedResponse,
    ResponseSubmission, SeedReport, StartedAssessment,
};
pub use error::CompassError;
pub use path::{AssessmentPath, PathStatus};
pub use persona::{Classification, PathConfig, Persona, classify};
pub use phase::{
    EntrepreneurProfile, Phase, PhaseAssessment, PhaseError, PhaseOverview, PhaseResponse,
    PhaseResponseInput, PhaseResponses, PhaseService, ProfileUpdate, ProgressUpdate,
};
pub use store::{
    AssessmentStore, IdentityStore, PhaseStore, SqliteStore, StoreError, StoredResponse, User,
    UserSession,
};
