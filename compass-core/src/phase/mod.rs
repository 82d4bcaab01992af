//! Multi-phase assessments and the entrepreneur profile
//!
//! Alongside the adaptive questionnaire, a user works through seven fixed
//! phases. Each phase run stores free-form answers grouped by section plus a
//! client-reported progress figure. Results are consolidated into one
//! [`EntrepreneurProfile`] per user.

mod error;
mod service;
mod types;

pub use error::PhaseError;
pub use service::PhaseService;
pub use types::{
    EntrepreneurProfile, Phase, PhaseAssessment, PhaseOverview, PhaseResponse,
    PhaseResponseInput, PhaseResponses, ProfileSections, ProfileUpdate, ProgressUpdate,
};
