//! Relational persistence for the catalog, responses, paths, phases and sessions

mod error;
mod migrations;
mod phases;
mod sqlite;
mod types;

pub use error::StoreError;
pub use sqlite::SqliteStore;
pub use types::{StoredResponse, User, UserSession};

use crate::catalog::{PrePopulationRule, Question};
use crate::path::AssessmentPath;
use crate::phase::{EntrepreneurProfile, Phase, PhaseAssessment, PhaseResponse, PhaseResponseInput};

/// Storage for catalog data and per-user assessment state
pub trait AssessmentStore: Send + Sync {
    /// Insert a question unless its id exists. Returns true if inserted.
    fn insert_question(&self, question: &Question) -> Result<bool, StoreError>;
    /// Insert a rule unless its name exists. Returns true if inserted.
    fn insert_rule(&self, rule: &PrePopulationRule) -> Result<bool, StoreError>;
    /// All questions in catalog order
    fn list_questions(&self) -> Result<Vec<Question>, StoreError>;
    fn get_question(&self, question_id: &str) -> Result<Option<Question>, StoreError>;
    fn list_active_rules(&self) -> Result<Vec<PrePopulationRule>, StoreError>;

    fn get_responses(&self, user_id: i64) -> Result<Vec<StoredResponse>, StoreError>;
    fn get_path(&self, user_id: i64) -> Result<Option<AssessmentPath>, StoreError>;

    /// Read-modify-write of a user's path in one immediate transaction.
    ///
    /// `initial` is inserted if the user has no path yet. The stored path is
    /// then re-read and handed to `update`; when it returns true the path and
    /// `responses` are written before commit. An error from `update` or the
    /// store rolls everything back. Returns the path as stored.
    fn modify_path<E, F>(
        &self,
        initial: &AssessmentPath,
        responses: &[StoredResponse],
        update: F,
    ) -> Result<AssessmentPath, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut AssessmentPath) -> Result<bool, E>;
}

/// Storage for multi-phase assessments and entrepreneur profiles
pub trait PhaseStore: Send + Sync {
    /// Every phase run of a user, oldest first
    fn list_assessments(&self, user_id: i64) -> Result<Vec<PhaseAssessment>, StoreError>;
    /// Insert a run of `phase` unless the user has one. Returns the stored run.
    fn start_assessment(
        &self,
        user_id: i64,
        phase: Phase,
        now: i64,
    ) -> Result<PhaseAssessment, StoreError>;
    /// A run, only if `user_id` owns it
    fn get_assessment(
        &self,
        user_id: i64,
        assessment_id: i64,
    ) -> Result<Option<PhaseAssessment>, StoreError>;
    /// Read-modify-write of a run in one transaction. `None` if the user does
    /// not own it.
    fn modify_assessment<F>(
        &self,
        user_id: i64,
        assessment_id: i64,
        update: F,
    ) -> Result<Option<PhaseAssessment>, StoreError>
    where
        F: FnOnce(&mut PhaseAssessment);
    /// Upsert keyed by (assessment, question); `section_id` and `created_at`
    /// of an existing answer are kept.
    fn save_phase_response(
        &self,
        assessment_id: i64,
        input: &PhaseResponseInput,
        now: i64,
    ) -> Result<(), StoreError>;
    fn list_phase_responses(&self, assessment_id: i64) -> Result<Vec<PhaseResponse>, StoreError>;
    /// Read-modify-write of a user's profile, creating a blank one first if
    /// absent. The profile is written back only when `update` returns true.
    fn modify_profile<F>(
        &self,
        user_id: i64,
        now: i64,
        update: F,
    ) -> Result<EntrepreneurProfile, StoreError>
    where
        F: FnOnce(&mut EntrepreneurProfile) -> bool;
}

/// Storage for users and bearer sessions
pub trait IdentityStore: Send + Sync {
    fn create_user(&self, username: &str, email: &str) -> Result<User, StoreError>;
    fn get_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn create_session(&self, session: &UserSession) -> Result<(), StoreError>;
    fn get_session(&self, token: &str) -> Result<Option<UserSession>, StoreError>;
    /// Mark a session inactive. Returns false if the token was unknown.
    fn deactivate_session(&self, token: &str) -> Result<bool, StoreError>;
    fn touch_last_login(&self, user_id: i64, at: i64) -> Result<(), StoreError>;
}
