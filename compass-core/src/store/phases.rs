//! SQLite implementation of the phase store

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::sqlite::{from_json, to_json};
use super::{PhaseStore, SqliteStore, StoreError};
use crate::phase::{EntrepreneurProfile, Phase, PhaseAssessment, PhaseResponse, PhaseResponseInput};

const ASSESSMENT_COLUMNS: &str = "id, user_id, phase_id, phase_name, started_at, completed_at,
     is_completed, progress_percentage, assessment_data";

/// Raw `assessments` row before the phase id and data are decoded
struct AssessmentRow {
    id: i64,
    user_id: i64,
    phase_id: String,
    phase_name: String,
    started_at: i64,
    completed_at: Option<i64>,
    is_completed: bool,
    progress_percentage: f64,
    assessment_data: String,
}

impl AssessmentRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            phase_id: row.get(2)?,
            phase_name: row.get(3)?,
            started_at: row.get(4)?,
            completed_at: row.get(5)?,
            is_completed: row.get(6)?,
            progress_percentage: row.get(7)?,
            assessment_data: row.get(8)?,
        })
    }

    fn into_assessment(self) -> Result<PhaseAssessment, StoreError> {
        Ok(PhaseAssessment {
            phase_id: Phase::parse(&self.phase_id).ok_or(StoreError::InvalidValue {
                column: "phase_id",
                value: self.phase_id.clone(),
            })?,
            assessment_data: from_json("assessment_data", &self.assessment_data)?,
            id: self.id,
            user_id: self.user_id,
            phase_name: self.phase_name,
            started_at: self.started_at,
            completed_at: self.completed_at,
            is_completed: self.is_completed,
            progress_percentage: self.progress_percentage,
        })
    }
}

fn read_assessment(
    conn: &Connection,
    user_id: i64,
    assessment_id: i64,
) -> Result<Option<PhaseAssessment>, StoreError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM assessments WHERE id = ?1 AND user_id = ?2",
                ASSESSMENT_COLUMNS
            ),
            params![assessment_id, user_id],
            AssessmentRow::from_row,
        )
        .optional()?;
    row.map(AssessmentRow::into_assessment).transpose()
}

const PROFILE_COLUMNS: &str = "id, user_id, entrepreneur_archetype, core_motivation, risk_tolerance,
     confidence_level, opportunity_score, success_probability, sections, created_at, updated_at";

fn read_profile(conn: &Connection, user_id: i64) -> Result<Option<EntrepreneurProfile>, StoreError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM entrepreneur_profiles WHERE user_id = ?1",
                PROFILE_COLUMNS
            ),
            [user_id],
            |row| {
                let sections: String = row.get(8)?;
                Ok((
                    EntrepreneurProfile {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        entrepreneur_archetype: row.get(2)?,
                        core_motivation: row.get(3)?,
                        risk_tolerance: row.get(4)?,
                        confidence_level: row.get(5)?,
                        opportunity_score: row.get(6)?,
                        success_probability: row.get(7)?,
                        sections: Default::default(),
                        created_at: row.get(9)?,
                        updated_at: row.get(10)?,
                    },
                    sections,
                ))
            },
        )
        .optional()?;

    row.map(|(mut profile, sections)| {
        profile.sections = from_json("sections", &sections)?;
        Ok(profile)
    })
    .transpose()
}

impl PhaseStore for SqliteStore {
    fn list_assessments(&self, user_id: i64) -> Result<Vec<PhaseAssessment>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM assessments WHERE user_id = ?1 ORDER BY id",
            ASSESSMENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([user_id], AssessmentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(AssessmentRow::into_assessment).collect()
    }

    fn start_assessment(
        &self,
        user_id: i64,
        phase: Phase,
        now: i64,
    ) -> Result<PhaseAssessment, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO assessments (user_id, phase_id, phase_name, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, phase.as_str(), phase.name(), now],
        )?;
        let row = conn.query_row(
            &format!(
                "SELECT {} FROM assessments WHERE user_id = ?1 AND phase_id = ?2",
                ASSESSMENT_COLUMNS
            ),
            params![user_id, phase.as_str()],
            AssessmentRow::from_row,
        )?;
        row.into_assessment()
    }

    fn get_assessment(
        &self,
        user_id: i64,
        assessment_id: i64,
    ) -> Result<Option<PhaseAssessment>, StoreError> {
        let conn = self.conn()?;
        read_assessment(&conn, user_id, assessment_id)
    }

    fn modify_assessment<F>(
        &self,
        user_id: i64,
        assessment_id: i64,
        update: F,
    ) -> Result<Option<PhaseAssessment>, StoreError>
    where
        F: FnOnce(&mut PhaseAssessment),
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(mut assessment) = read_assessment(&tx, user_id, assessment_id)? else {
            return Ok(None);
        };

        update(&mut assessment);
        tx.execute(
            "UPDATE assessments SET completed_at = ?2, is_completed = ?3,
                    progress_percentage = ?4, assessment_data = ?5
             WHERE id = ?1",
            params![
                assessment.id,
                assessment.completed_at,
                assessment.is_completed,
                assessment.progress_percentage,
                to_json("assessment_data", &assessment.assessment_data)?,
            ],
        )?;
        tx.commit()?;
        Ok(Some(assessment))
    }

    fn save_phase_response(
        &self,
        assessment_id: i64,
        input: &PhaseResponseInput,
        now: i64,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO assessment_responses (assessment_id, section_id, question_id,
                    question_text, response_type, response_value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(assessment_id, question_id) DO UPDATE SET
                    question_text = excluded.question_text,
                    response_type = excluded.response_type,
                    response_value = excluded.response_value,
                    updated_at = excluded.updated_at",
            params![
                assessment_id,
                input.section_id,
                input.question_id,
                input.question_text,
                input.response_type,
                to_json("response_value", &input.response_value)?,
                now,
            ],
        )?;
        Ok(())
    }

    fn list_phase_responses(&self, assessment_id: i64) -> Result<Vec<PhaseResponse>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, assessment_id, section_id, question_id, question_text, response_type,
                    response_value, created_at, updated_at
             FROM assessment_responses WHERE assessment_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([assessment_id], |row| {
                let raw: String = row.get(6)?;
                Ok((
                    PhaseResponse {
                        id: row.get(0)?,
                        assessment_id: row.get(1)?,
                        section_id: row.get(2)?,
                        question_id: row.get(3)?,
                        question_text: row.get(4)?,
                        response_type: row.get(5)?,
                        response_value: serde_json::Value::Null,
                        created_at: row.get(7)?,
                        updated_at: row.get(8)?,
                    },
                    raw,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(mut response, raw)| {
                response.response_value = from_json("response_value", &raw)?;
                Ok(response)
            })
            .collect()
    }

    fn modify_profile<F>(
        &self,
        user_id: i64,
        now: i64,
        update: F,
    ) -> Result<EntrepreneurProfile, StoreError>
    where
        F: FnOnce(&mut EntrepreneurProfile) -> bool,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut profile = match read_profile(&tx, user_id)? {
            Some(profile) => profile,
            None => {
                let mut profile = EntrepreneurProfile::new(user_id, now);
                tx.execute(
                    "INSERT INTO entrepreneur_profiles (user_id, sections, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)",
                    params![user_id, to_json("sections", &profile.sections)?, now],
                )?;
                profile.id = tx.last_insert_rowid();
                profile
            }
        };

        if update(&mut profile) {
            profile.updated_at = now;
            tx.execute(
                "UPDATE entrepreneur_profiles SET entrepreneur_archetype = ?2,
                        core_motivation = ?3, risk_tolerance = ?4, confidence_level = ?5,
                        opportunity_score = ?6, success_probability = ?7, sections = ?8,
                        updated_at = ?9
                 WHERE id = ?1",
                params![
                    profile.id,
                    profile.entrepreneur_archetype,
                    profile.core_motivation,
                    profile.risk_tolerance,
                    profile.confidence_level,
                    profile.opportunity_score,
                    profile.success_probability,
                    to_json("sections", &profile.sections)?,
                    profile.updated_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(profile)
    }
}
