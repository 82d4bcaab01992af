//! SQLite implementation of the assessment and identity stores

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::migrations::Migrator;
use super::{AssessmentStore, IdentityStore, StoreError, StoredResponse, User, UserSession};
use crate::catalog::{ExplanationLevel, PrePopulationRule, Priority, Question, QuestionType};
use crate::path::AssessmentPath;
use crate::persona::Persona;

/// SQLite-backed store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create database at path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::init(conn)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Migrator::new(&conn).migrate()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(super) fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

pub(super) fn to_json<T: Serialize + ?Sized>(
    column: &'static str,
    value: &T,
) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Json { column, source })
}

pub(super) fn from_json<T: DeserializeOwned>(
    column: &'static str,
    raw: &str,
) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Json { column, source })
}

/// Raw `adaptive_questions` row before JSON columns are decoded
struct QuestionRow {
    question_id: String,
    category: String,
    subcategory: String,
    text: String,
    question_type: String,
    options: String,
    priority: u8,
    dependencies: String,
    skip_conditions: String,
    pre_populate_sources: String,
    pre_populate_logic: Option<String>,
    explanation_level: String,
}

const QUESTION_COLUMNS: &str = "question_id, category, subcategory, text, question_type, options, priority,
     dependencies, skip_conditions, pre_populate_sources, pre_populate_logic, explanation_level";

impl QuestionRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            question_id: row.get(0)?,
            category: row.get(1)?,
            subcategory: row.get(2)?,
            text: row.get(3)?,
            question_type: row.get(4)?,
            options: row.get(5)?,
            priority: row.get(6)?,
            dependencies: row.get(7)?,
            skip_conditions: row.get(8)?,
            pre_populate_sources: row.get(9)?,
            pre_populate_logic: row.get(10)?,
            explanation_level: row.get(11)?,
        })
    }

    fn into_question(self) -> Result<Question, StoreError> {
        Ok(Question {
            question_type: QuestionType::parse(&self.question_type).ok_or(
                StoreError::InvalidValue {
                    column: "question_type",
                    value: self.question_type.clone(),
                },
            )?,
            priority: Priority::try_from(self.priority).map_err(|_| StoreError::InvalidValue {
                column: "priority",
                value: self.priority.to_string(),
            })?,
            explanation_level: ExplanationLevel::parse(&self.explanation_level).ok_or(
                StoreError::InvalidValue {
                    column: "explanation_level",
                    value: self.explanation_level.clone(),
                },
            )?,
            options: from_json("options", &self.options)?,
            dependencies: from_json("dependencies", &self.dependencies)?,
            skip_conditions: from_json("skip_conditions", &self.skip_conditions)?,
            pre_populate_sources: from_json("pre_populate_sources", &self.pre_populate_sources)?,
            question_id: self.question_id,
            category: self.category,
            subcategory: self.subcategory,
            text: self.text,
            pre_populate_logic: self.pre_populate_logic,
        })
    }
}

struct PathRow {
    user_id: i64,
    path_type: String,
    path_config: String,
    current_question_id: Option<String>,
    completed: String,
    skipped: String,
    estimated_minutes: u32,
    actual_seconds: i64,
    completion_percentage: f64,
    created_at: i64,
    updated_at: i64,
}

impl PathRow {
    fn into_path(self) -> Result<AssessmentPath, StoreError> {
        Ok(AssessmentPath {
            user_id: self.user_id,
            persona: Persona::parse(&self.path_type).ok_or(StoreError::InvalidValue {
                column: "path_type",
                value: self.path_type.clone(),
            })?,
            config: from_json("path_config", &self.path_config)?,
            current_question_id: self.current_question_id,
            completed: from_json("questions_completed", &self.completed)?,
            skipped: from_json("questions_skipped", &self.skipped)?,
            estimated_minutes: self.estimated_minutes,
            actual_seconds: self.actual_seconds.max(0) as u64,
            completion_percentage: self.completion_percentage,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn write_path(conn: &Connection, path: &AssessmentPath) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO user_assessment_paths (user_id, path_type, path_config, current_question_id,
                questions_completed, questions_skipped, estimated_completion_time, actual_time_spent,
                completion_percentage, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(user_id) DO UPDATE SET
                path_type = excluded.path_type,
                path_config = excluded.path_config,
                current_question_id = excluded.current_question_id,
                questions_completed = excluded.questions_completed,
                questions_skipped = excluded.questions_skipped,
                estimated_completion_time = excluded.estimated_completion_time,
                actual_time_spent = excluded.actual_time_spent,
                completion_percentage = excluded.completion_percentage,
                updated_at = excluded.updated_at",
        params![
            path.user_id,
            path.persona.as_str(),
            to_json("path_config", &path.config)?,
            path.current_question_id,
            to_json("questions_completed", &path.completed)?,
            to_json("questions_skipped", &path.skipped)?,
            path.estimated_minutes,
            i64::try_from(path.actual_seconds).unwrap_or(i64::MAX),
            path.completion_percentage,
            path.created_at,
            path.updated_at,
        ],
    )?;
    Ok(())
}

fn read_path(conn: &Connection, user_id: i64) -> Result<Option<AssessmentPath>, StoreError> {
    let row = conn
        .query_row(
            "SELECT user_id, path_type, path_config, current_question_id, questions_completed,
                    questions_skipped, estimated_completion_time, actual_time_spent,
                    completion_percentage, created_at, updated_at
             FROM user_assessment_paths WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(PathRow {
                    user_id: row.get(0)?,
                    path_type: row.get(1)?,
                    path_config: row.get(2)?,
                    current_question_id: row.get(3)?,
                    completed: row.get(4)?,
                    skipped: row.get(5)?,
                    estimated_minutes: row.get(6)?,
                    actual_seconds: row.get(7)?,
                    completion_percentage: row.get(8)?,
                    created_at: row.get(9)?,
                    updated_at: row.get(10)?,
                })
            },
        )
        .optional()?;
    row.map(PathRow::into_path).transpose()
}

/// Upsert keyed by (user, question); `created_at` of an existing row is kept
fn write_response(conn: &Connection, response: &StoredResponse) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO adaptive_responses (user_id, question_id, response_value, confidence_score,
                is_pre_populated, pre_population_source, time_spent, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(user_id, question_id) DO UPDATE SET
                response_value = excluded.response_value,
                confidence_score = excluded.confidence_score,
                is_pre_populated = excluded.is_pre_populated,
                pre_population_source = excluded.pre_population_source,
                time_spent = excluded.time_spent,
                updated_at = excluded.updated_at",
        params![
            response.user_id,
            response.question_id,
            to_json("response_value", &response.value)?,
            response.confidence,
            response.is_pre_populated,
            response.pre_population_source,
            response.time_spent,
            response.created_at,
            response.updated_at,
        ],
    )?;
    Ok(())
}

fn row_to_response(row: &rusqlite::Row) -> Result<(StoredResponse, String), rusqlite::Error> {
    let raw_value: String = row.get(2)?;
    Ok((
        StoredResponse {
            user_id: row.get(0)?,
            question_id: row.get(1)?,
            value: serde_json::Value::Null,
            confidence: row.get(3)?,
            is_pre_populated: row.get(4)?,
            pre_population_source: row.get(5)?,
            time_spent: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        },
        raw_value,
    ))
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        last_login: row.get(4)?,
    })
}

impl AssessmentStore for SqliteStore {
    fn insert_question(&self, question: &Question) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO adaptive_questions (question_id, category, subcategory, text,
                    question_type, options, priority, dependencies, skip_conditions,
                    pre_populate_sources, pre_populate_logic, explanation_level, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                question.question_id,
                question.category,
                question.subcategory,
                question.text,
                question.question_type.as_str(),
                to_json("options", &question.options)?,
                question.priority.as_u8(),
                to_json("dependencies", &question.dependencies)?,
                to_json("skip_conditions", &question.skip_conditions)?,
                to_json("pre_populate_sources", &question.pre_populate_sources)?,
                question.pre_populate_logic,
                question.explanation_level.as_str(),
                Utc::now().timestamp(),
            ],
        )?;
        Ok(inserted > 0)
    }

    fn insert_rule(&self, rule: &PrePopulationRule) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO pre_population_rules (rule_name, target_question_id,
                    source_question_ids, logic_expression, confidence_threshold, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                rule.rule_name,
                rule.target_question_id,
                to_json("source_question_ids", &rule.source_question_ids)?,
                rule.logic_expression,
                rule.confidence_threshold,
                rule.is_active,
                Utc::now().timestamp(),
            ],
        )?;
        Ok(inserted > 0)
    }

    fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM adaptive_questions ORDER BY id",
            QUESTION_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], QuestionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    fn get_question(&self, question_id: &str) -> Result<Option<Question>, StoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM adaptive_questions WHERE question_id = ?1",
                    QUESTION_COLUMNS
                ),
                [question_id],
                QuestionRow::from_row,
            )
            .optional()?;
        row.map(QuestionRow::into_question).transpose()
    }

    fn list_active_rules(&self) -> Result<Vec<PrePopulationRule>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT rule_name, target_question_id, source_question_ids, logic_expression,
                    confidence_threshold, is_active
             FROM pre_population_rules WHERE is_active = 1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, bool>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(rule_name, target, sources, logic, threshold, active)| {
                Ok(PrePopulationRule {
                    rule_name,
                    target_question_id: target,
                    source_question_ids: from_json("source_question_ids", &sources)?,
                    logic_expression: logic,
                    confidence_threshold: threshold,
                    is_active: active,
                })
            })
            .collect()
    }

    fn get_responses(&self, user_id: i64) -> Result<Vec<StoredResponse>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, question_id, response_value, confidence_score, is_pre_populated,
                    pre_population_source, time_spent, created_at, updated_at
             FROM adaptive_responses WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([user_id], row_to_response)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(mut response, raw)| {
                response.value = from_json("response_value", &raw)?;
                Ok(response)
            })
            .collect()
    }

    fn get_path(&self, user_id: i64) -> Result<Option<AssessmentPath>, StoreError> {
        let conn = self.conn()?;
        read_path(&conn, user_id)
    }

    fn modify_path<E, F>(
        &self,
        initial: &AssessmentPath,
        responses: &[StoredResponse],
        update: F,
    ) -> Result<AssessmentPath, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut AssessmentPath) -> Result<bool, E>,
    {
        let mut conn = self.conn()?;
        // Dropping the transaction without commit rolls back every write
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        let mut path = match read_path(&tx, initial.user_id)? {
            Some(path) => path,
            None => {
                write_path(&tx, initial)?;
                initial.clone()
            }
        };
        if update(&mut path)? {
            write_path(&tx, &path)?;
            for response in responses {
                write_response(&tx, response)?;
            }
        }
        tx.commit().map_err(StoreError::from)?;
        Ok(path)
    }
}

impl IdentityStore for SqliteStore {
    fn create_user(&self, username: &str, email: &str) -> Result<User, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now().timestamp();
        conn.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            params![username, email, now],
        )?;
        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: now,
            last_login: None,
        })
    }

    fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, username, email, created_at, last_login FROM users WHERE id = ?1",
                [id],
                row_to_user,
            )
            .optional()?)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, username, email, created_at, last_login FROM users WHERE username = ?1",
                [username],
                row_to_user,
            )
            .optional()?)
    }

    fn create_session(&self, session: &UserSession) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO user_sessions (token, user_id, created_at, expires_at, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.token,
                session.user_id,
                session.created_at,
                session.expires_at,
                session.is_active,
            ],
        )?;
        Ok(())
    }

    fn get_session(&self, token: &str) -> Result<Option<UserSession>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT token, user_id, created_at, expires_at, is_active
                 FROM user_sessions WHERE token = ?1",
                [token],
                |row| {
                    Ok(UserSession {
                        token: row.get(0)?,
                        user_id: row.get(1)?,
                        created_at: row.get(2)?,
                        expires_at: row.get(3)?,
                        is_active: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    fn deactivate_session(&self, token: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE user_sessions SET is_active = 0 WHERE token = ?1",
            [token],
        )?;
        Ok(updated > 0)
    }

    fn touch_last_login(&self, user_id: i64, at: i64) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET last_login = ?2 WHERE id = ?1",
            params![user_id, at],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogDocument;
    use crate::expr::Responses;
    use crate::path::PathScope;
    use crate::persona::classify;
    use serde_json::json;

    fn seeded_store() -> (SqliteStore, User) {
        let store = SqliteStore::open_in_memory().unwrap();
        let catalog = CatalogDocument::builtin().unwrap();
        for question in &catalog.questions {
            store.insert_question(question).unwrap();
        }
        for rule in &catalog.rules {
            store.insert_rule(rule).unwrap();
        }
        let user = store.create_user("ada", "ada@example.com").unwrap();
        (store, user)
    }

    fn response(user_id: i64, question_id: &str, value: serde_json::Value) -> StoredResponse {
        StoredResponse {
            user_id,
            question_id: question_id.into(),
            value,
            confidence: 1.0,
            is_pre_populated: false,
            pre_population_source: None,
            time_spent: 30,
            created_at: 100,
            updated_at: 100,
        }
    }

    #[test]
    fn questions_round_trip_in_catalog_order() {
        let (store, _) = seeded_store();
        let catalog = CatalogDocument::builtin().unwrap();
        let stored = store.list_questions().unwrap();
        assert_eq!(stored, catalog.questions);
    }

    #[test]
    fn insert_question_ignores_existing_id() {
        let (store, _) = seeded_store();
        let catalog = CatalogDocument::builtin().unwrap();
        assert!(!store.insert_question(&catalog.questions[0]).unwrap());
    }

    #[test]
    fn rules_round_trip() {
        let (store, _) = seeded_store();
        let rules = store.list_active_rules().unwrap();
        assert_eq!(rules, CatalogDocument::builtin().unwrap().rules);
    }

    fn complete(
        store: &SqliteStore,
        initial: &AssessmentPath,
        response: &StoredResponse,
    ) -> Result<AssessmentPath, StoreError> {
        let question_id = response.question_id.clone();
        store.modify_path(initial, std::slice::from_ref(response), |path| {
            path.mark_completed(&question_id);
            Ok::<_, StoreError>(true)
        })
    }

    #[test]
    fn modify_path_upserts_responses() {
        let (store, user) = seeded_store();
        let initial = AssessmentPath::new(user.id, classify(&Responses::new()), 100);

        complete(&store, &initial, &response(user.id, "risk_tolerance", json!(3))).unwrap();
        let mut second = response(user.id, "risk_tolerance", json!(8));
        second.updated_at = 200;
        let path = complete(&store, &initial, &second).unwrap();
        assert_eq!(path.completed, vec!["risk_tolerance"]);

        let responses = store.get_responses(user.id).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].value, json!(8));
        assert_eq!(responses[0].created_at, 100);
        assert_eq!(responses[0].updated_at, 200);
    }

    #[test]
    fn modify_path_works_on_the_stored_path() {
        let (store, user) = seeded_store();
        let initial = AssessmentPath::new(user.id, classify(&Responses::new()), 100);
        complete(&store, &initial, &response(user.id, "core_motivation", json!("x"))).unwrap();

        // A stale copy must not overwrite what is already stored
        let path = complete(&store, &initial, &response(user.id, "risk_tolerance", json!(4)))
            .unwrap();
        assert_eq!(path.completed, vec!["core_motivation", "risk_tolerance"]);
        assert_eq!(store.get_path(user.id).unwrap(), Some(path));
    }

    #[test]
    fn modify_path_inserts_initial_path_once() {
        let (store, user) = seeded_store();
        let initial = AssessmentPath::new(user.id, classify(&Responses::new()), 100);
        let stored = store
            .modify_path(&initial, &[], |_| Ok::<_, StoreError>(false))
            .unwrap();
        assert_eq!(stored, initial);
        assert_eq!(store.get_path(user.id).unwrap(), Some(initial));
    }

    #[test]
    fn modify_path_skips_writes_when_unchanged() {
        let (store, user) = seeded_store();
        let initial = AssessmentPath::new(user.id, classify(&Responses::new()), 100);
        store
            .modify_path(
                &initial,
                &[response(user.id, "risk_tolerance", json!(3))],
                |_| Ok::<_, StoreError>(false),
            )
            .unwrap();
        assert!(store.get_responses(user.id).unwrap().is_empty());
    }

    #[test]
    fn modify_path_rolls_back_on_failure() {
        let (store, user) = seeded_store();
        let initial = AssessmentPath::new(user.id, classify(&Responses::new()), 100);
        store
            .modify_path(&initial, &[], |_| Ok::<_, StoreError>(false))
            .unwrap();

        let result = complete(&store, &initial, &response(user.id, "not_in_catalog", json!(1)));
        assert!(result.is_err());

        let stored = store.get_path(user.id).unwrap().unwrap();
        assert!(stored.completed.is_empty());
        assert!(store.get_responses(user.id).unwrap().is_empty());
    }

    #[test]
    fn modify_path_rolls_back_on_update_error() {
        let (store, user) = seeded_store();
        let initial = AssessmentPath::new(user.id, classify(&Responses::new()), 100);
        let result = store.modify_path(&initial, &[], |_| Err::<bool, _>(StoreError::Poisoned));
        assert!(matches!(result, Err(StoreError::Poisoned)));
        assert_eq!(store.get_path(user.id).unwrap(), None);
    }

    #[test]
    fn path_round_trips() {
        let (store, user) = seeded_store();
        let catalog = store.list_questions().unwrap();
        let mut path = AssessmentPath::new(user.id, classify(&Responses::new()), 100);
        path.mark_completed("core_motivation");
        path.mark_skipped("risk_tolerance");
        path.current_question_id = Some("core_motivation".into());
        path.add_time(90);
        path.recompute_percentage(&PathScope::new(&path.config, &catalog));
        store
            .modify_path(&path, &[], |_| Ok::<_, StoreError>(false))
            .unwrap();

        assert_eq!(store.get_path(user.id).unwrap(), Some(path));
        assert_eq!(store.get_path(user.id + 1).unwrap(), None);
    }

    #[test]
    fn sessions_can_be_deactivated() {
        let (store, user) = seeded_store();
        let session = UserSession {
            token: "tok".into(),
            user_id: user.id,
            created_at: 0,
            expires_at: 10,
            is_active: true,
        };
        store.create_session(&session).unwrap();
        assert_eq!(store.get_session("tok").unwrap(), Some(session));
        assert!(store.deactivate_session("tok").unwrap());
        assert!(!store.get_session("tok").unwrap().unwrap().is_active);
        assert!(!store.deactivate_session("missing").unwrap());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let (store, _) = seeded_store();
        assert!(store.create_user("ada", "other@example.com").is_err());
    }

    #[test]
    fn opens_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("compass.db");
        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.create_user("grace", "grace@example.com").unwrap();
        }
        let reopened = SqliteStore::open(&db_path).unwrap();
        assert!(reopened.get_user_by_username("grace").unwrap().is_some());
    }
}
