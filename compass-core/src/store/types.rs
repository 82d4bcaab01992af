//! Persisted record types

use serde::{Deserialize, Serialize};

/// A user's answer to one question (unique per user and question)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub user_id: i64,
    pub question_id: String,
    /// Free text or structured answer
    pub value: serde_json::Value,
    /// Confidence in the answer, 0..=1
    pub confidence: f64,
    pub is_pre_populated: bool,
    /// Rule or question that produced a pre-populated answer
    pub pre_population_source: Option<String>,
    /// Seconds spent answering
    pub time_spent: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: i64,
    pub last_login: Option<i64>,
}

/// Bearer session issued to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub token: String,
    pub user_id: i64,
    pub created_at: i64,
    pub expires_at: i64,
    pub is_active: bool,
}

impl UserSession {
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}
