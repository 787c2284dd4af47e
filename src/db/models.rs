use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) firstname: String,
    pub(crate) lastname: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// A signup waiting for an admin decision.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct PendingApproval {
    pub(crate) id: String,
    pub(crate) firstname: String,
    pub(crate) lastname: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SubjectiveQuestion {
    pub(crate) id: i64,
    pub(crate) subject: String,
    pub(crate) year: i32,
    pub(crate) question_type: String,
    pub(crate) question_text: String,
    pub(crate) created_by: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct McqQuestion {
    pub(crate) id: i64,
    pub(crate) subject: String,
    pub(crate) year: i32,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) correct_answer: String,
    pub(crate) created_by: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

impl McqQuestion {
    /// Options in display order, paired with their letter.
    pub(crate) fn options(&self) -> [(char, &str); 4] {
        [
            ('A', self.option_a.as_str()),
            ('B', self.option_b.as_str()),
            ('C', self.option_c.as_str()),
            ('D', self.option_d.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Diagram {
    pub(crate) id: i64,
    pub(crate) subject: String,
    pub(crate) year: i32,
    pub(crate) question_text: String,
    pub(crate) diagram_path: String,
    pub(crate) mime_type: String,
    pub(crate) created_by: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct GeneratedPdf {
    pub(crate) id: String,
    pub(crate) filename: String,
    pub(crate) subject: String,
    pub(crate) question_count: i32,
    pub(crate) sha256: String,
    pub(crate) created_by: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct GeneratedExam {
    pub(crate) id: String,
    pub(crate) subject: String,
    pub(crate) description: String,
    pub(crate) timer_minutes: i32,
    pub(crate) exam_date: Date,
    pub(crate) subjective_ids: Json<Vec<i64>>,
    pub(crate) mcq_ids: Json<Vec<i64>>,
    pub(crate) diagram_ids: Json<Vec<i64>>,
    pub(crate) created_by: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudentAnswer {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) question_kind: String,
    pub(crate) question_id: i64,
    pub(crate) answer_text: String,
    pub(crate) is_correct: Option<bool>,
    pub(crate) submitted_at: PrimitiveDateTime,
}
