pub(crate) mod diagrams;
pub(crate) mod generated_exams;
pub(crate) mod generated_pdfs;
pub(crate) mod health;
pub(crate) mod mcq_questions;
pub(crate) mod pending_approvals;
pub(crate) mod student_answers;
pub(crate) mod subjective_questions;
pub(crate) mod users;

use sqlx::{Postgres, QueryBuilder};

/// Filters shared by the three question bank tables.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QuestionFilter<'a> {
    pub(crate) subject: &'a str,
    pub(crate) year: Option<i32>,
    pub(crate) search: Option<&'a str>,
    /// Only applies to subjective questions.
    pub(crate) question_type: Option<&'a str>,
}

impl QuestionFilter<'_> {
    /// Appends ` WHERE ...` for the filter. Subject matching ignores case.
    pub(crate) fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>, with_type: bool) {
        builder.push(" WHERE LOWER(subject) = LOWER(");
        builder.push_bind(self.subject.to_string());
        builder.push(")");

        if let Some(year) = self.year {
            builder.push(" AND year = ");
            builder.push_bind(year);
        }

        if let Some(search) = self.search.filter(|value| !value.trim().is_empty()) {
            builder.push(" AND question_text ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(search.trim())));
        }

        if with_type {
            if let Some(question_type) = self.question_type.filter(|value| !value.trim().is_empty())
            {
                builder.push(" AND LOWER(question_type) = LOWER(");
                builder.push_bind(question_type.trim().to_string());
                builder.push(")");
            }
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
