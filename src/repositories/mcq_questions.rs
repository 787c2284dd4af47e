use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::McqQuestion;
use crate::repositories::QuestionFilter;

const COLUMNS: &str = "\
    id, subject, year, question_text, option_a, option_b, option_c, option_d, \
    correct_answer, created_by, created_at";

pub(crate) struct CreateMcqQuestion<'a> {
    pub(crate) subject: &'a str,
    pub(crate) year: i32,
    pub(crate) question_text: &'a str,
    pub(crate) options: [&'a str; 4],
    pub(crate) correct_answer: char,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateMcqQuestion<'_>,
) -> Result<McqQuestion, sqlx::Error> {
    let [option_a, option_b, option_c, option_d] = params.options;
    sqlx::query_as::<_, McqQuestion>(&format!(
        "INSERT INTO mcq_questions (
            subject, year, question_text, option_a, option_b, option_c, option_d,
            correct_answer, created_by, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}"
    ))
    .bind(params.subject)
    .bind(params.year)
    .bind(params.question_text)
    .bind(option_a)
    .bind(option_b)
    .bind(option_c)
    .bind(option_d)
    .bind(params.correct_answer.to_string())
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &QuestionFilter<'_>,
    offset: i64,
    limit: i64,
) -> Result<Vec<McqQuestion>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM mcq_questions"));
    filter.push_where(&mut builder, false);
    builder.push(" ORDER BY year DESC, id ASC OFFSET ");
    builder.push_bind(offset.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<McqQuestion>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filter: &QuestionFilter<'_>) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM mcq_questions");
    filter.push_where(&mut builder, false);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn list_by_subject(
    pool: &PgPool,
    subject: &str,
) -> Result<Vec<McqQuestion>, sqlx::Error> {
    sqlx::query_as::<_, McqQuestion>(&format!(
        "SELECT {COLUMNS} FROM mcq_questions WHERE LOWER(subject) = LOWER($1) ORDER BY id"
    ))
    .bind(subject)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_ids_for_subject(
    pool: &PgPool,
    ids: &[i64],
    subject: &str,
) -> Result<Vec<McqQuestion>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, McqQuestion>(&format!(
        "SELECT {COLUMNS} FROM mcq_questions
         WHERE id = ANY($1) AND LOWER(subject) = LOWER($2)
         ORDER BY id"
    ))
    .bind(ids)
    .bind(subject)
    .fetch_all(pool)
    .await
}

pub(crate) struct UpdateMcqQuestion {
    pub(crate) year: Option<i32>,
    pub(crate) question_text: Option<String>,
    pub(crate) option_a: Option<String>,
    pub(crate) option_b: Option<String>,
    pub(crate) option_c: Option<String>,
    pub(crate) option_d: Option<String>,
    pub(crate) correct_answer: Option<char>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    params: UpdateMcqQuestion,
) -> Result<Option<McqQuestion>, sqlx::Error> {
    sqlx::query_as::<_, McqQuestion>(&format!(
        "UPDATE mcq_questions SET
            year = COALESCE($1, year),
            question_text = COALESCE($2, question_text),
            option_a = COALESCE($3, option_a),
            option_b = COALESCE($4, option_b),
            option_c = COALESCE($5, option_c),
            option_d = COALESCE($6, option_d),
            correct_answer = COALESCE($7, correct_answer)
         WHERE id = $8
         RETURNING {COLUMNS}"
    ))
    .bind(params.year)
    .bind(params.question_text)
    .bind(params.option_a)
    .bind(params.option_b)
    .bind(params.option_c)
    .bind(params.option_d)
    .bind(params.correct_answer.map(|letter| letter.to_string()))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM mcq_questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
