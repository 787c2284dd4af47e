use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::api::pagination::PageInfo;
use crate::core::time::format_primitive;
use crate::db::models::{Diagram, McqQuestion, SubjectiveQuestion};
use crate::schemas::validate_not_blank;

pub(crate) const DEFAULT_PER_PAGE: i64 = 20;
pub(crate) const MAX_PER_PAGE: i64 = 100;

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionSearchQuery {
    #[serde(default, rename = "type")]
    pub(crate) question_type: Option<String>,
    #[serde(default)]
    pub(crate) year: Option<i32>,
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default = "default_page")]
    pub(crate) page: i64,
    #[serde(default = "default_per_page")]
    pub(crate) per_page: i64,
}

impl QuestionSearchQuery {
    /// `(page, per_page, offset)` with page >= 1 and per_page in 1..=100.
    pub(crate) fn window(&self) -> (i64, i64, i64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        (page, per_page, (page - 1).saturating_mul(per_page))
    }
}

/// Upper-cases `A`..`D`; anything else is rejected.
pub(crate) fn normalize_option_letter(value: &str) -> Option<char> {
    let mut chars = value.trim().chars();
    match (chars.next().map(|c| c.to_ascii_uppercase()), chars.next()) {
        (Some(letter @ 'A'..='D'), None) => Some(letter),
        _ => None,
    }
}

fn validate_option_letter(value: &str) -> Result<(), ValidationError> {
    normalize_option_letter(value).map(|_| ()).ok_or_else(|| ValidationError::new("option"))
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubjectiveCreateRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Subject is required"))]
    pub(crate) subject: String,
    #[serde(default)]
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub(crate) year: i32,
    #[serde(default)]
    #[serde(alias = "questionType", alias = "type")]
    #[validate(custom(function = "validate_not_blank", message = "Question type is required"))]
    pub(crate) question_type: String,
    #[serde(default)]
    #[serde(alias = "questionText", alias = "question")]
    #[validate(custom(function = "validate_not_blank", message = "Question text is required"))]
    pub(crate) question_text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct McqCreateRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Subject is required"))]
    pub(crate) subject: String,
    #[serde(default)]
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub(crate) year: i32,
    #[serde(default)]
    #[serde(alias = "questionText", alias = "question")]
    #[validate(custom(function = "validate_not_blank", message = "Question text is required"))]
    pub(crate) question_text: String,
    #[serde(default)]
    #[serde(alias = "optionA")]
    #[validate(custom(function = "validate_not_blank", message = "Option A is required"))]
    pub(crate) option_a: String,
    #[serde(default)]
    #[serde(alias = "optionB")]
    #[validate(custom(function = "validate_not_blank", message = "Option B is required"))]
    pub(crate) option_b: String,
    #[serde(default)]
    #[serde(alias = "optionC")]
    #[validate(custom(function = "validate_not_blank", message = "Option C is required"))]
    pub(crate) option_c: String,
    #[serde(default)]
    #[serde(alias = "optionD")]
    #[validate(custom(function = "validate_not_blank", message = "Option D is required"))]
    pub(crate) option_d: String,
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    #[validate(custom(
        function = "validate_option_letter",
        message = "Correct answer must be one of A, B, C or D"
    ))]
    pub(crate) correct_answer: String,
}

/// Text fields of the diagram upload form, checked once the multipart body
/// has been read.
#[derive(Debug, Default, Validate)]
pub(crate) struct DiagramCreateForm {
    #[validate(custom(function = "validate_not_blank", message = "Subject is required"))]
    pub(crate) subject: String,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub(crate) year: i32,
    #[validate(custom(function = "validate_not_blank", message = "Question text is required"))]
    pub(crate) question_text: String,
}

/// Partial update for any question kind. Fields that do not apply to the
/// kind being updated are rejected by the handler.
#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct QuestionUpdateRequest {
    #[serde(default)]
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub(crate) year: Option<i32>,
    #[serde(default)]
    #[serde(alias = "questionType", alias = "type")]
    #[validate(custom(function = "validate_not_blank", message = "Question type must not be empty"))]
    pub(crate) question_type: Option<String>,
    #[serde(default)]
    #[serde(alias = "questionText", alias = "question")]
    #[validate(custom(function = "validate_not_blank", message = "Question text must not be empty"))]
    pub(crate) question_text: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionA")]
    pub(crate) option_a: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionB")]
    pub(crate) option_b: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionC")]
    pub(crate) option_c: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionD")]
    pub(crate) option_d: Option<String>,
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    #[validate(custom(
        function = "validate_option_letter",
        message = "Correct answer must be one of A, B, C or D"
    ))]
    pub(crate) correct_answer: Option<String>,
}

impl QuestionUpdateRequest {
    pub(crate) fn touches_mcq_fields(&self) -> bool {
        self.option_a.is_some()
            || self.option_b.is_some()
            || self.option_c.is_some()
            || self.option_d.is_some()
            || self.correct_answer.is_some()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectiveQuestionResponse {
    pub(crate) id: i64,
    pub(crate) subject: String,
    pub(crate) year: i32,
    pub(crate) question_type: String,
    pub(crate) question_text: String,
    pub(crate) created_at: String,
}

impl SubjectiveQuestionResponse {
    pub(crate) fn from_db(question: SubjectiveQuestion) -> Self {
        Self {
            id: question.id,
            subject: question.subject,
            year: question.year,
            question_type: question.question_type,
            question_text: question.question_text,
            created_at: format_primitive(question.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct McqOption {
    pub(crate) option: String,
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct McqQuestionResponse {
    pub(crate) id: i64,
    pub(crate) subject: String,
    pub(crate) year: i32,
    pub(crate) question_text: String,
    pub(crate) options: Vec<McqOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<String>,
    pub(crate) created_at: String,
}

impl McqQuestionResponse {
    /// `reveal_answer` is false when the question goes to a student.
    pub(crate) fn from_db(question: McqQuestion, reveal_answer: bool) -> Self {
        let options = question
            .options()
            .into_iter()
            .map(|(letter, text)| McqOption { option: letter.to_string(), text: text.to_string() })
            .collect();

        Self {
            id: question.id,
            subject: question.subject,
            year: question.year,
            question_text: question.question_text,
            options,
            correct_answer: reveal_answer.then(|| question.correct_answer.trim().to_string()),
            created_at: format_primitive(question.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DiagramResponse {
    pub(crate) id: i64,
    pub(crate) subject: String,
    pub(crate) year: i32,
    pub(crate) question_text: String,
    pub(crate) image_url: String,
    pub(crate) mime_type: String,
    pub(crate) created_at: String,
}

impl DiagramResponse {
    pub(crate) fn from_db(diagram: Diagram, api_prefix: &str) -> Self {
        Self {
            image_url: format!("{api_prefix}/diagrams/{}/image", diagram.id),
            id: diagram.id,
            subject: diagram.subject,
            year: diagram.year,
            question_text: diagram.question_text,
            mime_type: diagram.mime_type,
            created_at: format_primitive(diagram.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum QuestionResponse {
    Subjective(SubjectiveQuestionResponse),
    Mcq(McqQuestionResponse),
    Diagram(DiagramResponse),
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionBankPagination {
    pub(crate) subjective: PageInfo,
    pub(crate) mcqs: PageInfo,
    pub(crate) diagrams: PageInfo,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionBankResponse {
    pub(crate) subject: String,
    pub(crate) subjective: Vec<SubjectiveQuestionResponse>,
    pub(crate) mcqs: Vec<McqQuestionResponse>,
    pub(crate) diagrams: Vec<DiagramResponse>,
    pub(crate) pagination: QuestionBankPagination,
    pub(crate) total_questions: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct McqListResponse {
    pub(crate) subject: String,
    pub(crate) mcqs: Vec<McqQuestionResponse>,
}
