use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::time::{format_date, format_primitive, parse_date};
use crate::db::models::{GeneratedExam, StudentAnswer};
use crate::db::types::QuestionKind;
use crate::schemas::paper::QuestionSelection;
use crate::schemas::question::{DiagramResponse, McqQuestionResponse, SubjectiveQuestionResponse};
use crate::schemas::validate_not_blank;

fn validate_exam_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value).map(|_| ()).ok_or_else(|| ValidationError::new("date"))
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateExamRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Subject is required"))]
    pub(crate) subject: String,
    #[serde(default)]
    #[serde(alias = "selectedQuestions")]
    pub(crate) selected_questions: QuestionSelection,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Description is required"))]
    pub(crate) description: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 600, message = "Timer must be between 1 and 600 minutes"))]
    pub(crate) timer: i32,
    #[serde(default)]
    #[serde(alias = "examDate")]
    #[validate(custom(function = "validate_exam_date", message = "Exam date must be YYYY-MM-DD"))]
    pub(crate) exam_date: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamListQuery {
    #[serde(default)]
    pub(crate) subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionCounts {
    pub(crate) subjective: usize,
    pub(crate) mcq: usize,
    pub(crate) diagram: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) exam_id: String,
    pub(crate) subject: String,
    pub(crate) description: String,
    pub(crate) timer: i32,
    pub(crate) exam_date: String,
    pub(crate) question_counts: QuestionCounts,
    pub(crate) created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) submitted: Option<bool>,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: GeneratedExam, submitted: Option<bool>) -> Self {
        Self {
            question_counts: QuestionCounts {
                subjective: exam.subjective_ids.0.len(),
                mcq: exam.mcq_ids.0.len(),
                diagram: exam.diagram_ids.0.len(),
            },
            exam_id: exam.id,
            subject: exam.subject,
            description: exam.description,
            timer: exam.timer_minutes,
            exam_date: format_date(exam.exam_date),
            created_at: format_primitive(exam.created_at),
            submitted,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamListResponse {
    pub(crate) exams: Vec<ExamResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamDetailResponse {
    pub(crate) exam: ExamResponse,
    pub(crate) subjective_questions: Vec<SubjectiveQuestionResponse>,
    pub(crate) objective_questions: Vec<McqQuestionResponse>,
    pub(crate) diagram_questions: Vec<DiagramResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerInput {
    #[serde(alias = "questionKind", alias = "type")]
    pub(crate) question_kind: String,
    #[serde(alias = "questionId")]
    pub(crate) question_id: i64,
    #[serde(default)]
    pub(crate) answer: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitAnswersRequest {
    #[serde(default)]
    pub(crate) answers: Vec<AnswerInput>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) question_kind: String,
    pub(crate) question_id: i64,
    pub(crate) answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Default)]
pub(crate) struct McqScore {
    pub(crate) mcq_correct: usize,
    pub(crate) mcq_total: usize,
}

impl McqScore {
    /// Counts correct MCQ answers out of every MCQ in the exam, so unanswered
    /// questions score as wrong.
    pub(crate) fn tally<'a>(
        answers: impl IntoIterator<Item = (&'a str, Option<bool>)>,
        exam_mcq_count: usize,
    ) -> Self {
        let mcq_correct = answers
            .into_iter()
            .filter(|(kind, is_correct)| {
                *kind == QuestionKind::Mcq.as_str() && *is_correct == Some(true)
            })
            .count();
        Self { mcq_correct, mcq_total: exam_mcq_count }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResultResponse {
    pub(crate) exam_id: String,
    pub(crate) submitted_at: String,
    pub(crate) answers: Vec<AnswerResponse>,
    #[serde(flatten)]
    pub(crate) score: McqScore,
}

impl ExamResultResponse {
    /// `answers` must be non-empty.
    pub(crate) fn from_db(exam: GeneratedExam, answers: Vec<StudentAnswer>) -> Self {
        let score = McqScore::tally(
            answers.iter().map(|answer| (answer.question_kind.as_str(), answer.is_correct)),
            exam.mcq_ids.0.len(),
        );
        let exam_id = exam.id;
        let submitted_at =
            answers.first().map(|answer| format_primitive(answer.submitted_at)).unwrap_or_default();

        Self {
            exam_id,
            submitted_at,
            answers: answers
                .into_iter()
                .map(|answer| AnswerResponse {
                    question_kind: answer.question_kind,
                    question_id: answer.question_id,
                    answer: answer.answer_text,
                    is_correct: answer.is_correct,
                })
                .collect(),
            score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSubmission {
    pub(crate) student_id: String,
    pub(crate) firstname: String,
    pub(crate) lastname: String,
    pub(crate) email: String,
    pub(crate) submitted_at: String,
    pub(crate) answers: Vec<AnswerResponse>,
    #[serde(flatten)]
    pub(crate) score: McqScore,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSubmissionsResponse {
    pub(crate) exam_id: String,
    pub(crate) submissions: Vec<StudentSubmission>,
}
