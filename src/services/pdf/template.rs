use base64::{engine::general_purpose::STANDARD, Engine as _};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::db::models::{McqQuestion, SubjectiveQuestion};

const PAPER_CSS: &str = r#"
body { font-family: 'Times New Roman', Times, serif; line-height: 1.8; margin: 20px; padding: 0; }
h1 { text-align: center; font-size: 24px; margin-bottom: 20px; }
h2 { margin-left: 20px; font-size: 18px; font-weight: bold; color: #2c3e50; }
.header { text-align: center; margin-bottom: 30px; font-weight: bold; color: #2c3e50; }
.name { display: inline-block; width: 30%; text-align: center; font-size: 10px; color: #34495e; }
.question { margin: 30px 0; padding: 10px 0 10px 20px; font-size: 16px; page-break-inside: avoid; border-bottom: 1px dashed #000; }
.answer-space { margin-top: 10px; border-top: 1px solid #000; padding: 10px; height: 100px; }
.options { margin-left: 40px; margin-top: 10px; }
.option { display: inline-block; width: 45%; margin: 5px 0; font-size: 16px; }
.diagram { display: block; max-width: 80%; max-height: 320px; margin: 10px auto; }
.footer { margin-top: 40px; text-align: center; font-size: 14px; color: #7f8c8d; }
"#;

/// A diagram question with its image inlined.
pub(crate) struct DiagramImage {
    pub(crate) question_text: String,
    pub(crate) mime_type: String,
    pub(crate) bytes: Option<Vec<u8>>,
}

impl DiagramImage {
    fn data_uri(&self) -> Option<String> {
        self.bytes
            .as_ref()
            .map(|bytes| format!("data:{};base64,{}", self.mime_type, STANDARD.encode(bytes)))
    }
}

pub(crate) struct PaperDocument<'a> {
    pub(crate) subject: &'a str,
    pub(crate) authors: &'a [String],
    pub(crate) subjective: &'a [SubjectiveQuestion],
    pub(crate) mcqs: &'a [McqQuestion],
    pub(crate) diagrams: &'a [DiagramImage],
}

impl PaperDocument<'_> {
    pub(crate) fn question_count(&self) -> usize {
        self.subjective.len() + self.mcqs.len() + self.diagrams.len()
    }
}

/// Numbering runs across sections: subjective, then MCQ, then diagrams.
pub(crate) fn render_paper(paper: &PaperDocument<'_>) -> Markup {
    let mcq_offset = paper.subjective.len();
    let diagram_offset = mcq_offset + paper.mcqs.len();

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (paper.subject.to_uppercase()) " Exam Paper" }
                style { (PreEscaped(PAPER_CSS)) }
            }
            body {
                div class="header" {
                    @for author in paper.authors {
                        div class="name" { (author) }
                    }
                }
                h1 { (paper.subject.to_uppercase()) " Exam Paper" }

                @if !paper.subjective.is_empty() {
                    h2 { "Subjective Questions" }
                    @for (index, question) in paper.subjective.iter().enumerate() {
                        div class="question" {
                            (index + 1) ". " (question.question_text)
                            div class="answer-space" { "Answer:" }
                        }
                    }
                }

                @if !paper.mcqs.is_empty() {
                    h2 { "MCQ Questions" }
                    @for (index, question) in paper.mcqs.iter().enumerate() {
                        div class="question" {
                            (mcq_offset + index + 1) ". " (question.question_text)
                            div class="options" {
                                @for (letter, text) in question.options() {
                                    div class="option" { (letter.to_ascii_lowercase()) ") " (text) }
                                }
                            }
                        }
                    }
                }

                @if !paper.diagrams.is_empty() {
                    h2 { "Diagram Questions" }
                    @for (index, diagram) in paper.diagrams.iter().enumerate() {
                        div class="question" {
                            (diagram_offset + index + 1) ". " (diagram.question_text)
                            @if let Some(src) = diagram.data_uri() {
                                img class="diagram" src=(src) alt="Diagram";
                            }
                            div class="answer-space" { "Answer:" }
                        }
                    }
                }

                div class="footer" { "Generated by Exam Automation System" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn subjective(id: i64, text: &str) -> SubjectiveQuestion {
        SubjectiveQuestion {
            id,
            subject: "physics".to_string(),
            year: 2024,
            question_type: "long".to_string(),
            question_text: text.to_string(),
            created_by: None,
            created_at: primitive_now_utc(),
        }
    }

    fn mcq(id: i64, text: &str) -> McqQuestion {
        McqQuestion {
            id,
            subject: "physics".to_string(),
            year: 2024,
            question_text: text.to_string(),
            option_a: "1 N".to_string(),
            option_b: "2 N".to_string(),
            option_c: "3 N".to_string(),
            option_d: "4 N".to_string(),
            correct_answer: "B".to_string(),
            created_by: None,
            created_at: primitive_now_utc(),
        }
    }

    #[test]
    fn numbering_continues_across_sections() {
        let authors = vec!["Ada Lovelace".to_string()];
        let subjective = vec![subjective(1, "Define inertia."), subjective(2, "State Ohm's law.")];
        let mcqs = vec![mcq(7, "Net force?")];
        let diagrams = vec![DiagramImage {
            question_text: "Label the circuit.".to_string(),
            mime_type: "image/png".to_string(),
            bytes: Some(vec![1, 2, 3]),
        }];
        let paper = PaperDocument {
            subject: "physics",
            authors: &authors,
            subjective: &subjective,
            mcqs: &mcqs,
            diagrams: &diagrams,
        };

        let html = render_paper(&paper).into_string();

        assert_eq!(paper.question_count(), 4);
        assert!(html.contains("PHYSICS Exam Paper"));
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("2. State Ohm"));
        assert!(html.contains("3. Net force?"));
        assert!(html.contains("b) 2 N"));
        assert!(html.contains("4. Label the circuit."));
        assert!(html.contains("src=\"data:image/png;base64,AQID\""));
        assert!(html.contains("Generated by Exam Automation System"));
    }

    #[test]
    fn question_text_is_escaped_and_empty_sections_are_skipped() {
        let subjective = vec![subjective(1, "<script>alert(1)</script>")];
        let paper = PaperDocument {
            subject: "chem",
            authors: &[],
            subjective: &subjective,
            mcqs: &[],
            diagrams: &[],
        };

        let html = render_paper(&paper).into_string();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("MCQ Questions"));
        assert!(!html.contains("Diagram Questions"));
    }
}
