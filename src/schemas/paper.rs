use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct QuestionSelection {
    #[serde(default)]
    pub(crate) subjective: Vec<i64>,
    #[serde(default)]
    #[serde(alias = "mcqs", alias = "objective")]
    pub(crate) mcq: Vec<i64>,
    #[serde(default)]
    #[serde(alias = "diagrams")]
    pub(crate) diagram: Vec<i64>,
}

impl QuestionSelection {
    pub(crate) fn is_empty(&self) -> bool {
        self.subjective.is_empty() && self.mcq.is_empty() && self.diagram.is_empty()
    }

    /// Sorted, duplicate free copy.
    pub(crate) fn deduplicated(&self) -> Self {
        fn dedup(ids: &[i64]) -> Vec<i64> {
            let mut ids = ids.to_vec();
            ids.sort_unstable();
            ids.dedup();
            ids
        }

        Self {
            subjective: dedup(&self.subjective),
            mcq: dedup(&self.mcq),
            diagram: dedup(&self.diagram),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratePaperRequest {
    #[serde(default)]
    pub(crate) subject: String,
    #[serde(default)]
    #[serde(alias = "pdfName")]
    pub(crate) pdf_name: String,
    #[serde(default)]
    pub(crate) questions: QuestionSelection,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeneratePaperResponse {
    pub(crate) success: bool,
    pub(crate) pdf_file_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaperSummary {
    pub(crate) filename: String,
    pub(crate) subject: String,
    pub(crate) created_at: String,
    pub(crate) size: String,
    pub(crate) creation_date: String,
    pub(crate) creation_time: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaperListResponse {
    pub(crate) papers: Vec<PaperSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenamePaperRequest {
    #[serde(default)]
    #[serde(alias = "newFileName")]
    pub(crate) new_file_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenamePaperResponse {
    pub(crate) success: bool,
    pub(crate) filename: String,
}

/// `"12.35 KB"`, or `"Unknown"` when the file is gone.
pub(crate) fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(bytes) => format!("{:.2} KB", bytes as f64 / 1024.0),
        None => "Unknown".to_string(),
    }
}
