use axum::{extract::State, Json};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Diagram;
use crate::repositories;
use crate::schemas::paper::{GeneratePaperRequest, GeneratePaperResponse};
use crate::services::file_store::FileStoreError;
use crate::services::pdf::{
    paper_file_name, render_paper, render_to_file, DiagramImage, PaperDocument,
};

const PAPER_EXISTS: &str = "A paper with this name already exists";
const SCRATCH_SUFFIX: &str = ".pdf.part";

/// A render output that has not been moved to its recorded name yet.
struct ScratchFile<'a> {
    state: &'a AppState,
    name: &'a str,
}

impl ScratchFile<'_> {
    async fn discard(&self) {
        if let Err(err) = self.state.papers().delete(self.name).await {
            tracing::warn!(error = %err, file = %self.name, "Failed to remove scratch paper");
        }
    }
}

async fn load_diagram_images(state: &AppState, diagrams: Vec<Diagram>) -> Vec<DiagramImage> {
    let mut images = Vec::with_capacity(diagrams.len());
    for diagram in diagrams {
        let bytes = match state.diagrams().read(&diagram.diagram_path).await {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    diagram_id = diagram.id,
                    file = %diagram.diagram_path,
                    "Diagram image unavailable, rendering without it"
                );
                None
            }
        };
        images.push(DiagramImage {
            question_text: diagram.question_text,
            mime_type: diagram.mime_type,
            bytes,
        });
    }
    images
}

pub(super) async fn generate_paper(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<GeneratePaperRequest>,
) -> Result<Json<GeneratePaperResponse>, ApiError> {
    let subject = payload.subject.trim();
    if subject.is_empty() || payload.pdf_name.trim().is_empty() || payload.questions.is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let pdf_settings = state.settings().pdf();
    let file_name = paper_file_name(&payload.pdf_name, subject, &pdf_settings.paper_suffix)
        .ok_or_else(|| ApiError::BadRequest("Invalid PDF name".to_string()))?;

    let recorded = repositories::generated_pdfs::exists_by_filename(state.db(), &file_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing papers"))?;
    let on_disk = state
        .papers()
        .exists(&file_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing papers"))?;
    if recorded || on_disk {
        return Err(ApiError::Conflict(PAPER_EXISTS.to_string()));
    }

    let selection = payload.questions.deduplicated();
    let db = state.db();
    let (subjective, mcqs, diagrams) = tokio::try_join!(
        repositories::subjective_questions::find_by_ids_for_subject(
            db,
            &selection.subjective,
            subject
        ),
        repositories::mcq_questions::find_by_ids_for_subject(db, &selection.mcq, subject),
        repositories::diagrams::find_by_ids_for_subject(db, &selection.diagram, subject),
    )
    .map_err(|e| ApiError::internal(e, "Failed to fetch selected questions"))?;

    if subjective.is_empty() && mcqs.is_empty() && diagrams.is_empty() {
        return Err(ApiError::BadRequest(
            "None of the selected questions belong to this subject".to_string(),
        ));
    }

    let diagrams = load_diagram_images(&state, diagrams).await;
    let document = PaperDocument {
        subject,
        authors: &pdf_settings.authors,
        subjective: &subjective,
        mcqs: &mcqs,
        diagrams: &diagrams,
    };
    let question_count = document.question_count();
    let html = render_paper(&document).into_string();

    state
        .papers()
        .ensure_root()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to prepare papers directory"))?;

    // Each request renders into its own file; only the request that records
    // the row moves it to the final name.
    let scratch_name = format!("{}{SCRATCH_SUFFIX}", Uuid::new_v4());
    let scratch = ScratchFile { state: &state, name: &scratch_name };
    let output = state
        .papers()
        .path_for(&scratch_name)
        .map_err(|e| ApiError::internal(e, "Failed to resolve paper path"))?;

    if let Err(err) = render_to_file(state.renderer(), &html, &output).await {
        scratch.discard().await;
        return Err(ApiError::internal(err, "Failed to generate PDF"));
    }

    let bytes = match state.papers().read(&scratch_name).await {
        Ok(bytes) => bytes,
        Err(err) => {
            scratch.discard().await;
            return Err(ApiError::internal(err, "Failed to read generated PDF"));
        }
    };
    let sha256 = hex::encode(Sha256::digest(&bytes));

    let created = repositories::generated_pdfs::create(
        state.db(),
        repositories::generated_pdfs::CreateGeneratedPdf {
            id: &Uuid::new_v4().to_string(),
            filename: &file_name,
            subject,
            question_count: i32::try_from(question_count).unwrap_or(i32::MAX),
            sha256: &sha256,
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await;

    if let Err(err) = created {
        scratch.discard().await;
        return Err(if repositories::is_unique_violation(&err) {
            ApiError::Conflict(PAPER_EXISTS.to_string())
        } else {
            ApiError::internal(err, "Failed to record generated paper")
        });
    }

    if let Err(err) = state.papers().rename(&scratch_name, &file_name).await {
        scratch.discard().await;
        if let Err(cleanup) =
            repositories::generated_pdfs::delete_by_filename(state.db(), &file_name).await
        {
            tracing::warn!(error = %cleanup, file = %file_name, "Failed to drop unbacked paper row");
        }
        return Err(match err {
            FileStoreError::AlreadyExists => ApiError::Conflict(PAPER_EXISTS.to_string()),
            other => ApiError::internal(other, "Failed to store generated PDF"),
        });
    }

    tracing::info!(
        teacher_id = %teacher.id,
        file = %file_name,
        subject,
        question_count,
        size = bytes.len(),
        "Paper generated"
    );

    Ok(Json(GeneratePaperResponse { success: true, pdf_file_name: file_name }))
}
