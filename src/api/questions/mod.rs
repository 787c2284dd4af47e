mod bank;
mod diagrams;
mod manage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::core::state::AppState;

/// Room for the multipart framing and text fields around the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub(crate) fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/questions/subjective",
            post(manage::create_subjective).merge(bank::search_literal("subjective")),
        )
        .route("/questions/mcq", post(manage::create_mcq).merge(bank::search_literal("mcq")))
        .route(
            "/questions/diagrams",
            post(diagrams::upload_diagram)
                .layer(DefaultBodyLimit::max(upload_limit + MULTIPART_OVERHEAD_BYTES))
                .merge(bank::search_literal("diagrams")),
        )
        .route("/questions/:subject", get(bank::search_questions))
        .route(
            "/questions/:kind/:question_id",
            patch(manage::update_question).delete(manage::delete_question),
        )
        .route("/mcqs/:subject", get(bank::list_mcqs))
        .route("/diagrams/:diagram_id/image", get(diagrams::diagram_image))
}

#[cfg(test)]
mod tests;
