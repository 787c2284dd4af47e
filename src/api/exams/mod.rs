mod handlers;
mod helpers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_exam).get(handlers::list_exams))
        .route("/:exam_id", get(handlers::get_exam).delete(handlers::delete_exam))
        .route("/:exam_id/answers", post(handlers::submit_answers).get(handlers::list_exam_answers))
        .route("/:exam_id/result", get(handlers::get_result))
}
