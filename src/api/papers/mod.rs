mod generate;
mod library;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::api::errors::ApiError;
use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(library::list_papers).post(generate::generate_paper))
        .route("/:filename", patch(library::rename_paper).delete(library::delete_paper))
        .route("/:filename/download", get(library::download_paper))
}

fn invalid_file_name() -> ApiError {
    ApiError::BadRequest("Invalid file name".to_string())
}
