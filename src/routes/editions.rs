use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::edition::EditionSummary, error::AppError, services::edition_service, state::SharedState,
};

/// Retrieve an edition with its survivor counts.
#[utoipa::path(
    get,
    path = "/editions/{editionId}",
    tag = "editions",
    params(("editionId" = Uuid, Path, description = "Identifier of the edition")),
    responses(
        (status = 200, description = "Edition", body = EditionSummary),
        (status = 404, description = "Unknown edition")
    )
)]
pub async fn get_edition(
    State(state): State<SharedState>,
    Path(edition_id): Path<Uuid>,
) -> Result<Json<EditionSummary>, AppError> {
    Ok(Json(edition_service::edition_summary(&state, edition_id).await?))
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/editions/{editionId}", get(get_edition))
}
