use uuid::Uuid;

use crate::{dto::edition::EditionSummary, error::ServiceError, state::SharedState};

/// Status of an edition together with its active and eliminated participant counts.
pub async fn edition_summary(
    state: &SharedState,
    edition_id: Uuid,
) -> Result<EditionSummary, ServiceError> {
    let store = state.require_pool_store().await?;
    let edition = store
        .find_edition(edition_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("edition `{edition_id}` does not exist")))?;
    let counts = store.count_participants(edition_id).await?;
    Ok(EditionSummary::new(edition, counts))
}
