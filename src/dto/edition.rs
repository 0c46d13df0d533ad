use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{EditionEntity, ParticipantCountsEntity};

/// Edition status with its survivor tallies.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditionSummary {
    pub id: Uuid,
    pub league_id: Uuid,
    pub name: String,
    /// `OPEN`, `IN_PROGRESS` or `FINISHED`.
    pub status: String,
    pub active_participants: u64,
    pub eliminated_participants: u64,
}

impl EditionSummary {
    pub fn new(edition: EditionEntity, counts: ParticipantCountsEntity) -> Self {
        Self {
            id: edition.id,
            league_id: edition.league_id,
            name: edition.name,
            status: edition.status.as_str().to_owned(),
            active_participants: counts.active,
            eliminated_participants: counts.eliminated,
        }
    }
}
