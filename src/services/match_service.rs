//! Read-only match queries backing the public match routes.

use uuid::Uuid;

use crate::{dto::matches::MatchSummary, error::ServiceError, state::SharedState};

pub async fn find_match(state: &SharedState, match_id: Uuid) -> Result<MatchSummary, ServiceError> {
    let store = state.require_pool_store().await?;
    store
        .find_match(match_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` does not exist")))
}

/// Matches of `matchday` ordered by kickoff; an unknown matchday yields an empty list.
pub async fn list_matchday(
    state: &SharedState,
    matchday: u32,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let store = state.require_pool_store().await?;
    let matches = store.list_matches_by_matchday(matchday).await?;
    Ok(matches.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::pool_store::memory::fixtures::PoolFixture,
        services::authorization::StaticTokenAuthorizer, state::AppState,
    };

    async fn state_with(fixture: PoolFixture) -> SharedState {
        let state = AppState::new(Arc::new(StaticTokenAuthorizer::new(None)));
        state.set_pool_store(Arc::new(fixture.store())).await;
        state
    }

    #[tokio::test]
    async fn matchday_lists_in_kickoff_order() {
        let mut fixture = PoolFixture::new();
        let (inter, milan, roma) = (
            fixture.team("Inter"),
            fixture.team("Milan"),
            fixture.team("Roma"),
        );
        let evening = fixture.fixture(7, inter, milan, 7_200);
        let afternoon = fixture.fixture(7, roma, inter, 3_600);
        fixture.fixture(8, milan, roma, 0);
        let state = state_with(fixture).await;

        let listed = list_matchday(&state, 7).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|summary| summary.id).collect();
        assert_eq!(ids, vec![afternoon, evening]);
        assert_eq!(listed[0].home_team.name, "Roma");
        assert_eq!(listed[0].kickoff_at, "1970-01-01T01:00:00Z");
        assert_eq!(listed[0].status, "SCHEDULED");

        assert!(list_matchday(&state, 30).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_match_is_not_found() {
        let state = state_with(PoolFixture::new()).await;
        let err = find_match(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
