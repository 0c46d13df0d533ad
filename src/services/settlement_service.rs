//! Match settlement: records a final score and propagates eliminations inside one transaction.

use std::collections::HashSet;

use futures::FutureExt;
use indexmap::IndexSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::MatchStatus,
        pool_store::{PoolStore, PoolTransaction, with_transaction},
    },
    dto::settlement::{SettleMatchRequest, SettlementReport},
    error::ServiceError,
    state::{
        SharedState,
        settlement::{
            EditionOutcome, EliminatedParticipant, MatchVerdict, PickDecision, Score,
            SettlementOutcome, display_name, edition_should_finish, evaluate_pick,
        },
    },
};

/// Settle `match_id` with the submitted score and build the HTTP report.
pub async fn settle_match(
    state: &SharedState,
    match_id: Uuid,
    request: SettleMatchRequest,
) -> Result<SettlementReport, ServiceError> {
    let score = Score::try_new(request.home_goals, request.away_goals)?;
    let store = state.require_pool_store().await?;
    let outcome = settle(store.as_ref(), match_id, score).await?;
    Ok(outcome.into())
}

/// Run a settlement against `store`. Either every write lands or none does.
pub async fn settle(
    store: &dyn PoolStore,
    match_id: Uuid,
    score: Score,
) -> Result<SettlementOutcome, ServiceError> {
    let mut result = with_transaction(store, move |tx| {
        settle_in_transaction(tx, match_id, score).boxed()
    })
    .await;

    if matches!(&result, Err(err) if err.is_storage_conflict())
        && settled_concurrently(store, match_id).await
    {
        result = Err(ServiceError::InvalidState(format!(
            "match `{match_id}` was settled concurrently"
        )));
    }

    match &result {
        Ok(outcome) => info!(
            %match_id,
            home_goals = score.home_goals,
            away_goals = score.away_goals,
            verdict = ?outcome.verdict,
            eliminated = outcome.eliminated.len(),
            "match settled"
        ),
        Err(err) => warn!(%match_id, error = %err, "settlement rolled back"),
    }

    result
}

/// After a conflicted rollback, tell a lost race on this match apart from any other write conflict.
async fn settled_concurrently(store: &dyn PoolStore, match_id: Uuid) -> bool {
    match store.find_match(match_id).await {
        Ok(Some(details)) => details.fixture.status == MatchStatus::Finished,
        Ok(None) => false,
        Err(err) => {
            warn!(%match_id, error = %err, "could not re-read match after a storage conflict");
            false
        }
    }
}

async fn settle_in_transaction(
    tx: &mut (dyn PoolTransaction + 'static),
    match_id: Uuid,
    score: Score,
) -> Result<SettlementOutcome, ServiceError> {
    let source = tx
        .load_match_for_settlement(match_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` does not exist")))?;

    if source.details.fixture.status == MatchStatus::Finished {
        return Err(ServiceError::InvalidState(format!(
            "match `{match_id}` has already been settled"
        )));
    }

    if !tx
        .finish_match(match_id, score.home_goals, score.away_goals)
        .await?
    {
        return Err(ServiceError::InvalidState(format!(
            "match `{match_id}` was settled concurrently"
        )));
    }

    let mut details = source.details;
    details.fixture.home_goals = Some(score.home_goals);
    details.fixture.away_goals = Some(score.away_goals);
    details.fixture.status = MatchStatus::Finished;

    let verdict = MatchVerdict::from_score(score);
    let winning_team = verdict.winning_team(details.home_team.id, details.away_team.id);

    let mut edition_ids = IndexSet::new();
    let mut eliminated_ids = HashSet::new();
    let mut eliminated = Vec::new();

    for entry in &source.picks {
        let participant = &entry.participant;
        edition_ids.insert(participant.edition_id);

        match evaluate_pick(winning_team, entry.pick.team_id, participant.status) {
            PickDecision::Ignore | PickDecision::Survive => {}
            PickDecision::Eliminate => {
                if !eliminated_ids.insert(participant.id) {
                    continue;
                }
                tx.eliminate_participant(participant.id).await?;
                let name = display_name(&entry.user);
                debug!(
                    %match_id,
                    participant_id = %participant.id,
                    display_name = %name,
                    "participant eliminated"
                );
                eliminated.push(EliminatedParticipant {
                    participant_id: participant.id,
                    edition_id: participant.edition_id,
                    display_name: name,
                });
            }
        }
    }

    let mut editions = Vec::with_capacity(edition_ids.len());
    for edition_id in edition_ids {
        let active = tx.count_active_participants(edition_id).await?;
        let finished = edition_should_finish(active);
        if finished && tx.finish_edition(edition_id).await? {
            info!(%edition_id, active, "edition finished");
        }
        editions.push(EditionOutcome {
            edition_id,
            active_participants_remaining: active,
            finished,
        });
    }

    Ok(SettlementOutcome {
        details,
        score,
        verdict,
        eliminated,
        editions,
    })
}
