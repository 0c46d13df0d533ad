pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::dao::{
    models::{
        EditionEntity, MatchDetailsEntity, ParticipantCountsEntity, SettlementSourceEntity,
    },
    storage::{StorageError, StorageResult},
};

/// Abstraction over the persistence layer holding matches, picks, participants and editions.
pub trait PoolStore: Send + Sync {
    /// Open a transaction; every write of a settlement goes through the returned handle.
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn PoolTransaction>>>;
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchDetailsEntity>>>;
    /// List the matches of one matchday ordered by kickoff.
    fn list_matches_by_matchday(
        &self,
        matchday: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchDetailsEntity>>>;
    fn find_edition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EditionEntity>>>;
    fn count_participants(
        &self,
        edition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<ParticipantCountsEntity>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Scoped handle of an open transaction. Nothing written through it is visible
/// to other callers until [`PoolTransaction::commit`] succeeds.
pub trait PoolTransaction: Send {
    /// Load the match, its teams and every pick placed on it.
    fn load_match_for_settlement(
        &mut self,
        match_id: Uuid,
    ) -> BoxFuture<'_, StorageResult<Option<SettlementSourceEntity>>>;
    /// Record the final score and move the match to FINISHED.
    ///
    /// Returns `false` when the match was not SCHEDULED anymore at write time.
    fn finish_match(
        &mut self,
        match_id: Uuid,
        home_goals: u32,
        away_goals: u32,
    ) -> BoxFuture<'_, StorageResult<bool>>;
    fn eliminate_participant(&mut self, participant_id: Uuid) -> BoxFuture<'_, StorageResult<()>>;
    fn count_active_participants(&mut self, edition_id: Uuid) -> BoxFuture<'_, StorageResult<u64>>;
    /// Move the edition to FINISHED. Returns `false` when it already was.
    fn finish_edition(&mut self, edition_id: Uuid) -> BoxFuture<'_, StorageResult<bool>>;
    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>>;
    fn rollback(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>>;
}

/// Run `work` inside a transaction, committing when it succeeds and rolling back otherwise.
pub async fn with_transaction<T, E, F>(store: &dyn PoolStore, work: F) -> Result<T, E>
where
    F: for<'t> FnOnce(&'t mut (dyn PoolTransaction + 'static)) -> BoxFuture<'t, Result<T, E>>,
    E: From<StorageError>,
{
    let mut transaction = store.begin().await?;

    match work(transaction.as_mut()).await {
        Ok(value) => {
            transaction.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = transaction.rollback().await {
                warn!(error = %rollback_err, "failed to roll back transaction after work error");
            }
            Err(err)
        }
    }
}
