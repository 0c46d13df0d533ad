use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::error::{MemoryResult, MemoryStoreError};
use crate::dao::{
    models::{
        EditionEntity, EditionStatus, MatchDetailsEntity, MatchEntity, MatchStatus,
        ParticipantCountsEntity, ParticipantEntity, ParticipantStatus, PickDetailsEntity,
        PickEntity, SettlementSourceEntity, TeamEntity, UserEntity,
    },
    pool_store::{PoolStore, PoolTransaction},
    storage::StorageResult,
};

/// Full content of the in-memory pool database.
#[derive(Debug, Clone, Default)]
pub struct PoolData {
    pub teams: HashMap<Uuid, TeamEntity>,
    pub users: HashMap<Uuid, UserEntity>,
    pub editions: HashMap<Uuid, EditionEntity>,
    pub participants: HashMap<Uuid, ParticipantEntity>,
    pub matches: HashMap<Uuid, MatchEntity>,
    /// Picks in insertion order.
    pub picks: Vec<PickEntity>,
}

impl PoolData {
    pub fn insert_team(&mut self, team: TeamEntity) {
        self.teams.insert(team.id, team);
    }

    pub fn insert_user(&mut self, user: UserEntity) {
        self.users.insert(user.id, user);
    }

    pub fn insert_edition(&mut self, edition: EditionEntity) {
        self.editions.insert(edition.id, edition);
    }

    pub fn insert_participant(&mut self, participant: ParticipantEntity) {
        self.participants.insert(participant.id, participant);
    }

    pub fn insert_match(&mut self, fixture: MatchEntity) {
        self.matches.insert(fixture.id, fixture);
    }

    pub fn insert_pick(&mut self, pick: PickEntity) {
        self.picks.push(pick);
    }

    /// Check that every reference between records resolves.
    pub fn validate_references(&self) -> MemoryResult<()> {
        for participant in self.participants.values() {
            let referenced_by = format!("participant `{}`", participant.id);
            require(&self.editions, "edition", participant.edition_id, &referenced_by)?;
            require(&self.users, "user", participant.user_id, &referenced_by)?;
        }
        for fixture in self.matches.values() {
            let referenced_by = format!("match `{}`", fixture.id);
            require(&self.teams, "team", fixture.home_team_id, &referenced_by)?;
            require(&self.teams, "team", fixture.away_team_id, &referenced_by)?;
        }
        for pick in &self.picks {
            let referenced_by = format!("pick `{}`", pick.id);
            require(&self.participants, "participant", pick.participant_id, &referenced_by)?;
            require(&self.matches, "match", pick.match_id, &referenced_by)?;
            require(&self.teams, "team", pick.team_id, &referenced_by)?;
        }
        Ok(())
    }

    fn details(&self, fixture: &MatchEntity) -> MemoryResult<MatchDetailsEntity> {
        let referenced_by = format!("match `{}`", fixture.id);
        let home_team = require(&self.teams, "team", fixture.home_team_id, &referenced_by)?;
        let away_team = require(&self.teams, "team", fixture.away_team_id, &referenced_by)?;
        Ok(MatchDetailsEntity {
            fixture: fixture.clone(),
            home_team: home_team.clone(),
            away_team: away_team.clone(),
        })
    }

    fn find_match(&self, id: Uuid) -> MemoryResult<Option<MatchDetailsEntity>> {
        self.matches
            .get(&id)
            .map(|fixture| self.details(fixture))
            .transpose()
    }

    fn matchday(&self, matchday: u32) -> MemoryResult<Vec<MatchDetailsEntity>> {
        let mut fixtures: Vec<&MatchEntity> = self
            .matches
            .values()
            .filter(|fixture| fixture.matchday == matchday)
            .collect();
        fixtures.sort_by_key(|fixture| (fixture.kickoff_at, fixture.id));
        fixtures
            .into_iter()
            .map(|fixture| self.details(fixture))
            .collect()
    }

    fn settlement_source(&self, match_id: Uuid) -> MemoryResult<Option<SettlementSourceEntity>> {
        let Some(details) = self.find_match(match_id)? else {
            return Ok(None);
        };

        let mut picks = Vec::new();
        for pick in self.picks.iter().filter(|pick| pick.match_id == match_id) {
            let referenced_by = format!("pick `{}`", pick.id);
            let participant =
                require(&self.participants, "participant", pick.participant_id, &referenced_by)?;
            let user = require(&self.users, "user", participant.user_id, &referenced_by)?;
            picks.push(PickDetailsEntity {
                pick: pick.clone(),
                participant: participant.clone(),
                user: user.clone(),
            });
        }
        picks.sort_by_key(|entry| entry.pick.created_at);

        Ok(Some(SettlementSourceEntity { details, picks }))
    }

    fn counts(&self, edition_id: Uuid) -> ParticipantCountsEntity {
        self.participants
            .values()
            .filter(|participant| participant.edition_id == edition_id)
            .fold(ParticipantCountsEntity::default(), |mut counts, participant| {
                match participant.status {
                    ParticipantStatus::Active => counts.active += 1,
                    ParticipantStatus::Eliminated => counts.eliminated += 1,
                }
                counts
            })
    }
}

fn require<'a, T>(
    records: &'a HashMap<Uuid, T>,
    kind: &'static str,
    id: Uuid,
    referenced_by: &str,
) -> MemoryResult<&'a T> {
    records
        .get(&id)
        .ok_or_else(|| MemoryStoreError::MissingReference {
            kind,
            id,
            referenced_by: referenced_by.to_owned(),
        })
}

/// Process-local [`PoolStore`] used for development, demos and tests.
///
/// Transactions take the data lock for their whole lifetime and work on a copy, so they are
/// serialized and only become visible on commit.
#[derive(Clone, Default)]
pub struct MemoryPoolStore {
    data: Arc<Mutex<PoolData>>,
}

impl MemoryPoolStore {
    pub fn new(data: PoolData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Clone the committed content of the store.
    pub async fn snapshot(&self) -> PoolData {
        self.data.lock().await.clone()
    }
}

impl PoolStore for MemoryPoolStore {
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn PoolTransaction>>> {
        let data = self.data.clone();
        Box::pin(async move {
            let guard = data.lock_owned().await;
            let working = guard.clone();
            Ok(Box::new(MemoryTransaction { guard, working }) as Box<dyn PoolTransaction>)
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchDetailsEntity>>> {
        let data = self.data.clone();
        Box::pin(async move { data.lock().await.find_match(id).map_err(Into::into) })
    }

    fn list_matches_by_matchday(
        &self,
        matchday: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchDetailsEntity>>> {
        let data = self.data.clone();
        Box::pin(async move { data.lock().await.matchday(matchday).map_err(Into::into) })
    }

    fn find_edition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EditionEntity>>> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.lock().await.editions.get(&id).cloned()) })
    }

    fn count_participants(
        &self,
        edition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<ParticipantCountsEntity>> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.lock().await.counts(edition_id)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<PoolData>,
    working: PoolData,
}

impl PoolTransaction for MemoryTransaction {
    fn load_match_for_settlement(
        &mut self,
        match_id: Uuid,
    ) -> BoxFuture<'_, StorageResult<Option<SettlementSourceEntity>>> {
        Box::pin(async move {
            self.working
                .settlement_source(match_id)
                .map_err(Into::into)
        })
    }

    fn finish_match(
        &mut self,
        match_id: Uuid,
        home_goals: u32,
        away_goals: u32,
    ) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(async move {
            let Some(fixture) = self.working.matches.get_mut(&match_id) else {
                return Ok(false);
            };
            if fixture.status != MatchStatus::Scheduled {
                return Ok(false);
            }
            fixture.home_goals = Some(home_goals);
            fixture.away_goals = Some(away_goals);
            fixture.status = MatchStatus::Finished;
            Ok(true)
        })
    }

    fn eliminate_participant(&mut self, participant_id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let participant = self
                .working
                .participants
                .get_mut(&participant_id)
                .filter(|participant| participant.status == ParticipantStatus::Active)
                .ok_or_else(|| MemoryStoreError::MissingReference {
                    kind: "active participant",
                    id: participant_id,
                    referenced_by: "elimination".into(),
                })?;
            participant.status = ParticipantStatus::Eliminated;
            Ok(())
        })
    }

    fn count_active_participants(&mut self, edition_id: Uuid) -> BoxFuture<'_, StorageResult<u64>> {
        Box::pin(async move { Ok(self.working.counts(edition_id).active) })
    }

    fn finish_edition(&mut self, edition_id: Uuid) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(async move {
            match self.working.editions.get_mut(&edition_id) {
                Some(edition) if edition.status != EditionStatus::Finished => {
                    edition.status = EditionStatus::Finished;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        let MemoryTransaction { mut guard, working } = *self;
        Box::pin(async move {
            *guard = working;
            Ok(())
        })
    }

    fn rollback(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        drop(self);
        Box::pin(async { Ok(()) })
    }
}
