use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::Error as MongoError,
    options::IndexOptions,
};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        EDITION_COLLECTION_NAME, MATCH_COLLECTION_NAME, MongoEditionDocument, MongoMatchDocument,
        MongoParticipantDocument, MongoPickDocument, MongoTeamDocument, MongoUserDocument,
        PARTICIPANT_COLLECTION_NAME, PICK_COLLECTION_NAME, TEAM_COLLECTION_NAME,
        USER_COLLECTION_NAME, doc_id, doc_ids_in,
    },
};
use crate::dao::{
    models::{
        EditionEntity, EditionStatus, MatchDetailsEntity, MatchEntity, MatchStatus,
        ParticipantCountsEntity, ParticipantEntity, ParticipantStatus, PickDetailsEntity,
        PickEntity, SettlementSourceEntity, TeamEntity, UserEntity,
    },
    pool_store::{PoolStore, PoolTransaction},
    storage::StorageResult,
};

/// MongoDB-backed [`PoolStore`]. Settlement relies on multi-document transactions, so the
/// server must run as a replica set.
#[derive(Clone)]
pub struct MongoPoolStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

#[derive(Clone)]
struct Collections {
    teams: Collection<MongoTeamDocument>,
    users: Collection<MongoUserDocument>,
    editions: Collection<MongoEditionDocument>,
    participants: Collection<MongoParticipantDocument>,
    matches: Collection<MongoMatchDocument>,
    picks: Collection<MongoPickDocument>,
}

impl Collections {
    fn new(database: &Database) -> Self {
        Self {
            teams: database.collection(TEAM_COLLECTION_NAME),
            users: database.collection(USER_COLLECTION_NAME),
            editions: database.collection(EDITION_COLLECTION_NAME),
            participants: database.collection(PARTICIPANT_COLLECTION_NAME),
            matches: database.collection(MATCH_COLLECTION_NAME),
            picks: database.collection(PICK_COLLECTION_NAME),
        }
    }
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoPoolStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let indexes: [(&'static str, &'static str, Document, &str); 3] = [
            (
                MATCH_COLLECTION_NAME,
                "matchday,kickoff_at",
                doc! {"matchday": 1, "kickoff_at": 1},
                "match_matchday_idx",
            ),
            (PICK_COLLECTION_NAME, "match_id", doc! {"match_id": 1}, "pick_match_idx"),
            (
                PARTICIPANT_COLLECTION_NAME,
                "edition_id,status",
                doc! {"edition_id": 1, "status": 1},
                "participant_edition_idx",
            ),
        ];

        for (collection, index, keys, name) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(Some(name.to_owned())).build())
                .build();
            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collections(&self) -> Collections {
        Collections::new(&self.database().await)
    }

    async fn begin_transaction(&self) -> MongoResult<MongoTransaction> {
        let (client, database) = {
            let guard = self.inner.state.read().await;
            (guard.client.clone(), guard.database.clone())
        };

        let mut session = client
            .start_session()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                operation: "open",
                source,
            })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                operation: "start",
                source,
            })?;

        Ok(MongoTransaction {
            session,
            collections: Collections::new(&database),
        })
    }

    async fn find_match(&self, id: Uuid) -> MongoResult<Option<MatchDetailsEntity>> {
        let collections = self.collections().await;
        let Some(document) =
            find_one(&collections.matches, MATCH_COLLECTION_NAME, doc_id(id), None).await?
        else {
            return Ok(None);
        };

        let fixture = MatchEntity::try_from(document)?;
        let details = match_details(&collections, vec![fixture], None).await?;
        Ok(details.into_iter().next())
    }

    async fn list_matches_by_matchday(&self, matchday: u32) -> MongoResult<Vec<MatchDetailsEntity>> {
        let collections = self.collections().await;
        let documents = find_all(
            &collections.matches,
            MATCH_COLLECTION_NAME,
            doc! {"matchday": i64::from(matchday)},
            Some(doc! {"kickoff_at": 1, "_id": 1}),
            None,
        )
        .await?;

        let fixtures = into_entities::<_, MatchEntity>(documents)?;
        match_details(&collections, fixtures, None).await
    }

    async fn find_edition(&self, id: Uuid) -> MongoResult<Option<EditionEntity>> {
        let collections = self.collections().await;
        find_one(&collections.editions, EDITION_COLLECTION_NAME, doc_id(id), None)
            .await?
            .map(EditionEntity::try_from)
            .transpose()
    }

    async fn count_participants(&self, edition_id: Uuid) -> MongoResult<ParticipantCountsEntity> {
        let collections = self.collections().await;
        let mut counts = ParticipantCountsEntity::default();
        for status in [ParticipantStatus::Active, ParticipantStatus::Eliminated] {
            let count = collections
                .participants
                .count_documents(doc! {"edition_id": edition_id.to_string(), "status": status.as_str()})
                .await
                .map_err(query_error(PARTICIPANT_COLLECTION_NAME))?;
            match status {
                ParticipantStatus::Active => counts.active = count,
                ParticipantStatus::Eliminated => counts.eliminated = count,
            }
        }
        Ok(counts)
    }
}

impl PoolStore for MongoPoolStore {
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn PoolTransaction>>> {
        let store = self.clone();
        Box::pin(async move {
            let transaction = store.begin_transaction().await?;
            Ok(Box::new(transaction) as Box<dyn PoolTransaction>)
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchDetailsEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn list_matches_by_matchday(
        &self,
        matchday: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchDetailsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_matches_by_matchday(matchday)
                .await
                .map_err(Into::into)
        })
    }

    fn find_edition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EditionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_edition(id).await.map_err(Into::into) })
    }

    fn count_participants(
        &self,
        edition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<ParticipantCountsEntity>> {
        let store = self.clone();
        Box::pin(async move { store.count_participants(edition_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

struct MongoTransaction {
    session: ClientSession,
    collections: Collections,
}

impl PoolTransaction for MongoTransaction {
    fn load_match_for_settlement(
        &mut self,
        match_id: Uuid,
    ) -> BoxFuture<'_, StorageResult<Option<SettlementSourceEntity>>> {
        Box::pin(async move {
            settlement_source(&self.collections, &mut self.session, match_id)
                .await
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
            let result = self
                .collections
                .matches
                .update_one(
                    doc! {"_id": match_id.to_string(), "status": MatchStatus::Scheduled.as_str()},
                    doc! {"$set": {
                        "home_goals": i64::from(home_goals),
                        "away_goals": i64::from(away_goals),
                        "status": MatchStatus::Finished.as_str(),
                    }},
                )
                .session(&mut self.session)
                .await
                .map_err(update_error(MATCH_COLLECTION_NAME))?;
            Ok(result.matched_count > 0)
        })
    }

    fn eliminate_participant(&mut self, participant_id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let result = self
                .collections
                .participants
                .update_one(
                    doc! {
                        "_id": participant_id.to_string(),
                        "status": ParticipantStatus::Active.as_str(),
                    },
                    doc! {"$set": {"status": ParticipantStatus::Eliminated.as_str()}},
                )
                .session(&mut self.session)
                .await
                .map_err(update_error(PARTICIPANT_COLLECTION_NAME))?;
            if result.matched_count == 0 {
                return Err(MongoDaoError::MissingReference {
                    kind: "active participant",
                    id: participant_id,
                    referenced_by: "elimination".into(),
                }
                .into());
            }
            Ok(())
        })
    }

    fn count_active_participants(&mut self, edition_id: Uuid) -> BoxFuture<'_, StorageResult<u64>> {
        Box::pin(async move {
            let count = self
                .collections
                .participants
                .count_documents(doc! {
                    "edition_id": edition_id.to_string(),
                    "status": ParticipantStatus::Active.as_str(),
                })
                .session(&mut self.session)
                .await
                .map_err(query_error(PARTICIPANT_COLLECTION_NAME))?;
            Ok(count)
        })
    }

    fn finish_edition(&mut self, edition_id: Uuid) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(async move {
            let result = self
                .collections
                .editions
                .update_one(
                    doc! {
                        "_id": edition_id.to_string(),
                        "status": {"$ne": EditionStatus::Finished.as_str()},
                    },
                    doc! {"$set": {"status": EditionStatus::Finished.as_str()}},
                )
                .session(&mut self.session)
                .await
                .map_err(update_error(EDITION_COLLECTION_NAME))?;
            Ok(result.matched_count > 0)
        })
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        let mut transaction = *self;
        Box::pin(async move {
            transaction
                .session
                .commit_transaction()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    operation: "commit",
                    source,
                })?;
            Ok(())
        })
    }

    fn rollback(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        let mut transaction = *self;
        Box::pin(async move {
            transaction
                .session
                .abort_transaction()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    operation: "abort",
                    source,
                })?;
            Ok(())
        })
    }
}

async fn settlement_source(
    collections: &Collections,
    session: &mut ClientSession,
    match_id: Uuid,
) -> MongoResult<Option<SettlementSourceEntity>> {
    let Some(document) = find_one(
        &collections.matches,
        MATCH_COLLECTION_NAME,
        doc_id(match_id),
        Some(&mut *session),
    )
    .await?
    else {
        return Ok(None);
    };

    let fixture = MatchEntity::try_from(document)?;
    let Some(details) = match_details(collections, vec![fixture], Some(&mut *session))
        .await?
        .into_iter()
        .next()
    else {
        return Ok(None);
    };

    let picks = into_entities::<_, PickEntity>(
        find_all(
            &collections.picks,
            PICK_COLLECTION_NAME,
            doc! {"match_id": match_id.to_string()},
            Some(doc! {"created_at": 1, "_id": 1}),
            Some(&mut *session),
        )
        .await?,
    )?;

    let participant_ids: HashSet<Uuid> = picks.iter().map(|pick| pick.participant_id).collect();
    let participant_documents = find_all(
        &collections.participants,
        PARTICIPANT_COLLECTION_NAME,
        doc_ids_in(participant_ids),
        None,
        Some(&mut *session),
    )
    .await?;
    let participants = index_by_id(
        into_entities::<_, ParticipantEntity>(participant_documents)?,
        |participant| participant.id,
    );

    let user_ids: HashSet<Uuid> = participants.values().map(|p| p.user_id).collect();
    let user_documents = find_all(
        &collections.users,
        USER_COLLECTION_NAME,
        doc_ids_in(user_ids),
        None,
        Some(&mut *session),
    )
    .await?;
    let users = index_by_id(into_entities::<_, UserEntity>(user_documents)?, |user| user.id);

    let mut entries = Vec::with_capacity(picks.len());
    for pick in picks {
        let referenced_by = format!("pick `{}`", pick.id);
        let participant = lookup(&participants, "participant", pick.participant_id, &referenced_by)?;
        let user = lookup(&users, "user", participant.user_id, &referenced_by)?;
        entries.push(PickDetailsEntity {
            participant: participant.clone(),
            user: user.clone(),
            pick,
        });
    }

    Ok(Some(SettlementSourceEntity {
        details,
        picks: entries,
    }))
}

async fn match_details(
    collections: &Collections,
    fixtures: Vec<MatchEntity>,
    session: Option<&mut ClientSession>,
) -> MongoResult<Vec<MatchDetailsEntity>> {
    let team_ids: HashSet<Uuid> = fixtures
        .iter()
        .flat_map(|fixture| [fixture.home_team_id, fixture.away_team_id])
        .collect();
    let teams = index_by_id(
        into_entities::<_, TeamEntity>(
            find_all(
                &collections.teams,
                TEAM_COLLECTION_NAME,
                doc_ids_in(team_ids),
                None,
                session,
            )
            .await?,
        )?,
        |team| team.id,
    );

    fixtures
        .into_iter()
        .map(|fixture| {
            let referenced_by = format!("match `{}`", fixture.id);
            let home_team = lookup(&teams, "team", fixture.home_team_id, &referenced_by)?.clone();
            let away_team = lookup(&teams, "team", fixture.away_team_id, &referenced_by)?.clone();
            Ok(MatchDetailsEntity {
                fixture,
                home_team,
                away_team,
            })
        })
        .collect()
}

async fn find_one<T>(
    collection: &Collection<T>,
    name: &'static str,
    filter: Document,
    session: Option<&mut ClientSession>,
) -> MongoResult<Option<T>>
where
    T: DeserializeOwned + Send + Sync,
{
    let action = collection.find_one(filter);
    let document = match session {
        Some(session) => action.session(session).await,
        None => action.await,
    };
    document.map_err(query_error(name))
}

async fn find_all<T>(
    collection: &Collection<T>,
    name: &'static str,
    filter: Document,
    sort: Option<Document>,
    session: Option<&mut ClientSession>,
) -> MongoResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut action = collection.find(filter);
    if let Some(sort) = sort {
        action = action.sort(sort);
    }

    match session {
        Some(session) => {
            let mut cursor = action
                .session(&mut *session)
                .await
                .map_err(query_error(name))?;
            cursor
                .stream(session)
                .try_collect()
                .await
                .map_err(query_error(name))
        }
        None => action
            .await
            .map_err(query_error(name))?
            .try_collect()
            .await
            .map_err(query_error(name)),
    }
}

fn into_entities<D, E>(documents: Vec<D>) -> MongoResult<Vec<E>>
where
    E: TryFrom<D, Error = MongoDaoError>,
{
    documents.into_iter().map(E::try_from).collect()
}

fn index_by_id<T>(records: Vec<T>, id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, T> {
    records.into_iter().map(|record| (id(&record), record)).collect()
}

fn lookup<'a, T>(
    records: &'a HashMap<Uuid, T>,
    kind: &'static str,
    id: Uuid,
    referenced_by: &str,
) -> MongoResult<&'a T> {
    records
        .get(&id)
        .ok_or_else(|| MongoDaoError::MissingReference {
            kind,
            id,
            referenced_by: referenced_by.to_owned(),
        })
}

fn query_error(collection: &'static str) -> impl Fn(MongoError) -> MongoDaoError {
    move |source| MongoDaoError::Query { collection, source }
}

fn update_error(collection: &'static str) -> impl Fn(MongoError) -> MongoDaoError {
    move |source| MongoDaoError::Update { collection, source }
}
