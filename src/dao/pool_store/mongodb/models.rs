use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{
    EditionEntity, EditionStatus, MatchEntity, MatchStatus, ParticipantEntity, ParticipantStatus,
    PickEntity, TeamEntity, UserEntity,
};

pub const TEAM_COLLECTION_NAME: &str = "teams";
pub const USER_COLLECTION_NAME: &str = "users";
pub const EDITION_COLLECTION_NAME: &str = "editions";
pub const PARTICIPANT_COLLECTION_NAME: &str = "participants";
pub const MATCH_COLLECTION_NAME: &str = "matches";
pub const PICK_COLLECTION_NAME: &str = "picks";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    short_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    #[serde(default)]
    alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoEditionDocument {
    #[serde(rename = "_id")]
    id: String,
    league_id: String,
    name: String,
    status: EditionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoParticipantDocument {
    #[serde(rename = "_id")]
    id: String,
    edition_id: String,
    user_id: String,
    status: ParticipantStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    matchday: u32,
    kickoff_at: DateTime,
    home_team_id: String,
    away_team_id: String,
    #[serde(default)]
    home_goals: Option<u32>,
    #[serde(default)]
    away_goals: Option<u32>,
    status: MatchStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPickDocument {
    #[serde(rename = "_id")]
    id: String,
    participant_id: String,
    match_id: String,
    team_id: String,
    created_at: DateTime,
}

fn parse_id(collection: &'static str, value: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(value).map_err(|source| MongoDaoError::InvalidDocument {
        collection,
        id: value.to_owned(),
        source,
    })
}

impl TryFrom<MongoTeamDocument> for TeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTeamDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(TEAM_COLLECTION_NAME, &value.id)?,
            name: value.name,
            short_code: value.short_code,
        })
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(USER_COLLECTION_NAME, &value.id)?,
            email: value.email,
            alias: value.alias,
        })
    }
}

impl TryFrom<MongoEditionDocument> for EditionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoEditionDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(EDITION_COLLECTION_NAME, &value.id)?,
            league_id: parse_id(EDITION_COLLECTION_NAME, &value.league_id)?,
            name: value.name,
            status: value.status,
        })
    }
}

impl TryFrom<MongoParticipantDocument> for ParticipantEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoParticipantDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(PARTICIPANT_COLLECTION_NAME, &value.id)?,
            edition_id: parse_id(PARTICIPANT_COLLECTION_NAME, &value.edition_id)?,
            user_id: parse_id(PARTICIPANT_COLLECTION_NAME, &value.user_id)?,
            status: value.status,
        })
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(MATCH_COLLECTION_NAME, &value.id)?,
            matchday: value.matchday,
            kickoff_at: value.kickoff_at.to_system_time(),
            home_team_id: parse_id(MATCH_COLLECTION_NAME, &value.home_team_id)?,
            away_team_id: parse_id(MATCH_COLLECTION_NAME, &value.away_team_id)?,
            home_goals: value.home_goals,
            away_goals: value.away_goals,
            status: value.status,
        })
    }
}

impl TryFrom<MongoPickDocument> for PickEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPickDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(PICK_COLLECTION_NAME, &value.id)?,
            participant_id: parse_id(PICK_COLLECTION_NAME, &value.participant_id)?,
            match_id: parse_id(PICK_COLLECTION_NAME, &value.match_id)?,
            team_id: parse_id(PICK_COLLECTION_NAME, &value.team_id)?,
            created_at: value.created_at.to_system_time(),
        })
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

/// Filter matching any document whose `_id` is in `ids`.
pub fn doc_ids_in(ids: impl IntoIterator<Item = Uuid>) -> Document {
    let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    doc! {"_id": {"$in": ids}}
}
