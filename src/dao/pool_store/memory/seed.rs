//! JSON fixture loading for the in-memory store.

use std::{
    fs,
    path::Path,
    time::SystemTime,
};

use serde::Deserialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use super::{
    error::{MemoryResult, MemoryStoreError},
    store::PoolData,
};
use crate::dao::models::{
    EditionEntity, MatchEntity, MatchStatus, ParticipantEntity, PickEntity, TeamEntity,
    UserEntity,
};

#[derive(Debug, Deserialize)]
/// JSON representation of a seed file.
struct RawSeed {
    #[serde(default)]
    teams: Vec<TeamEntity>,
    #[serde(default)]
    users: Vec<UserEntity>,
    #[serde(default)]
    editions: Vec<EditionEntity>,
    #[serde(default)]
    participants: Vec<ParticipantEntity>,
    #[serde(default)]
    matches: Vec<RawMatch>,
    #[serde(default)]
    picks: Vec<RawPick>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    id: Uuid,
    matchday: u32,
    kickoff_at: String,
    home_team_id: Uuid,
    away_team_id: Uuid,
    #[serde(default)]
    home_goals: Option<u32>,
    #[serde(default)]
    away_goals: Option<u32>,
    #[serde(default)]
    status: Option<MatchStatus>,
}

#[derive(Debug, Deserialize)]
struct RawPick {
    id: Uuid,
    participant_id: Uuid,
    match_id: Uuid,
    team_id: Uuid,
    #[serde(default)]
    created_at: Option<String>,
}

/// Read and validate a seed file from disk.
pub fn load_seed(path: &Path) -> MemoryResult<PoolData> {
    let contents = fs::read_to_string(path).map_err(|source| MemoryStoreError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawSeed =
        serde_json::from_str(&contents).map_err(|source| MemoryStoreError::SeedParse {
            path: path.to_path_buf(),
            source,
        })?;
    raw.try_into()
}

impl TryFrom<RawSeed> for PoolData {
    type Error = MemoryStoreError;

    fn try_from(raw: RawSeed) -> Result<Self, Self::Error> {
        let mut data = PoolData::default();
        raw.teams.into_iter().for_each(|team| data.insert_team(team));
        raw.users.into_iter().for_each(|user| data.insert_user(user));
        raw.editions
            .into_iter()
            .for_each(|edition| data.insert_edition(edition));
        raw.participants
            .into_iter()
            .for_each(|participant| data.insert_participant(participant));

        for raw_match in raw.matches {
            data.insert_match(MatchEntity {
                id: raw_match.id,
                matchday: raw_match.matchday,
                kickoff_at: parse_timestamp(&raw_match.kickoff_at)?,
                home_team_id: raw_match.home_team_id,
                away_team_id: raw_match.away_team_id,
                home_goals: raw_match.home_goals,
                away_goals: raw_match.away_goals,
                status: raw_match.status.unwrap_or(MatchStatus::Scheduled),
            });
        }

        for raw_pick in raw.picks {
            let created_at = match raw_pick.created_at.as_deref() {
                Some(value) => parse_timestamp(value)?,
                None => SystemTime::UNIX_EPOCH,
            };
            data.insert_pick(PickEntity {
                id: raw_pick.id,
                participant_id: raw_pick.participant_id,
                match_id: raw_pick.match_id,
                team_id: raw_pick.team_id,
                created_at,
            });
        }

        data.validate_references()?;
        Ok(data)
    }
}

fn parse_timestamp(value: &str) -> MemoryResult<SystemTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(SystemTime::from)
        .map_err(|source| MemoryStoreError::InvalidTimestamp {
            value: value.to_owned(),
            source,
        })
}
