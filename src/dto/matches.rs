use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::format_system_time;
use crate::dao::models::{MatchDetailsEntity, TeamEntity};

/// Team reference embedded in match payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub short_code: String,
}

impl From<TeamEntity> for TeamSummary {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            short_code: value.short_code,
        }
    }
}

/// Match as exposed by the REST API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub id: Uuid,
    pub matchday: u32,
    /// Kickoff time (RFC 3339).
    pub kickoff_at: String,
    /// `SCHEDULED` or `FINISHED`.
    pub status: String,
    pub home_team: TeamSummary,
    pub away_team: TeamSummary,
    /// Final home score; absent until the match is settled.
    pub home_goals: Option<u32>,
    /// Final away score; absent until the match is settled.
    pub away_goals: Option<u32>,
}

impl From<MatchDetailsEntity> for MatchSummary {
    fn from(value: MatchDetailsEntity) -> Self {
        let MatchDetailsEntity {
            fixture,
            home_team,
            away_team,
        } = value;
        Self {
            id: fixture.id,
            matchday: fixture.matchday,
            kickoff_at: format_system_time(fixture.kickoff_at),
            status: fixture.status.as_str().to_owned(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_goals: fixture.home_goals,
            away_goals: fixture.away_goals,
        }
    }
}
