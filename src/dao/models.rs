use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Lifecycle of a match: scheduled until its result is recorded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Finished,
}

/// Survival status of a participant inside an edition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Active,
    Eliminated,
}

/// Lifecycle of an edition of the game within a league.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditionStatus {
    Open,
    InProgress,
    Finished,
}

impl MatchStatus {
    /// Persisted representation, as used in backend queries.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::Finished => "FINISHED",
        }
    }
}

impl ParticipantStatus {
    /// Persisted representation, as used in backend queries.
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantStatus::Active => "ACTIVE",
            ParticipantStatus::Eliminated => "ELIMINATED",
        }
    }
}

impl EditionStatus {
    /// Persisted representation, as used in backend queries.
    pub fn as_str(self) -> &'static str {
        match self {
            EditionStatus::Open => "OPEN",
            EditionStatus::InProgress => "IN_PROGRESS",
            EditionStatus::Finished => "FINISHED",
        }
    }
}

/// Football club taking part in matches. Reference data, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name of the club.
    pub name: String,
    /// Short code shown in compact views (e.g. "JUV").
    pub short_code: String,
}

/// Account owning participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    /// Optional public alias; the email is shown when unset.
    pub alias: Option<String>,
}

/// One run of the elimination game within a league.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditionEntity {
    pub id: Uuid,
    pub league_id: Uuid,
    pub name: String,
    pub status: EditionStatus,
}

/// A user's enrollment in one edition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantEntity {
    pub id: Uuid,
    pub edition_id: Uuid,
    pub user_id: Uuid,
    pub status: ParticipantStatus,
}

/// A scheduled or finished match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Stable identifier for the match.
    pub id: Uuid,
    /// Round the match belongs to.
    pub matchday: u32,
    /// Scheduled kickoff.
    pub kickoff_at: SystemTime,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    /// Final home score, set once the match is finished.
    pub home_goals: Option<u32>,
    /// Final away score, set once the match is finished.
    pub away_goals: Option<u32>,
    pub status: MatchStatus,
}

/// A participant's chosen team for one match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickEntity {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub match_id: Uuid,
    /// Side the participant backed.
    pub team_id: Uuid,
    /// When the pick was placed; defines evaluation order.
    pub created_at: SystemTime,
}

/// Match joined with both team records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDetailsEntity {
    pub fixture: MatchEntity,
    pub home_team: TeamEntity,
    pub away_team: TeamEntity,
}

/// Pick joined with its participant and the participant's user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickDetailsEntity {
    pub pick: PickEntity,
    pub participant: ParticipantEntity,
    pub user: UserEntity,
}

/// Everything the settlement engine reads for one match, loaded inside the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementSourceEntity {
    pub details: MatchDetailsEntity,
    /// Picks placed on the match, ordered by placement time.
    pub picks: Vec<PickDetailsEntity>,
}

/// Participant tallies for an edition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantCountsEntity {
    pub active: u64,
    pub eliminated: u64,
}
