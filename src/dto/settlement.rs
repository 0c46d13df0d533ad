use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::matches::{MatchSummary, TeamSummary};
use crate::state::settlement::{EditionOutcome, MatchVerdict, SettlementOutcome};

/// Final score submitted by an administrator.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleMatchRequest {
    #[validate(range(min = 0, message = "homeGoals must be zero or greater"))]
    pub home_goals: i64,
    #[validate(range(min = 0, message = "awayGoals must be zero or greater"))]
    pub away_goals: i64,
}

/// How the match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOutcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl From<MatchVerdict> for MatchOutcome {
    fn from(value: MatchVerdict) -> Self {
        match value {
            MatchVerdict::HomeWin => MatchOutcome::HomeWin,
            MatchVerdict::AwayWin => MatchOutcome::AwayWin,
            MatchVerdict::Draw => MatchOutcome::Draw,
        }
    }
}

/// Survivor state of one edition touched by the settlement.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditionSettlement {
    pub edition_id: Uuid,
    pub active_participants_remaining: u64,
    pub edition_finished: bool,
}

impl From<EditionOutcome> for EditionSettlement {
    fn from(value: EditionOutcome) -> Self {
        Self {
            edition_id: value.edition_id,
            active_participants_remaining: value.active_participants_remaining,
            edition_finished: value.finished,
        }
    }
}

/// Settlement report returned by `POST /matches/{matchId}/result`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    /// Match as stored after the settlement.
    pub match_summary: MatchSummary,
    pub outcome: MatchOutcome,
    /// Winning team; absent on a draw.
    pub winner: Option<TeamSummary>,
    /// Display names of the participants eliminated by this match, in pick order.
    pub eliminated: Vec<String>,
    /// Whether the edition of the earliest pick is finished.
    pub edition_finished: bool,
    /// Active participants left in the edition of the earliest pick; absent when nobody picked the match.
    pub active_participants_remaining: Option<u64>,
    /// Every edition with a pick on the match.
    pub editions: Vec<EditionSettlement>,
}

impl From<SettlementOutcome> for SettlementReport {
    fn from(value: SettlementOutcome) -> Self {
        let primary = value.primary_edition().cloned();
        let winner = match value.verdict {
            MatchVerdict::HomeWin => Some(value.details.home_team.clone().into()),
            MatchVerdict::AwayWin => Some(value.details.away_team.clone().into()),
            MatchVerdict::Draw => None,
        };

        Self {
            match_summary: value.details.into(),
            outcome: value.verdict.into(),
            winner,
            eliminated: value
                .eliminated
                .into_iter()
                .map(|participant| participant.display_name)
                .collect(),
            edition_finished: primary.as_ref().is_some_and(|edition| edition.finished),
            active_participants_remaining: primary
                .map(|edition| edition.active_participants_remaining),
            editions: value.editions.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_goals_fail_validation() {
        let request = SettleMatchRequest {
            home_goals: -1,
            away_goals: 2,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("home_goals"));
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let request: SettleMatchRequest =
            serde_json::from_str(r#"{"homeGoals": 3, "awayGoals": 0}"#).unwrap();
        assert_eq!((request.home_goals, request.away_goals), (3, 0));
        assert!(request.validate().is_ok());
    }
}
