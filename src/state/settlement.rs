//! Pure settlement rules: who won, who survives, when an edition is over.

use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::{MatchDetailsEntity, ParticipantStatus, UserEntity};

/// Validated final score of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home_goals: u32,
    pub away_goals: u32,
}

/// Error returned when a goal count cannot be a football score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{side} goals must be a non-negative integer (got {value})")]
pub struct InvalidScore {
    /// Which side carried the bad value ("home" or "away").
    pub side: &'static str,
    /// Value received from the caller.
    pub value: i64,
}

impl Score {
    /// Validate raw goal counts received at the boundary.
    pub fn try_new(home_goals: i64, away_goals: i64) -> Result<Self, InvalidScore> {
        let home = u32::try_from(home_goals).map_err(|_| InvalidScore {
            side: "home",
            value: home_goals,
        })?;
        let away = u32::try_from(away_goals).map_err(|_| InvalidScore {
            side: "away",
            value: away_goals,
        })?;
        Ok(Self {
            home_goals: home,
            away_goals: away,
        })
    }
}

/// Outcome of a match from the pool's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    HomeWin,
    AwayWin,
    Draw,
}

impl MatchVerdict {
    pub fn from_score(score: Score) -> Self {
        match score.home_goals.cmp(&score.away_goals) {
            std::cmp::Ordering::Greater => MatchVerdict::HomeWin,
            std::cmp::Ordering::Less => MatchVerdict::AwayWin,
            std::cmp::Ordering::Equal => MatchVerdict::Draw,
        }
    }

    /// Team that won, `None` on a draw.
    pub fn winning_team(self, home_team_id: Uuid, away_team_id: Uuid) -> Option<Uuid> {
        match self {
            MatchVerdict::HomeWin => Some(home_team_id),
            MatchVerdict::AwayWin => Some(away_team_id),
            MatchVerdict::Draw => None,
        }
    }
}

/// What happens to a participant because of one pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickDecision {
    /// Participant was already eliminated; nothing is read or written.
    Ignore,
    Survive,
    Eliminate,
}

/// Decide the fate of a pick. A draw eliminates every active participant who picked the match.
pub fn evaluate_pick(
    winning_team: Option<Uuid>,
    picked_team: Uuid,
    status: ParticipantStatus,
) -> PickDecision {
    if status != ParticipantStatus::Active {
        return PickDecision::Ignore;
    }

    match winning_team {
        Some(winner) if winner == picked_team => PickDecision::Survive,
        _ => PickDecision::Eliminate,
    }
}

/// An edition ends once at most one participant is still standing.
pub fn edition_should_finish(active_participants: u64) -> bool {
    active_participants <= 1
}

/// Name shown for a participant: their alias, or their email when no alias is set.
pub fn display_name(user: &UserEntity) -> String {
    user.alias
        .as_deref()
        .map(str::trim)
        .filter(|alias| !alias.is_empty())
        .unwrap_or(user.email.as_str())
        .to_owned()
}

/// Participant eliminated by a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminatedParticipant {
    pub participant_id: Uuid,
    pub edition_id: Uuid,
    pub display_name: String,
}

/// State of one edition after a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionOutcome {
    pub edition_id: Uuid,
    pub active_participants_remaining: u64,
    /// True when the edition is FINISHED after the settlement.
    pub finished: bool,
}

/// Everything a settlement changed, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Match as persisted after the settlement.
    pub details: MatchDetailsEntity,
    pub score: Score,
    pub verdict: MatchVerdict,
    /// Eliminations in pick order.
    pub eliminated: Vec<EliminatedParticipant>,
    /// Editions touched by the match, in order of first appearance among the picks.
    pub editions: Vec<EditionOutcome>,
}

impl SettlementOutcome {
    /// Edition of the earliest pick, used for the top-level report fields.
    pub fn primary_edition(&self) -> Option<&EditionOutcome> {
        self.editions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(alias: Option<&str>) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: "keeper@example.com".into(),
            alias: alias.map(Into::into),
        }
    }

    #[test]
    fn verdict_follows_strict_comparison() {
        let score = |home, away| Score::try_new(home, away).unwrap();
        assert_eq!(MatchVerdict::from_score(score(2, 0)), MatchVerdict::HomeWin);
        assert_eq!(MatchVerdict::from_score(score(0, 1)), MatchVerdict::AwayWin);
        assert_eq!(MatchVerdict::from_score(score(3, 3)), MatchVerdict::Draw);
        assert_eq!(MatchVerdict::from_score(score(0, 0)), MatchVerdict::Draw);
    }

    #[test]
    fn negative_goals_are_rejected() {
        let err = Score::try_new(-1, 0).unwrap_err();
        assert_eq!(err.side, "home");
        let err = Score::try_new(1, -4).unwrap_err();
        assert_eq!(err.side, "away");
        assert_eq!(err.value, -4);
    }

    #[test]
    fn winning_team_maps_sides() {
        let (home, away) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(MatchVerdict::HomeWin.winning_team(home, away), Some(home));
        assert_eq!(MatchVerdict::AwayWin.winning_team(home, away), Some(away));
        assert_eq!(MatchVerdict::Draw.winning_team(home, away), None);
    }

    #[test]
    fn pick_on_winner_survives_and_others_fall() {
        let (home, away) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            evaluate_pick(Some(home), home, ParticipantStatus::Active),
            PickDecision::Survive
        );
        assert_eq!(
            evaluate_pick(Some(home), away, ParticipantStatus::Active),
            PickDecision::Eliminate
        );
    }

    #[test]
    fn draw_eliminates_every_active_pick() {
        let (home, away) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            evaluate_pick(None, home, ParticipantStatus::Active),
            PickDecision::Eliminate
        );
        assert_eq!(
            evaluate_pick(None, away, ParticipantStatus::Active),
            PickDecision::Eliminate
        );
    }

    #[test]
    fn eliminated_participants_are_ignored() {
        let home = Uuid::new_v4();
        assert_eq!(
            evaluate_pick(Some(home), home, ParticipantStatus::Eliminated),
            PickDecision::Ignore
        );
        assert_eq!(
            evaluate_pick(None, home, ParticipantStatus::Eliminated),
            PickDecision::Ignore
        );
    }

    #[test]
    fn edition_finishes_with_one_or_no_survivor() {
        assert!(edition_should_finish(0));
        assert!(edition_should_finish(1));
        assert!(!edition_should_finish(2));
    }

    #[test]
    fn display_name_prefers_alias() {
        assert_eq!(display_name(&user(Some("Zoff"))), "Zoff");
        assert_eq!(display_name(&user(None)), "keeper@example.com");
        assert_eq!(display_name(&user(Some("  "))), "keeper@example.com");
    }
}
