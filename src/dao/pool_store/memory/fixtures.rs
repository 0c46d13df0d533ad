//! Builder for small in-memory pools used by unit tests across the crate.

use std::time::{Duration, SystemTime};

use uuid::Uuid;

use super::{MemoryPoolStore, PoolData};
use crate::dao::models::{
    EditionEntity, EditionStatus, MatchEntity, MatchStatus, ParticipantEntity, ParticipantStatus,
    PickEntity, TeamEntity, UserEntity,
};

#[derive(Default)]
pub struct PoolFixture {
    pub data: PoolData,
    next_pick_at: u64,
}

impl PoolFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.data.insert_team(TeamEntity {
            id,
            name: name.into(),
            short_code: name.chars().take(3).collect::<String>().to_uppercase(),
        });
        id
    }

    pub fn edition(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.data.insert_edition(EditionEntity {
            id,
            league_id: Uuid::new_v4(),
            name: name.into(),
            status: EditionStatus::InProgress,
        });
        id
    }

    /// Enroll a fresh user called `alias` in `edition_id`.
    pub fn participant(&mut self, edition_id: Uuid, alias: &str) -> Uuid {
        self.participant_with(edition_id, Some(alias), ParticipantStatus::Active)
    }

    pub fn participant_with(
        &mut self,
        edition_id: Uuid,
        alias: Option<&str>,
        status: ParticipantStatus,
    ) -> Uuid {
        let user_id = Uuid::new_v4();
        let email = format!("{}@example.com", alias.unwrap_or("anonymous").to_lowercase());
        self.data.insert_user(UserEntity {
            id: user_id,
            email,
            alias: alias.map(Into::into),
        });

        let id = Uuid::new_v4();
        self.data.insert_participant(ParticipantEntity {
            id,
            edition_id,
            user_id,
            status,
        });
        id
    }

    pub fn fixture(&mut self, matchday: u32, home: Uuid, away: Uuid, kickoff_secs: u64) -> Uuid {
        let id = Uuid::new_v4();
        self.data.insert_match(MatchEntity {
            id,
            matchday,
            kickoff_at: SystemTime::UNIX_EPOCH + Duration::from_secs(kickoff_secs),
            home_team_id: home,
            away_team_id: away,
            home_goals: None,
            away_goals: None,
            status: MatchStatus::Scheduled,
        });
        id
    }

    /// Place a pick; picks are timestamped in call order.
    pub fn pick(&mut self, participant_id: Uuid, match_id: Uuid, team_id: Uuid) -> Uuid {
        self.next_pick_at += 1;
        let id = Uuid::new_v4();
        self.data.insert_pick(PickEntity {
            id,
            participant_id,
            match_id,
            team_id,
            created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(self.next_pick_at),
        });
        id
    }

    pub fn store(self) -> MemoryPoolStore {
        MemoryPoolStore::new(self.data)
    }
}
