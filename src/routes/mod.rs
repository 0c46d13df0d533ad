use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod editions;
pub mod health;
pub mod matches;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(matches::router())
        .merge(editions::router())
        .merge(docs::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        dao::pool_store::memory::{MemoryPoolStore, fixtures::PoolFixture},
        services::authorization::StaticTokenAuthorizer,
        state::AppState,
    };

    const TOKEN: &str = "s3cret";

    struct Harness {
        state: SharedState,
        store: MemoryPoolStore,
        edition: Uuid,
        home: Uuid,
        game: Uuid,
    }

    async fn harness(admin_token: Option<&str>) -> Harness {
        let mut fixture = PoolFixture::new();
        let edition = fixture.edition("Serie A 2025");
        let home = fixture.team("Juventus");
        let away = fixture.team("Napoli");
        let game = fixture.fixture(1, home, away, 0);
        let p1 = fixture.participant(edition, "Buffon");
        let p2 = fixture.participant(edition, "Cannavaro");
        let p3 = fixture.participant(edition, "Pirlo");
        fixture.pick(p1, game, home);
        fixture.pick(p2, game, away);
        fixture.pick(p3, game, home);
        let store = fixture.store();

        let state = AppState::new(Arc::new(StaticTokenAuthorizer::new(
            admin_token.map(Into::into),
        )));
        state.set_pool_store(Arc::new(store.clone())).await;

        Harness {
            state,
            store,
            edition,
            home,
            game,
        }
    }

    fn settle_request(game: Uuid, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(format!("/matches/{game}/result"))
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("X-Admin-Token", token);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(state: &SharedState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    #[tokio::test]
    async fn settlement_returns_report() {
        let h = harness(Some(TOKEN)).await;
        let (status, body) = send(
            &h.state,
            settle_request(h.game, Some(TOKEN), r#"{"homeGoals": 2, "awayGoals": 0}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "HOME_WIN");
        assert_eq!(body["winner"]["id"], json!(h.home));
        assert_eq!(body["winner"]["name"], "Juventus");
        assert_eq!(body["eliminated"], json!(["Cannavaro"]));
        assert_eq!(body["editionFinished"], false);
        assert_eq!(body["activeParticipantsRemaining"], 2);
        assert_eq!(body["matchSummary"]["status"], "FINISHED");
        assert_eq!(body["matchSummary"]["homeGoals"], 2);
        assert_eq!(body["editions"][0]["editionId"], json!(h.edition));
    }

    #[tokio::test]
    async fn second_settlement_is_bad_request() {
        let h = harness(Some(TOKEN)).await;
        let body = r#"{"homeGoals": 1, "awayGoals": 1}"#;
        let (first, _) = send(&h.state, settle_request(h.game, Some(TOKEN), body)).await;
        assert_eq!(first, StatusCode::OK);

        let (second, payload) = send(&h.state, settle_request(h.game, Some(TOKEN), body)).await;
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert!(payload["message"].as_str().unwrap().contains("already been settled"));
    }

    #[tokio::test]
    async fn unknown_match_is_not_found() {
        let h = harness(Some(TOKEN)).await;
        let (status, _) = send(
            &h.state,
            settle_request(Uuid::new_v4(), Some(TOKEN), r#"{"homeGoals": 0, "awayGoals": 0}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_bodies_are_bad_requests() {
        let h = harness(Some(TOKEN)).await;
        for body in [
            r#"{"homeGoals": -1, "awayGoals": 0}"#,
            r#"{"homeGoals": 1.5, "awayGoals": 0}"#,
            r#"{"homeGoals": 1}"#,
            "not json",
        ] {
            let (status, _) = send(&h.state, settle_request(h.game, Some(TOKEN), body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        }

        let snapshot = h.store.snapshot().await;
        assert_eq!(
            snapshot.matches[&h.game].status,
            crate::dao::models::MatchStatus::Scheduled
        );
    }

    #[tokio::test]
    async fn settlement_requires_authorized_caller() {
        let h = harness(Some(TOKEN)).await;
        let body = r#"{"homeGoals": 2, "awayGoals": 0}"#;

        let (missing, _) = send(&h.state, settle_request(h.game, None, body)).await;
        assert_eq!(missing, StatusCode::UNAUTHORIZED);

        let (wrong, _) = send(&h.state, settle_request(h.game, Some("guess"), body)).await;
        assert_eq!(wrong, StatusCode::FORBIDDEN);

        let unconfigured = harness(None).await;
        let (refused, _) = send(
            &unconfigured.state,
            settle_request(unconfigured.game, Some(TOKEN), body),
        )
        .await;
        assert_eq!(refused, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn read_routes_serve_matches_and_editions() {
        let h = harness(Some(TOKEN)).await;

        let (status, body) = send(&h.state, get(&format!("/matches/{}", h.game))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "SCHEDULED");
        assert_eq!(body["homeGoals"], Value::Null);
        assert_eq!(body["kickoffAt"], "1970-01-01T00:00:00Z");

        let (status, body) = send(&h.state, get("/matchdays/1/matches")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, body) = send(&h.state, get("/matchdays/2/matches")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = send(&h.state, get(&format!("/editions/{}", h.edition))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activeParticipants"], 3);

        let (status, _) = send(&h.state, get(&format!("/editions/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn degraded_mode_answers_service_unavailable() {
        let h = harness(Some(TOKEN)).await;
        h.state.update_degraded(true);

        let (status, _) = send(&h.state, get(&format!("/matches/{}", h.game))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = send(&h.state, get("/healthcheck")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let h = harness(None).await;
        let (status, body) = send(&h.state, get("/healthcheck")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
