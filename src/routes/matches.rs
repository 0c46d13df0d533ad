use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        matches::MatchSummary,
        settlement::{SettleMatchRequest, SettlementReport},
    },
    error::AppError,
    services::{
        authorization::{Action, Caller, Resource, ensure_authorized},
        match_service, settlement_service,
    },
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Match queries plus the admin-only settlement endpoint.
pub fn router() -> Router<SharedState> {
    let admin = Router::new()
        .route("/matches/{matchId}/result", post(settle_match_result))
        .route_layer(middleware::from_fn(require_admin_token));

    Router::new()
        .route("/matches/{matchId}", get(get_match))
        .route("/matchdays/{matchday}/matches", get(list_matchday))
        .merge(admin)
}

/// Record the final score of a match and settle every pick placed on it.
#[utoipa::path(
    post,
    path = "/matches/{matchId}/result",
    tag = "matches",
    params(
        ("X-Admin-Token" = String, Header, description = "Token granting match administration rights"),
        ("matchId" = Uuid, Path, description = "Identifier of the match to settle")
    ),
    request_body = SettleMatchRequest,
    responses(
        (status = 200, description = "Match settled", body = SettlementReport),
        (status = 400, description = "Invalid score or match already settled"),
        (status = 401, description = "Missing admin token"),
        (status = 403, description = "Caller may not settle matches"),
        (status = 404, description = "Unknown match"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn settle_match_result(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(match_id): Path<Uuid>,
    payload: Result<Json<SettleMatchRequest>, JsonRejection>,
) -> Result<Json<SettlementReport>, AppError> {
    ensure_authorized(
        state.authorizer(),
        &caller,
        Action::SettleMatch,
        Resource::Match(match_id),
    )?;

    let Json(payload) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    payload.validate()?;

    Ok(Json(
        settlement_service::settle_match(&state, match_id, payload).await?,
    ))
}

/// Retrieve a single match with its teams and score.
#[utoipa::path(
    get,
    path = "/matches/{matchId}",
    tag = "matches",
    params(("matchId" = Uuid, Path, description = "Identifier of the match")),
    responses(
        (status = 200, description = "Match", body = MatchSummary),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(match_id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::find_match(&state, match_id).await?))
}

/// List the matches of a matchday ordered by kickoff.
#[utoipa::path(
    get,
    path = "/matchdays/{matchday}/matches",
    tag = "matches",
    params(("matchday" = u32, Path, description = "Matchday number")),
    responses((status = 200, description = "Matches of the matchday", body = [MatchSummary]))
)]
pub async fn list_matchday(
    State(state): State<SharedState>,
    Path(matchday): Path<u32>,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(match_service::list_matchday(&state, matchday).await?))
}

/// Reject requests without an admin token and hand the caller identity to the handler.
async fn require_admin_token(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    req.extensions_mut().insert(Caller { token });
    Ok(next.run(req).await)
}
