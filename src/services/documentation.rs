use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pick & Survive.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matches::settle_match_result,
        crate::routes::matches::get_match,
        crate::routes::matches::list_matchday,
        crate::routes::editions::get_edition,
    ),
    components(
        schemas(
            crate::dto::health::HealthStatus,
            crate::dto::health::HealthResponse,
            crate::dto::matches::TeamSummary,
            crate::dto::matches::MatchSummary,
            crate::dto::settlement::SettleMatchRequest,
            crate::dto::settlement::MatchOutcome,
            crate::dto::settlement::EditionSettlement,
            crate::dto::settlement::SettlementReport,
            crate::dto::edition::EditionSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "matches", description = "Match queries and result settlement"),
        (name = "editions", description = "Edition status"),
    )
)]
pub struct ApiDoc;
