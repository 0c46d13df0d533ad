/// Capability checks for administrative actions.
pub mod authorization;
/// OpenAPI documentation generation.
pub mod documentation;
/// Edition status queries.
pub mod edition_service;
/// Health check service.
pub mod health_service;
/// Match and matchday queries.
pub mod match_service;
/// Atomic match settlement.
pub mod settlement_service;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;
