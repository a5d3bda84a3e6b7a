use crate::infra::{AppState, RosterServices};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use roster::courses::{
    catalog_router, course_router, CatalogRepository, CatalogSeed, CourseServiceError,
    InMemoryRoster,
};
use roster::error::AppError;
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Serialize)]
pub(crate) struct SeedCheckResponse {
    pub(crate) ranks: usize,
    pub(crate) courses: usize,
    pub(crate) members: usize,
    pub(crate) approvals: usize,
    pub(crate) ascenso_ladder: Vec<LadderEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LadderEntry {
    pub(crate) code: String,
    pub(crate) minimum_sort_order: i32,
}

pub(crate) fn with_course_routes(services: &RosterServices) -> axum::Router {
    course_router(services.progress.clone(), services.desk.clone())
        .merge(catalog_router(services.editor.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/catalog/seed/check",
            axum::routing::post(seed_check_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Validates a catalog seed without loading it and reports the ladder it would produce.
pub(crate) async fn seed_check_endpoint(body: String) -> Result<Json<SeedCheckResponse>, AppError> {
    let seed = CatalogSeed::from_reader(Cursor::new(body.into_bytes()))?;
    let (ranks, courses, members, approvals) = (
        seed.ranks.len(),
        seed.courses.len(),
        seed.members.len(),
        seed.approvals.len(),
    );

    let ladder = InMemoryRoster::from_seed(seed)
        .ascenso_ladder()
        .map_err(CourseServiceError::from)?;
    let mut ascenso_ladder: Vec<LadderEntry> = ladder
        .into_iter()
        .map(|rung| LadderEntry {
            code: rung.course.code,
            minimum_sort_order: rung.minimum_sort_order,
        })
        .collect();
    ascenso_ladder.sort_by(|left, right| {
        left.minimum_sort_order
            .cmp(&right.minimum_sort_order)
            .then_with(|| left.code.cmp(&right.code))
    });

    Ok(Json(SeedCheckResponse {
        ranks,
        courses,
        members,
        approvals,
        ascenso_ladder,
    }))
}
