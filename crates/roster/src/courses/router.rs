use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::CatalogEditor;
use super::domain::{CourseId, MemberId, MemberRole, RankId};
use super::instructor::{InstructorDesk, Requester};
use super::repository::{CatalogRepository, MemberRepository, RepositoryError};
use super::service::{CourseProgressService, CourseServiceError};
use super::views::CandidateScanOptions;

pub const REQUESTER_ID_HEADER: &str = "x-requester-id";
pub const REQUESTER_ROLE_HEADER: &str = "x-requester-role";

/// Member course endpoints plus the instructor desk.
pub fn course_router<C, M>(
    service: Arc<CourseProgressService<C, M>>,
    desk: Arc<InstructorDesk<C, M>>,
) -> Router
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    member_router(service).merge(instructor_router(desk))
}

pub fn member_router<C, M>(service: Arc<CourseProgressService<C, M>>) -> Router
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/members/:member_id/courses/available",
            get(available_handler::<C, M>),
        )
        .route(
            "/api/v1/members/:member_id/courses/approved",
            get(approved_handler::<C, M>).post(approve_handler::<C, M>),
        )
        .route(
            "/api/v1/members/:member_id/courses/approved/:course_id",
            delete(unapprove_handler::<C, M>),
        )
        .route(
            "/api/v1/members/:member_id/courses/dashboard",
            get(dashboard_handler::<C, M>),
        )
        .route(
            "/api/v1/members/:member_id/courses/:course_id/eligibility",
            get(eligibility_handler::<C, M>),
        )
        .with_state(service)
}

pub fn instructor_router<C, M>(desk: Arc<InstructorDesk<C, M>>) -> Router
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/instructor/courses",
            get(instructor_courses_handler::<C, M>),
        )
        .route(
            "/api/v1/instructor/courses/:course_id/candidates",
            get(candidates_handler::<C, M>),
        )
        .route(
            "/api/v1/instructor/courses/:course_id/approve",
            post(instructor_approve_handler::<C, M>),
        )
        .route(
            "/api/v1/instructor/courses/:course_id/approve/:member_id",
            delete(instructor_unapprove_handler::<C, M>),
        )
        .with_state(desk)
}

/// Unlock, prerequisite and instructor assignment maintenance, restricted to super admins.
pub fn catalog_router<C, M>(editor: Arc<CatalogEditor<C, M>>) -> Router
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/catalog/ranks/:rank_id/unlocks",
            get(list_unlocks_handler::<C, M>).post(add_unlock_handler::<C, M>),
        )
        .route(
            "/api/v1/catalog/ranks/:rank_id/unlocks/:course_id",
            delete(remove_unlock_handler::<C, M>),
        )
        .route(
            "/api/v1/catalog/courses/:course_id/prerequisites",
            get(list_prerequisites_handler::<C, M>).post(add_prerequisite_handler::<C, M>),
        )
        .route(
            "/api/v1/catalog/courses/:course_id/prerequisites/:prerequisite_id",
            delete(remove_prerequisite_handler::<C, M>),
        )
        .route(
            "/api/v1/catalog/courses/:course_id/instructors",
            get(list_instructors_handler::<C, M>).post(add_instructor_handler::<C, M>),
        )
        .route(
            "/api/v1/catalog/courses/:course_id/instructors/:member_id",
            delete(remove_instructor_handler::<C, M>),
        )
        .with_state(editor)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddUnlockRequest {
    pub(crate) course_id: CourseId,
    #[serde(default)]
    pub(crate) note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddPrerequisiteRequest {
    pub(crate) prerequisite_id: CourseId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddInstructorRequest {
    pub(crate) member_id: MemberId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApproveCourseRequest {
    pub(crate) course_id: CourseId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InstructorApproveRequest {
    pub(crate) member_id: MemberId,
}

/// Raw query flags; `1` and `true` switch an option on.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateQuery {
    #[serde(default)]
    include_deleted: Option<String>,
    #[serde(default)]
    include_ineligible: Option<String>,
}

impl CandidateQuery {
    fn options(&self) -> CandidateScanOptions {
        CandidateScanOptions {
            include_deleted: flag(self.include_deleted.as_deref()),
            include_ineligible: flag(self.include_ineligible.as_deref()),
        }
    }
}

fn flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("1") | Some("true"))
}

pub(crate) async fn available_handler<C, M>(
    State(service): State<Arc<CourseProgressService<C, M>>>,
    Path(member_id): Path<u32>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    match service.list_available(&MemberId(member_id)) {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approved_handler<C, M>(
    State(service): State<Arc<CourseProgressService<C, M>>>,
    Path(member_id): Path<u32>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    match service.list_approved(&MemberId(member_id)) {
        Ok(approved) => (StatusCode::OK, Json(approved)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_handler<C, M>(
    State(service): State<Arc<CourseProgressService<C, M>>>,
    Path(member_id): Path<u32>,
    Json(request): Json<ApproveCourseRequest>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    match service.approve(&MemberId(member_id), &request.course_id) {
        Ok(approved) => (StatusCode::CREATED, Json(approved)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn unapprove_handler<C, M>(
    State(service): State<Arc<CourseProgressService<C, M>>>,
    Path((member_id, course_id)): Path<(u32, u32)>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    match service.unapprove(&MemberId(member_id), &CourseId(course_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn dashboard_handler<C, M>(
    State(service): State<Arc<CourseProgressService<C, M>>>,
    Path(member_id): Path<u32>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    match service.dashboard(&MemberId(member_id)) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn eligibility_handler<C, M>(
    State(service): State<Arc<CourseProgressService<C, M>>>,
    Path((member_id, course_id)): Path<(u32, u32)>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    match service.evaluate(&MemberId(member_id), &CourseId(course_id)) {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn instructor_courses_handler<C, M>(
    State(desk): State<Arc<InstructorDesk<C, M>>>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    let requester = match requester_from_headers(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };

    match desk.courses(&requester) {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn candidates_handler<C, M>(
    State(desk): State<Arc<InstructorDesk<C, M>>>,
    Path(course_id): Path<u32>,
    Query(query): Query<CandidateQuery>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    let requester = match requester_from_headers(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };

    match desk.candidates(&requester, &CourseId(course_id), query.options()) {
        Ok(scan) => (StatusCode::OK, Json(scan)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn instructor_approve_handler<C, M>(
    State(desk): State<Arc<InstructorDesk<C, M>>>,
    Path(course_id): Path<u32>,
    headers: HeaderMap,
    Json(request): Json<InstructorApproveRequest>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    let requester = match requester_from_headers(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };

    match desk.approve(&requester, &CourseId(course_id), &request.member_id) {
        Ok(approved) => (StatusCode::CREATED, Json(approved)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn instructor_unapprove_handler<C, M>(
    State(desk): State<Arc<InstructorDesk<C, M>>>,
    Path((course_id, member_id)): Path<(u32, u32)>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    let requester = match requester_from_headers(&headers) {
        Ok(requester) => requester,
        Err(response) => return response,
    };

    match desk.unapprove(&requester, &CourseId(course_id), &MemberId(member_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_unlocks_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path(rank_id): Path<u32>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.list_unlocks(&RankId(rank_id)) {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_unlock_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path(rank_id): Path<u32>,
    headers: HeaderMap,
    Json(request): Json<AddUnlockRequest>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.add_unlock(&RankId(rank_id), &request.course_id, request.note) {
        Ok(unlock) => (StatusCode::CREATED, Json(unlock)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn remove_unlock_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path((rank_id, course_id)): Path<(u32, u32)>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.remove_unlock(&RankId(rank_id), &CourseId(course_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_prerequisites_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path(course_id): Path<u32>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.list_prerequisites(&CourseId(course_id)) {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_prerequisite_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path(course_id): Path<u32>,
    headers: HeaderMap,
    Json(request): Json<AddPrerequisiteRequest>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.add_prerequisite(&CourseId(course_id), &request.prerequisite_id) {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "ok": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn remove_prerequisite_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path((course_id, prerequisite_id)): Path<(u32, u32)>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.remove_prerequisite(&CourseId(course_id), &CourseId(prerequisite_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_instructors_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path(course_id): Path<u32>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.list_instructors(&CourseId(course_id)) {
        Ok(instructors) => (StatusCode::OK, Json(instructors)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_instructor_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path(course_id): Path<u32>,
    headers: HeaderMap,
    Json(request): Json<AddInstructorRequest>,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.add_instructor(&CourseId(course_id), &request.member_id) {
        Ok(instructor) => (StatusCode::CREATED, Json(instructor)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn remove_instructor_handler<C, M>(
    State(editor): State<Arc<CatalogEditor<C, M>>>,
    Path((course_id, member_id)): Path<(u32, u32)>,
    headers: HeaderMap,
) -> Response
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    if let Err(response) = require_super_admin(&headers) {
        return response;
    }

    match editor.remove_instructor(&CourseId(course_id), &MemberId(member_id)) {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => error_response(err),
    }
}

fn require_super_admin(headers: &HeaderMap) -> Result<Requester, Response> {
    let requester = requester_from_headers(headers)?;
    if requester.role == MemberRole::SuperAdmin {
        Ok(requester)
    } else {
        Err(error_response(CourseServiceError::Forbidden(
            "super admin role required",
        )))
    }
}

pub(crate) fn requester_from_headers(headers: &HeaderMap) -> Result<Requester, Response> {
    let unauthorized = |message: &str| {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    };

    let member_id = headers
        .get(REQUESTER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| unauthorized("missing or invalid requester id"))?;

    let role = headers
        .get(REQUESTER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<MemberRole>().ok())
        .ok_or_else(|| unauthorized("missing or invalid requester role"))?;

    Ok(Requester {
        member_id: MemberId(member_id),
        role,
    })
}

pub(crate) fn error_response(err: CourseServiceError) -> Response {
    let (status, payload) = match &err {
        CourseServiceError::NotFound(_)
        | CourseServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
        }
        CourseServiceError::Conflict(_)
        | CourseServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
        }
        CourseServiceError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
        }
        CourseServiceError::Forbidden(_) => {
            (StatusCode::FORBIDDEN, json!({ "error": err.to_string() }))
        }
        CourseServiceError::NotEligible(verdict) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": err.to_string(),
                "reason": verdict.reason,
                "missing_prerequisites": verdict.missing_prerequisites,
            }),
        ),
        CourseServiceError::Repository(RepositoryError::Unavailable(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": err.to_string() }),
        ),
    };

    (status, Json(payload)).into_response()
}
