use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::courses::catalog::CatalogEditor;
use crate::courses::domain::{
    ApprovalEdge, ApprovedCourse, AscensoRung, Course, CourseCategory, CourseId, MemberId,
    MemberRecord, MemberRole, PrerequisiteEdge, Rank, RankCourseUnlock, RankId,
};
use crate::courses::eligibility::{CatalogSnapshot, MemberStanding};
use crate::courses::instructor::InstructorDesk;
use crate::courses::memory::InMemoryRoster;
use crate::courses::repository::{CatalogRepository, MemberRepository, RepositoryError};
use crate::courses::seed::MemberSeed;
use crate::courses::service::CourseProgressService;

pub(super) type MemoryService = CourseProgressService<InMemoryRoster, InMemoryRoster>;
pub(super) type MemoryEditor = CatalogEditor<InMemoryRoster, InMemoryRoster>;

pub(super) fn course(id: u32, code: &str) -> Course {
    Course {
        id: CourseId(id),
        code: code.to_string(),
        name: format!("Curso {code}"),
        description: None,
        category: None,
        requires_all_previous_ascenso: false,
    }
}

pub(super) fn ascenso(id: u32, code: &str, requires_all_previous: bool) -> Course {
    Course {
        category: Some(CourseCategory::Ascenso),
        requires_all_previous_ascenso: requires_all_previous,
        ..course(id, code)
    }
}

pub(super) fn rank(id: u32, sort_order: i32) -> Rank {
    Rank {
        id: RankId(id),
        name: format!("Rango {id}"),
        sort_order,
    }
}

pub(super) fn approved_at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 20, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn standing(member_id: u32, rank: Option<Rank>) -> MemberStanding {
    MemberStanding {
        member_id: MemberId(member_id),
        rank,
    }
}

pub(super) fn snapshot_with(courses: &[&Course]) -> CatalogSnapshot {
    let mut snapshot = CatalogSnapshot::new();
    for course in courses {
        snapshot.insert_course((*course).clone());
    }
    snapshot
}

pub(super) fn prerequisite_edge(course_id: u32, prerequisite: &Course) -> PrerequisiteEdge {
    PrerequisiteEdge {
        course_id: CourseId(course_id),
        prerequisite: prerequisite.clone(),
    }
}

pub(super) fn rung(course: &Course, minimum_sort_order: i32) -> AscensoRung {
    AscensoRung {
        course: course.clone(),
        minimum_sort_order,
    }
}

/// Chainable roster builder over the in-memory store.
pub(super) struct Fixture {
    pub(super) roster: Arc<InMemoryRoster>,
}

impl Fixture {
    pub(super) fn new() -> Self {
        Self {
            roster: Arc::new(InMemoryRoster::default()),
        }
    }

    pub(super) fn rank(&self, id: u32, sort_order: i32) -> &Self {
        self.roster
            .upsert_rank(rank(id, sort_order))
            .expect("rank stored");
        self
    }

    pub(super) fn course(&self, course: Course) -> &Self {
        self.roster.upsert_course(course).expect("course stored");
        self
    }

    pub(super) fn unlock(&self, rank_id: u32, course_id: u32) -> &Self {
        self.roster
            .insert_unlock(RankCourseUnlock {
                rank_id: RankId(rank_id),
                course_id: CourseId(course_id),
                note: None,
            })
            .expect("unlock stored");
        self
    }

    pub(super) fn prerequisite(&self, course_id: u32, prerequisite_id: u32) -> &Self {
        self.roster
            .insert_prerequisite(&CourseId(course_id), &CourseId(prerequisite_id))
            .expect("prerequisite stored");
        self
    }

    pub(super) fn member(&self, id: u32, rank_id: Option<u32>) -> &Self {
        self.member_with(id, rank_id, MemberRole::User, None)
    }

    pub(super) fn member_with(
        &self,
        id: u32,
        rank_id: Option<u32>,
        role: MemberRole,
        deleted_at: Option<DateTime<Utc>>,
    ) -> &Self {
        self.roster
            .upsert_member(MemberSeed {
                id: MemberId(id),
                name: format!("Miembro {id}"),
                public_name: None,
                email: format!("miembro{id}@example.org"),
                role,
                rank_id: rank_id.map(RankId),
                deleted_at,
            })
            .expect("member stored");
        self
    }

    pub(super) fn approved(&self, member_id: u32, course_id: u32, day: u32) -> &Self {
        self.roster
            .insert_approval(ApprovalEdge {
                member_id: MemberId(member_id),
                course_id: CourseId(course_id),
                approved_at: approved_at(day),
            })
            .expect("approval stored");
        self
    }

    pub(super) fn instructor(&self, course_id: u32, member_id: u32) -> &Self {
        self.roster
            .insert_instructor(&CourseId(course_id), &MemberId(member_id))
            .expect("instructor assigned");
        self
    }

    pub(super) fn service(&self) -> MemoryService {
        CourseProgressService::new(self.roster.clone(), self.roster.clone())
    }

    pub(super) fn desk(&self) -> InstructorDesk<InMemoryRoster, InMemoryRoster> {
        InstructorDesk::new(Arc::new(self.service()))
    }

    pub(super) fn editor(&self) -> MemoryEditor {
        CatalogEditor::new(self.roster.clone(), self.roster.clone())
    }
}

/// Two-rung ascenso ladder plus a free-standing course:
/// rank 1 (order 0) unlocks ASC-1 (course 1); rank 2 (order 1) unlocks ASC-2 (course 2,
/// requires all previous) and MED-1 (course 3). Member 10 holds rank 2.
pub(super) fn ladder_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture
        .rank(1, 0)
        .rank(2, 1)
        .course(ascenso(1, "ASC-1", false))
        .course(ascenso(2, "ASC-2", true))
        .course(course(3, "MED-1"))
        .unlock(1, 1)
        .unlock(2, 2)
        .unlock(2, 3)
        .member(10, Some(2));
    fixture
}

pub(super) fn codes<'a, I>(courses: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a crate::courses::domain::CourseSummary>,
{
    courses.into_iter().map(|course| course.code.clone()).collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, status: StatusCode) {
    assert_eq!(response.status(), status);
}

/// Store whose every call fails, to check error propagation.
pub(super) struct UnavailableRoster;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl CatalogRepository for UnavailableRoster {
    fn course(&self, _id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        offline()
    }
    fn courses(&self) -> Result<Vec<Course>, RepositoryError> {
        offline()
    }
    fn rank(&self, _id: &RankId) -> Result<Option<Rank>, RepositoryError> {
        offline()
    }
    fn unlocks_for_rank(&self, _rank_id: &RankId) -> Result<Vec<Course>, RepositoryError> {
        offline()
    }
    fn ranks_unlocking(&self, _course_id: &CourseId) -> Result<Vec<RankId>, RepositoryError> {
        offline()
    }
    fn prerequisites_for_courses(
        &self,
        _course_ids: &[CourseId],
    ) -> Result<Vec<PrerequisiteEdge>, RepositoryError> {
        offline()
    }
    fn ascenso_ladder(&self) -> Result<Vec<AscensoRung>, RepositoryError> {
        offline()
    }
    fn insert_unlock(
        &self,
        _unlock: RankCourseUnlock,
    ) -> Result<RankCourseUnlock, RepositoryError> {
        offline()
    }
    fn delete_unlock(
        &self,
        _rank_id: &RankId,
        _course_id: &CourseId,
    ) -> Result<(), RepositoryError> {
        offline()
    }
    fn insert_prerequisite(
        &self,
        _course_id: &CourseId,
        _prerequisite_id: &CourseId,
    ) -> Result<(), RepositoryError> {
        offline()
    }
    fn delete_prerequisite(
        &self,
        _course_id: &CourseId,
        _prerequisite_id: &CourseId,
    ) -> Result<(), RepositoryError> {
        offline()
    }
    fn is_instructor(
        &self,
        _course_id: &CourseId,
        _member_id: &MemberId,
    ) -> Result<bool, RepositoryError> {
        offline()
    }
    fn courses_for_instructor(
        &self,
        _member_id: &MemberId,
    ) -> Result<Vec<Course>, RepositoryError> {
        offline()
    }
    fn instructors_for_course(
        &self,
        _course_id: &CourseId,
    ) -> Result<Vec<MemberId>, RepositoryError> {
        offline()
    }
    fn insert_instructor(
        &self,
        _course_id: &CourseId,
        _member_id: &MemberId,
    ) -> Result<(), RepositoryError> {
        offline()
    }
    fn delete_instructor(
        &self,
        _course_id: &CourseId,
        _member_id: &MemberId,
    ) -> Result<(), RepositoryError> {
        offline()
    }
}

impl MemberRepository for UnavailableRoster {
    fn member(&self, _id: &MemberId) -> Result<Option<MemberRecord>, RepositoryError> {
        offline()
    }
    fn members(&self, _include_deleted: bool) -> Result<Vec<MemberRecord>, RepositoryError> {
        offline()
    }
    fn approved_for_member(
        &self,
        _member_id: &MemberId,
    ) -> Result<Vec<ApprovedCourse>, RepositoryError> {
        offline()
    }
    fn approvals_for_courses(
        &self,
        _course_ids: &[CourseId],
    ) -> Result<Vec<ApprovalEdge>, RepositoryError> {
        offline()
    }
    fn insert_approval(&self, _edge: ApprovalEdge) -> Result<ApprovalEdge, RepositoryError> {
        offline()
    }
    fn delete_approval(
        &self,
        _member_id: &MemberId,
        _course_id: &CourseId,
    ) -> Result<(), RepositoryError> {
        offline()
    }
}
