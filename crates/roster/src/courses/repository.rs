use super::domain::{
    ApprovalEdge, ApprovedCourse, AscensoRung, Course, CourseId, MemberId, MemberRecord,
    PrerequisiteEdge, Rank, RankCourseUnlock, RankId,
};

/// Read and edge-maintenance access to courses, ranks and the edges between them.
pub trait CatalogRepository: Send + Sync {
    fn course(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError>;
    /// Every course, ordered by code then id.
    fn courses(&self) -> Result<Vec<Course>, RepositoryError>;
    fn rank(&self, id: &RankId) -> Result<Option<Rank>, RepositoryError>;

    /// Courses a rank unlocks, in unlock creation order. Edges pointing at removed
    /// courses are omitted.
    fn unlocks_for_rank(&self, rank_id: &RankId) -> Result<Vec<Course>, RepositoryError>;
    /// Ranks holding an unlock edge to the course.
    fn ranks_unlocking(&self, course_id: &CourseId) -> Result<Vec<RankId>, RepositoryError>;

    /// Prerequisite edges for several courses at once, in edge creation order.
    fn prerequisites_for_courses(
        &self,
        course_ids: &[CourseId],
    ) -> Result<Vec<PrerequisiteEdge>, RepositoryError>;

    fn prerequisites(&self, course_id: &CourseId) -> Result<Vec<Course>, RepositoryError> {
        Ok(self
            .prerequisites_for_courses(std::slice::from_ref(course_id))?
            .into_iter()
            .map(|edge| edge.prerequisite)
            .collect())
    }

    /// Ascenso courses that at least one rank unlocks, each with the lowest unlocking
    /// rank sort order.
    fn ascenso_ladder(&self) -> Result<Vec<AscensoRung>, RepositoryError>;

    /// Lowest sort order among the ranks unlocking the course, `None` when no rank does.
    fn lowest_unlock_order(&self, course_id: &CourseId) -> Result<Option<i32>, RepositoryError> {
        let mut lowest: Option<i32> = None;
        for rank_id in self.ranks_unlocking(course_id)? {
            if let Some(rank) = self.rank(&rank_id)? {
                lowest = Some(lowest.map_or(rank.sort_order, |order| order.min(rank.sort_order)));
            }
        }
        Ok(lowest)
    }

    fn insert_unlock(&self, unlock: RankCourseUnlock) -> Result<RankCourseUnlock, RepositoryError>;
    fn delete_unlock(&self, rank_id: &RankId, course_id: &CourseId) -> Result<(), RepositoryError>;
    fn insert_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> Result<(), RepositoryError>;
    fn delete_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> Result<(), RepositoryError>;

    fn is_instructor(&self, course_id: &CourseId, member_id: &MemberId)
        -> Result<bool, RepositoryError>;
    /// Courses the member teaches, most recent assignment first.
    fn courses_for_instructor(&self, member_id: &MemberId) -> Result<Vec<Course>, RepositoryError>;
    /// Members assigned to teach the course, oldest assignment first.
    fn instructors_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<MemberId>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the member already teaches the course.
    fn insert_instructor(
        &self,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<(), RepositoryError>;
    fn delete_instructor(
        &self,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<(), RepositoryError>;
}

/// Member accounts and their approval edges.
pub trait MemberRepository: Send + Sync {
    fn member(&self, id: &MemberId) -> Result<Option<MemberRecord>, RepositoryError>;
    /// Members ordered by id, soft-deleted accounts only when requested.
    fn members(&self, include_deleted: bool) -> Result<Vec<MemberRecord>, RepositoryError>;

    fn approved_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<ApprovedCourse>, RepositoryError>;
    fn approvals_for_courses(
        &self,
        course_ids: &[CourseId],
    ) -> Result<Vec<ApprovalEdge>, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the pair is already approved.
    fn insert_approval(&self, edge: ApprovalEdge) -> Result<ApprovalEdge, RepositoryError>;
    /// Fails with [`RepositoryError::NotFound`] when there is nothing to remove.
    fn delete_approval(
        &self,
        member_id: &MemberId,
        course_id: &CourseId,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
