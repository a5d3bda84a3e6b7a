use std::sync::Arc;

use tracing::info;

use super::domain::{
    Course, CourseId, MemberId, MemberRecord, MemberSummary, Rank, RankCourseUnlock, RankId,
};
use super::repository::{CatalogRepository, MemberRepository, RepositoryError};
use super::service::CourseServiceError;

/// Maintenance of the unlock and prerequisite edges the evaluator reads, and of the
/// instructor assignments the instructor desk checks.
pub struct CatalogEditor<C, M> {
    catalog: Arc<C>,
    members: Arc<M>,
}

impl<C, M> CatalogEditor<C, M>
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    pub fn new(catalog: Arc<C>, members: Arc<M>) -> Self {
        Self { catalog, members }
    }

    pub fn list_unlocks(&self, rank_id: &RankId) -> Result<Vec<Course>, CourseServiceError> {
        let rank = self.rank_or_not_found(rank_id)?;
        Ok(self.catalog.unlocks_for_rank(&rank.id)?)
    }

    pub fn add_unlock(
        &self,
        rank_id: &RankId,
        course_id: &CourseId,
        note: Option<String>,
    ) -> Result<RankCourseUnlock, CourseServiceError> {
        let rank = self.rank_or_not_found(rank_id)?;
        let course = self.course_or_not_found(course_id)?;

        let unlock = self
            .catalog
            .insert_unlock(RankCourseUnlock {
                rank_id: rank.id,
                course_id: course.id,
                note: note.filter(|note| !note.trim().is_empty()),
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => CourseServiceError::Conflict("unlock already exists"),
                other => other.into(),
            })?;

        info!(rank = %rank.name, course_code = %course.code, "rank unlock added");
        Ok(unlock)
    }

    pub fn remove_unlock(
        &self,
        rank_id: &RankId,
        course_id: &CourseId,
    ) -> Result<(), CourseServiceError> {
        let rank = self.rank_or_not_found(rank_id)?;
        self.catalog
            .delete_unlock(&rank.id, course_id)
            .map_err(|err| match err {
                RepositoryError::NotFound => CourseServiceError::NotFound("unlock"),
                other => other.into(),
            })
    }

    pub fn list_prerequisites(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Course>, CourseServiceError> {
        let course = self.course_or_not_found(course_id)?;
        Ok(self.catalog.prerequisites(&course.id)?)
    }

    /// Adds a direct prerequisite edge. Only self edges are rejected; longer cycles are
    /// accepted and stay harmless because evaluation never follows edges transitively.
    pub fn add_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> Result<(), CourseServiceError> {
        if course_id == prerequisite_id {
            return Err(CourseServiceError::InvalidInput(
                "a course cannot be its own prerequisite",
            ));
        }

        let course = self.course_or_not_found(course_id)?;
        let prerequisite = self.course_or_not_found(prerequisite_id)?;

        self.catalog
            .insert_prerequisite(&course.id, &prerequisite.id)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    CourseServiceError::Conflict("prerequisite already exists")
                }
                other => other.into(),
            })?;

        info!(
            course_code = %course.code,
            prerequisite_code = %prerequisite.code,
            "course prerequisite added"
        );
        Ok(())
    }

    pub fn remove_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> Result<(), CourseServiceError> {
        let course = self.course_or_not_found(course_id)?;
        self.catalog
            .delete_prerequisite(&course.id, prerequisite_id)
            .map_err(|err| match err {
                RepositoryError::NotFound => CourseServiceError::NotFound("prerequisite"),
                other => other.into(),
            })
    }

    /// Members teaching the course, oldest assignment first. Assignments whose member
    /// account is gone are left out.
    pub fn list_instructors(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<MemberSummary>, CourseServiceError> {
        let course = self.course_or_not_found(course_id)?;
        let assigned = self.catalog.instructors_for_course(&course.id)?;
        if assigned.is_empty() {
            return Ok(Vec::new());
        }

        let roster = self.members.members(true)?;
        Ok(assigned
            .iter()
            .filter_map(|member_id| roster.iter().find(|member| member.id == *member_id))
            .map(MemberRecord::summary)
            .collect())
    }

    pub fn add_instructor(
        &self,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<MemberSummary, CourseServiceError> {
        let course = self.course_or_not_found(course_id)?;
        let member = self
            .members
            .member(member_id)?
            .ok_or(CourseServiceError::NotFound("member"))?;

        self.catalog
            .insert_instructor(&course.id, &member.id)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    CourseServiceError::Conflict("instructor already assigned")
                }
                other => other.into(),
            })?;

        info!(course_code = %course.code, member_id = %member.id, "course instructor assigned");
        Ok(member.summary())
    }

    pub fn remove_instructor(
        &self,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<(), CourseServiceError> {
        let course = self.course_or_not_found(course_id)?;
        self.catalog
            .delete_instructor(&course.id, member_id)
            .map_err(|err| match err {
                RepositoryError::NotFound => CourseServiceError::NotFound("instructor assignment"),
                other => other.into(),
            })?;

        info!(course_code = %course.code, member_id = %member_id, "course instructor removed");
        Ok(())
    }

    fn rank_or_not_found(&self, rank_id: &RankId) -> Result<Rank, CourseServiceError> {
        self.catalog
            .rank(rank_id)?
            .ok_or(CourseServiceError::NotFound("rank"))
    }

    fn course_or_not_found(&self, course_id: &CourseId) -> Result<Course, CourseServiceError> {
        self.catalog
            .course(course_id)?
            .ok_or(CourseServiceError::NotFound("course"))
    }
}
