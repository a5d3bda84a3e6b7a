use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{ApprovedCourse, Course, CourseId, MemberId, MemberRole};
use super::repository::{CatalogRepository, MemberRepository};
use super::service::{CourseProgressService, CourseServiceError};
use super::views::{CandidateScan, CandidateScanOptions};

/// Authenticated caller, as established by the upstream auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub member_id: MemberId,
    pub role: MemberRole,
}

/// Capability check for instructor actions on a course. Super admins pass everywhere,
/// `FORMACION` members only on courses they are assigned to.
pub struct InstructorAccess<C> {
    catalog: Arc<C>,
}

impl<C> InstructorAccess<C>
where
    C: CatalogRepository + 'static,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    pub fn authorize(
        &self,
        requester: &Requester,
        course_id: &CourseId,
    ) -> Result<(), CourseServiceError> {
        match requester.role {
            MemberRole::SuperAdmin => Ok(()),
            MemberRole::Formacion => {
                if self.catalog.is_instructor(course_id, &requester.member_id)? {
                    Ok(())
                } else {
                    warn!(
                        requester = %requester.member_id,
                        course_id = %course_id,
                        "instructor not assigned to course"
                    );
                    Err(CourseServiceError::Forbidden("not assigned to this course"))
                }
            }
            _ => Err(CourseServiceError::Forbidden("instructor role required")),
        }
    }
}

/// Instructor-facing operations. Authorization runs first, then the call is handed to the
/// resolver, which stays authorization-agnostic.
pub struct InstructorDesk<C, M> {
    access: InstructorAccess<C>,
    catalog: Arc<C>,
    progress: Arc<CourseProgressService<C, M>>,
}

impl<C, M> InstructorDesk<C, M>
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    pub fn new(progress: Arc<CourseProgressService<C, M>>) -> Self {
        let catalog = progress.catalog().clone();
        Self {
            access: InstructorAccess::new(catalog.clone()),
            catalog,
            progress,
        }
    }

    /// Courses the requester may manage: the whole catalog for super admins, assignments
    /// otherwise.
    pub fn courses(&self, requester: &Requester) -> Result<Vec<Course>, CourseServiceError> {
        match requester.role {
            MemberRole::SuperAdmin => Ok(self.catalog.courses()?),
            MemberRole::Formacion => Ok(self.catalog.courses_for_instructor(&requester.member_id)?),
            _ => Err(CourseServiceError::Forbidden("instructor role required")),
        }
    }

    pub fn candidates(
        &self,
        requester: &Requester,
        course_id: &CourseId,
        options: CandidateScanOptions,
    ) -> Result<CandidateScan, CourseServiceError> {
        self.access.authorize(requester, course_id)?;
        self.progress.list_candidates(course_id, options)
    }

    /// Records an approval, refusing members the evaluator does not clear.
    pub fn approve(
        &self,
        requester: &Requester,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<ApprovedCourse, CourseServiceError> {
        self.access.authorize(requester, course_id)?;

        let verdict = self.progress.evaluate(member_id, course_id)?;
        if !verdict.eligible {
            info!(
                requester = %requester.member_id,
                member_id = %member_id,
                course_id = %course_id,
                reason = ?verdict.reason,
                "instructor approval refused"
            );
            return Err(CourseServiceError::NotEligible(verdict));
        }

        self.progress.approve(member_id, course_id)
    }

    pub fn unapprove(
        &self,
        requester: &Requester,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<(), CourseServiceError> {
        self.access.authorize(requester, course_id)?;
        self.progress.unapprove(member_id, course_id)
    }
}
