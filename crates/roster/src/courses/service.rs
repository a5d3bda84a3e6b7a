use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    ApprovalEdge, ApprovedCourse, Course, CourseId, CourseSummary, MemberId, MemberRecord, RankId,
};
use super::eligibility::{self, CatalogSnapshot, EligibilityVerdict, MemberStanding};
use super::repository::{CatalogRepository, MemberRepository, RepositoryError};
use super::views::{CandidateScan, CandidateScanOptions, CourseDashboard, IneligibleCandidate};

/// Facade composing catalog and member storage with the eligibility evaluator.
///
/// Every read path fetches what it needs in a handful of batch queries, builds a
/// [`CatalogSnapshot`], and evaluates against it. Nothing here mutates catalog state
/// except the explicit approve/unapprove calls.
pub struct CourseProgressService<C, M> {
    catalog: Arc<C>,
    members: Arc<M>,
}

impl<C, M> CourseProgressService<C, M>
where
    C: CatalogRepository + 'static,
    M: MemberRepository + 'static,
{
    pub fn new(catalog: Arc<C>, members: Arc<M>) -> Self {
        Self { catalog, members }
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    /// Eligibility of one member for one course. An unknown course is a verdict, an
    /// unknown member is an error.
    pub fn evaluate(
        &self,
        member_id: &MemberId,
        course_id: &CourseId,
    ) -> Result<EligibilityVerdict, CourseServiceError> {
        let member = self.member_or_not_found(member_id)?;
        let standing = MemberStanding::from(&member);
        let mut snapshot = CatalogSnapshot::new();

        if let Some(course) = self.catalog.course(course_id)? {
            if let Some(rank_id) = member.rank_id() {
                self.load_member_view(&mut snapshot, &member.id, &rank_id)?;
                snapshot.insert_prerequisite_edges(
                    self.catalog
                        .prerequisites_for_courses(std::slice::from_ref(course_id))?,
                );
                if course.requires_all_previous_ascenso {
                    self.attach_ladder(&mut snapshot, std::slice::from_ref(course_id))?;
                }
            }
            snapshot.insert_course(course);
        }

        let verdict = eligibility::evaluate(&standing, *course_id, &snapshot);
        debug!(
            member_id = %member.id,
            course_id = %course_id,
            eligible = verdict.eligible,
            reason = ?verdict.reason,
            "evaluated course eligibility"
        );
        Ok(verdict)
    }

    /// Courses the member may take next, ordered by course id.
    pub fn list_available(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<CourseSummary>, CourseServiceError> {
        let member = self.member_or_not_found(member_id)?;
        let Some(rank_id) = member.rank_id() else {
            return Ok(Vec::new());
        };

        let mut snapshot = CatalogSnapshot::new();
        let unlocked = self.load_member_view(&mut snapshot, &member.id, &rank_id)?;

        let candidates: Vec<CourseId> = unlocked
            .into_iter()
            .filter(|course_id| !snapshot.has_approved(&member.id, course_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        snapshot.insert_prerequisite_edges(self.catalog.prerequisites_for_courses(&candidates)?);
        let flagged: Vec<CourseId> = candidates
            .iter()
            .filter(|course_id| {
                snapshot
                    .course(course_id)
                    .is_some_and(|course| course.requires_all_previous_ascenso)
            })
            .copied()
            .collect();
        if !flagged.is_empty() {
            self.attach_ladder(&mut snapshot, &flagged)?;
        }

        let standing = MemberStanding::from(&member);
        let available: Vec<CourseSummary> = candidates
            .iter()
            .filter(|course_id| eligibility::evaluate(&standing, **course_id, &snapshot).eligible)
            .filter_map(|course_id| snapshot.summary(course_id))
            .collect();

        debug!(
            member_id = %member.id,
            candidates = candidates.len(),
            available = available.len(),
            "resolved available courses"
        );
        Ok(available)
    }

    /// Runs the evaluator for every member against a single course.
    pub fn list_candidates(
        &self,
        course_id: &CourseId,
        options: CandidateScanOptions,
    ) -> Result<CandidateScan, CourseServiceError> {
        let course = self
            .catalog
            .course(course_id)?
            .ok_or(CourseServiceError::NotFound("course"))?;

        let mut snapshot = CatalogSnapshot::new();
        let mut tracked = vec![course.id];

        let prerequisite_edges = self
            .catalog
            .prerequisites_for_courses(std::slice::from_ref(course_id))?;
        tracked.extend(prerequisite_edges.iter().map(|edge| edge.prerequisite.id));
        snapshot.insert_prerequisite_edges(prerequisite_edges);

        for rank_id in self.catalog.ranks_unlocking(&course.id)? {
            snapshot.insert_unlock(rank_id, course.id);
        }

        if course.requires_all_previous_ascenso {
            let rungs = self.attach_ladder(&mut snapshot, std::slice::from_ref(course_id))?;
            tracked.extend(rungs);
        }

        tracked.sort_unstable();
        tracked.dedup();
        snapshot.insert_approval_edges(self.members.approvals_for_courses(&tracked)?);
        snapshot.insert_course(course);

        let members = self.members.members(options.include_deleted)?;
        let mut users = Vec::new();
        let mut ineligible = Vec::new();

        for member in &members {
            let standing = MemberStanding::from(member);
            let verdict = eligibility::evaluate(&standing, *course_id, &snapshot);
            if verdict.eligible {
                users.push(member.summary());
            } else if options.include_ineligible {
                ineligible.push(IneligibleCandidate::new(member.summary(), verdict));
            }
        }

        debug!(
            course_id = %course_id,
            scanned = members.len(),
            eligible = users.len(),
            "scanned instructor candidates"
        );

        Ok(CandidateScan {
            course_id: *course_id,
            users,
            ineligible: options.include_ineligible.then_some(ineligible),
        })
    }

    /// Approved courses, most recent approval first.
    pub fn list_approved(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<ApprovedCourse>, CourseServiceError> {
        let member = self.member_or_not_found(member_id)?;
        let mut approved = self.members.approved_for_member(&member.id)?;
        approved.sort_by(|left, right| {
            right
                .approved_at
                .cmp(&left.approved_at)
                .then_with(|| right.course.id.cmp(&left.course.id))
        });
        Ok(approved)
    }

    pub fn approve(
        &self,
        member_id: &MemberId,
        course_id: &CourseId,
    ) -> Result<ApprovedCourse, CourseServiceError> {
        let member = self.member_or_not_found(member_id)?;
        let course = self
            .catalog
            .course(course_id)?
            .ok_or(CourseServiceError::NotFound("course"))?;

        let edge = self
            .members
            .insert_approval(ApprovalEdge {
                member_id: member.id,
                course_id: course.id,
                approved_at: Utc::now(),
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    CourseServiceError::Conflict("course already approved for this member")
                }
                other => other.into(),
            })?;

        info!(member_id = %member.id, course_code = %course.code, "course approved");
        Ok(ApprovedCourse {
            course,
            approved_at: edge.approved_at,
        })
    }

    pub fn unapprove(
        &self,
        member_id: &MemberId,
        course_id: &CourseId,
    ) -> Result<(), CourseServiceError> {
        let member = self.member_or_not_found(member_id)?;
        self.members
            .delete_approval(&member.id, course_id)
            .map_err(|err| match err {
                RepositoryError::NotFound => CourseServiceError::NotFound("approved course"),
                other => other.into(),
            })?;

        info!(member_id = %member.id, course_id = %course_id, "course approval removed");
        Ok(())
    }

    pub fn dashboard(&self, member_id: &MemberId) -> Result<CourseDashboard, CourseServiceError> {
        let member = self.member_or_not_found(member_id)?;
        let approved = self.list_approved(&member.id)?;
        let available = self.list_available(&member.id)?;
        Ok(CourseDashboard::new(&member, approved, available))
    }

    fn member_or_not_found(
        &self,
        member_id: &MemberId,
    ) -> Result<MemberRecord, CourseServiceError> {
        self.members
            .member(member_id)?
            .ok_or(CourseServiceError::NotFound("member"))
    }

    /// Attaches the ascenso ladder and positions the flagged courses that are not rungs
    /// themselves at their lowest unlocking rank. Returns the rung course ids.
    fn attach_ladder(
        &self,
        snapshot: &mut CatalogSnapshot,
        flagged: &[CourseId],
    ) -> Result<Vec<CourseId>, CourseServiceError> {
        let rungs = self.catalog.ascenso_ladder()?;
        let rung_ids: Vec<CourseId> = rungs.iter().map(|rung| rung.course.id).collect();
        snapshot.attach_ladder(rungs);

        for course_id in flagged.iter().filter(|course_id| !rung_ids.contains(course_id)) {
            if let Some(order) = self.catalog.lowest_unlock_order(course_id)? {
                snapshot.insert_unlock_order(*course_id, order);
            }
        }
        Ok(rung_ids)
    }

    /// Loads the member's rank unlocks and approvals, returning unlocked ids in unlock order.
    fn load_member_view(
        &self,
        snapshot: &mut CatalogSnapshot,
        member_id: &MemberId,
        rank_id: &RankId,
    ) -> Result<Vec<CourseId>, CourseServiceError> {
        let unlocked: Vec<Course> = self.catalog.unlocks_for_rank(rank_id)?;
        let unlocked_ids: Vec<CourseId> = unlocked.iter().map(|course| course.id).collect();
        for course in unlocked {
            snapshot.insert_unlock(*rank_id, course.id);
            snapshot.insert_course(course);
        }

        for approved in self.members.approved_for_member(member_id)? {
            snapshot.insert_approval(*member_id, approved.course.id);
        }

        Ok(unlocked_ids)
    }
}

/// Error raised by the course services. Ineligibility is never an error here except
/// where a caller asked to act on it ([`CourseServiceError::NotEligible`]).
#[derive(Debug, thiserror::Error)]
pub enum CourseServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("{}", .0.summary())]
    NotEligible(EligibilityVerdict),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
