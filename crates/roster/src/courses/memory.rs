use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    ApprovalEdge, ApprovedCourse, AscensoRung, Course, CourseId, MemberId, MemberRecord,
    PrerequisiteEdge, Rank, RankCourseUnlock, RankId,
};
use super::repository::{CatalogRepository, MemberRepository, RepositoryError};
use super::seed::{CatalogSeed, MemberSeed};

/// Process-local roster store. Edge tables keep insertion order so reads come back in
/// creation order, the way the relational store returns them.
#[derive(Debug, Default)]
pub struct InMemoryRoster {
    tables: Mutex<RosterTables>,
}

#[derive(Debug, Default)]
struct RosterTables {
    ranks: BTreeMap<RankId, Rank>,
    courses: BTreeMap<CourseId, Course>,
    members: BTreeMap<MemberId, MemberSeed>,
    unlocks: Vec<RankCourseUnlock>,
    prerequisites: Vec<(CourseId, CourseId)>,
    approvals: Vec<ApprovalEdge>,
    instructors: Vec<(CourseId, MemberId)>,
}

impl InMemoryRoster {
    pub fn from_seed(seed: CatalogSeed) -> Self {
        let tables = RosterTables {
            ranks: seed.ranks.into_iter().map(|rank| (rank.id, rank)).collect(),
            courses: seed
                .courses
                .into_iter()
                .map(|course| (course.id, course))
                .collect(),
            members: seed
                .members
                .into_iter()
                .map(|member| (member.id, member))
                .collect(),
            unlocks: seed.unlocks,
            prerequisites: seed
                .prerequisites
                .into_iter()
                .map(|edge| (edge.course_id, edge.prerequisite_id))
                .collect(),
            approvals: seed
                .approvals
                .into_iter()
                .map(|approval| ApprovalEdge {
                    member_id: approval.member_id,
                    course_id: approval.course_id,
                    approved_at: approval.approved_at,
                })
                .collect(),
            instructors: seed
                .instructors
                .into_iter()
                .map(|assignment| (assignment.course_id, assignment.member_id))
                .collect(),
        };

        Self {
            tables: Mutex::new(tables),
        }
    }

    pub fn upsert_rank(&self, rank: Rank) -> Result<(), RepositoryError> {
        self.tables()?.ranks.insert(rank.id, rank);
        Ok(())
    }

    pub fn upsert_course(&self, course: Course) -> Result<(), RepositoryError> {
        self.tables()?.courses.insert(course.id, course);
        Ok(())
    }

    /// Drops the course row but leaves edges pointing at it in place.
    pub fn remove_course(&self, course_id: &CourseId) -> Result<(), RepositoryError> {
        self.tables()?
            .courses
            .remove(course_id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    pub fn upsert_member(&self, member: MemberSeed) -> Result<(), RepositoryError> {
        self.tables()?.members.insert(member.id, member);
        Ok(())
    }

    fn tables(&self) -> Result<MutexGuard<'_, RosterTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("roster store lock poisoned".to_string()))
    }
}

impl RosterTables {
    fn resolve_member(&self, row: &MemberSeed) -> MemberRecord {
        MemberRecord {
            id: row.id,
            name: row.name.clone(),
            public_name: row.public_name.clone(),
            email: row.email.clone(),
            role: row.role,
            rank: row.rank_id.and_then(|rank_id| self.ranks.get(&rank_id).cloned()),
            deleted_at: row.deleted_at,
        }
    }
}

impl CatalogRepository for InMemoryRoster {
    fn course(&self, id: &CourseId) -> Result<Option<Course>, RepositoryError> {
        Ok(self.tables()?.courses.get(id).cloned())
    }

    fn courses(&self) -> Result<Vec<Course>, RepositoryError> {
        let mut courses: Vec<Course> = self.tables()?.courses.values().cloned().collect();
        courses.sort_by(|left, right| left.code.cmp(&right.code).then(left.id.cmp(&right.id)));
        Ok(courses)
    }

    fn rank(&self, id: &RankId) -> Result<Option<Rank>, RepositoryError> {
        Ok(self.tables()?.ranks.get(id).cloned())
    }

    fn unlocks_for_rank(&self, rank_id: &RankId) -> Result<Vec<Course>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .unlocks
            .iter()
            .filter(|unlock| unlock.rank_id == *rank_id)
            .filter_map(|unlock| tables.courses.get(&unlock.course_id).cloned())
            .collect())
    }

    fn ranks_unlocking(&self, course_id: &CourseId) -> Result<Vec<RankId>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .unlocks
            .iter()
            .filter(|unlock| unlock.course_id == *course_id)
            .filter(|unlock| tables.ranks.contains_key(&unlock.rank_id))
            .map(|unlock| unlock.rank_id)
            .collect())
    }

    fn prerequisites_for_courses(
        &self,
        course_ids: &[CourseId],
    ) -> Result<Vec<PrerequisiteEdge>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .prerequisites
            .iter()
            .filter(|(course_id, _)| course_ids.contains(course_id))
            .filter_map(|(course_id, prerequisite_id)| {
                tables
                    .courses
                    .get(prerequisite_id)
                    .map(|prerequisite| PrerequisiteEdge {
                        course_id: *course_id,
                        prerequisite: prerequisite.clone(),
                    })
            })
            .collect())
    }

    fn ascenso_ladder(&self) -> Result<Vec<AscensoRung>, RepositoryError> {
        let tables = self.tables()?;
        let mut minimum: BTreeMap<CourseId, i32> = BTreeMap::new();
        for unlock in &tables.unlocks {
            let Some(rank) = tables.ranks.get(&unlock.rank_id) else {
                continue;
            };
            minimum
                .entry(unlock.course_id)
                .and_modify(|order| *order = (*order).min(rank.sort_order))
                .or_insert(rank.sort_order);
        }

        Ok(minimum
            .into_iter()
            .filter_map(|(course_id, minimum_sort_order)| {
                tables
                    .courses
                    .get(&course_id)
                    .filter(|course| course.is_ascenso())
                    .map(|course| AscensoRung {
                        course: course.clone(),
                        minimum_sort_order,
                    })
            })
            .collect())
    }

    fn insert_unlock(&self, unlock: RankCourseUnlock) -> Result<RankCourseUnlock, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.unlocks.iter().any(|existing| {
            existing.rank_id == unlock.rank_id && existing.course_id == unlock.course_id
        }) {
            return Err(RepositoryError::Conflict);
        }
        tables.unlocks.push(unlock.clone());
        Ok(unlock)
    }

    fn delete_unlock(&self, rank_id: &RankId, course_id: &CourseId) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.unlocks.len();
        tables
            .unlocks
            .retain(|unlock| !(unlock.rank_id == *rank_id && unlock.course_id == *course_id));
        if tables.unlocks.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn insert_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let edge = (*course_id, *prerequisite_id);
        if tables.prerequisites.contains(&edge) {
            return Err(RepositoryError::Conflict);
        }
        tables.prerequisites.push(edge);
        Ok(())
    }

    fn delete_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let edge = (*course_id, *prerequisite_id);
        let before = tables.prerequisites.len();
        tables.prerequisites.retain(|existing| *existing != edge);
        if tables.prerequisites.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn is_instructor(
        &self,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .tables()?
            .instructors
            .contains(&(*course_id, *member_id)))
    }

    fn courses_for_instructor(&self, member_id: &MemberId) -> Result<Vec<Course>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .instructors
            .iter()
            .rev()
            .filter(|(_, instructor)| instructor == member_id)
            .filter_map(|(course_id, _)| tables.courses.get(course_id).cloned())
            .collect())
    }

    fn instructors_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<MemberId>, RepositoryError> {
        Ok(self
            .tables()?
            .instructors
            .iter()
            .filter(|(course, _)| course == course_id)
            .map(|(_, member_id)| *member_id)
            .collect())
    }

    fn insert_instructor(
        &self,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let assignment = (*course_id, *member_id);
        if tables.instructors.contains(&assignment) {
            return Err(RepositoryError::Conflict);
        }
        tables.instructors.push(assignment);
        Ok(())
    }

    fn delete_instructor(
        &self,
        course_id: &CourseId,
        member_id: &MemberId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let assignment = (*course_id, *member_id);
        let before = tables.instructors.len();
        tables.instructors.retain(|existing| *existing != assignment);
        if tables.instructors.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl MemberRepository for InMemoryRoster {
    fn member(&self, id: &MemberId) -> Result<Option<MemberRecord>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .members
            .get(id)
            .filter(|row| row.deleted_at.is_none())
            .map(|row| tables.resolve_member(row)))
    }

    fn members(&self, include_deleted: bool) -> Result<Vec<MemberRecord>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .members
            .values()
            .filter(|row| include_deleted || row.deleted_at.is_none())
            .map(|row| tables.resolve_member(row))
            .collect())
    }

    fn approved_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<ApprovedCourse>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .approvals
            .iter()
            .filter(|edge| edge.member_id == *member_id)
            .filter_map(|edge| {
                tables.courses.get(&edge.course_id).map(|course| ApprovedCourse {
                    course: course.clone(),
                    approved_at: edge.approved_at,
                })
            })
            .collect())
    }

    fn approvals_for_courses(
        &self,
        course_ids: &[CourseId],
    ) -> Result<Vec<ApprovalEdge>, RepositoryError> {
        Ok(self
            .tables()?
            .approvals
            .iter()
            .filter(|edge| course_ids.contains(&edge.course_id))
            .copied()
            .collect())
    }

    fn insert_approval(&self, edge: ApprovalEdge) -> Result<ApprovalEdge, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.approvals.iter().any(|existing| {
            existing.member_id == edge.member_id && existing.course_id == edge.course_id
        }) {
            return Err(RepositoryError::Conflict);
        }
        tables.approvals.push(edge);
        Ok(edge)
    }

    fn delete_approval(
        &self,
        member_id: &MemberId,
        course_id: &CourseId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.approvals.len();
        tables
            .approvals
            .retain(|edge| !(edge.member_id == *member_id && edge.course_id == *course_id));
        if tables.approvals.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
