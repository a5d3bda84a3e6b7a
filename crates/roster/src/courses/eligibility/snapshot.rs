use std::collections::{BTreeMap, BTreeSet};

use super::super::domain::{
    ApprovalEdge, AscensoRung, Course, CourseId, CourseSummary, MemberId, PrerequisiteEdge, RankId,
};
use super::ladder::AscensoLadder;

/// Id-keyed view of the catalog rows one evaluation pass needs. Built once from batch
/// reads, then shared by every evaluation in the pass.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    courses: BTreeMap<CourseId, Course>,
    unlocks: BTreeMap<RankId, BTreeSet<CourseId>>,
    prerequisites: BTreeMap<CourseId, Vec<CourseId>>,
    approvals: BTreeMap<MemberId, BTreeSet<CourseId>>,
    ladder: Option<AscensoLadder>,
    unlock_orders: BTreeMap<CourseId, i32>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_course(&mut self, course: Course) {
        self.courses.insert(course.id, course);
    }

    pub fn insert_unlock(&mut self, rank_id: RankId, course_id: CourseId) {
        self.unlocks.entry(rank_id).or_default().insert(course_id);
    }

    /// Records the prerequisite edges for a course. Repeated prerequisites collapse to the
    /// first occurrence.
    pub fn insert_prerequisite_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = PrerequisiteEdge>,
    {
        for edge in edges {
            let listed = self.prerequisites.entry(edge.course_id).or_default();
            if !listed.contains(&edge.prerequisite.id) {
                listed.push(edge.prerequisite.id);
            }
            self.courses
                .entry(edge.prerequisite.id)
                .or_insert(edge.prerequisite);
        }
    }

    pub fn insert_approval(&mut self, member_id: MemberId, course_id: CourseId) {
        self.approvals.entry(member_id).or_default().insert(course_id);
    }

    pub fn insert_approval_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = ApprovalEdge>,
    {
        for edge in edges {
            self.insert_approval(edge.member_id, edge.course_id);
        }
    }

    pub fn attach_ladder(&mut self, rungs: Vec<AscensoRung>) {
        let ladder = AscensoLadder::from_rungs(&rungs);
        for rung in rungs {
            self.courses.entry(rung.course.id).or_insert(rung.course);
        }
        self.ladder = Some(ladder);
    }

    /// Records the lowest rank sort order unlocking a course that is not an ascenso rung.
    pub fn insert_unlock_order(&mut self, course_id: CourseId, order: i32) {
        self.unlock_orders
            .entry(course_id)
            .and_modify(|current| *current = (*current).min(order))
            .or_insert(order);
    }

    pub fn course(&self, course_id: &CourseId) -> Option<&Course> {
        self.courses.get(course_id)
    }

    pub fn summary(&self, course_id: &CourseId) -> Option<CourseSummary> {
        self.course(course_id).map(Course::summary)
    }

    pub fn is_unlocked(&self, rank_id: &RankId, course_id: &CourseId) -> bool {
        self.unlocks
            .get(rank_id)
            .is_some_and(|courses| courses.contains(course_id))
    }

    pub fn has_approved(&self, member_id: &MemberId, course_id: &CourseId) -> bool {
        self.approvals
            .get(member_id)
            .is_some_and(|courses| courses.contains(course_id))
    }

    pub fn prerequisites_of(&self, course_id: &CourseId) -> &[CourseId] {
        self.prerequisites
            .get(course_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn ladder(&self) -> Option<&AscensoLadder> {
        self.ladder.as_ref()
    }

    /// Ladder position of a course: its rung when it is an ascenso course, otherwise the
    /// lowest sort order among the ranks unlocking it.
    pub fn ladder_position(&self, course_id: &CourseId) -> Option<i32> {
        self.ladder
            .as_ref()
            .and_then(|ladder| ladder.rung_of(course_id))
            .or_else(|| self.unlock_orders.get(course_id).copied())
    }
}
