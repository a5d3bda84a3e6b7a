use std::collections::BTreeMap;

use super::super::domain::{AscensoRung, CourseId};

/// Promotion courses positioned by the lowest rank sort order that unlocks them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AscensoLadder {
    rungs: BTreeMap<CourseId, i32>,
    ordered: Vec<(i32, CourseId)>,
}

impl AscensoLadder {
    /// Duplicate entries for a course keep the lowest order.
    pub fn from_orders<I>(orders: I) -> Self
    where
        I: IntoIterator<Item = (CourseId, i32)>,
    {
        let mut rungs: BTreeMap<CourseId, i32> = BTreeMap::new();
        for (course_id, order) in orders {
            rungs
                .entry(course_id)
                .and_modify(|current| *current = (*current).min(order))
                .or_insert(order);
        }

        let mut ordered: Vec<(i32, CourseId)> =
            rungs.iter().map(|(course_id, order)| (*order, *course_id)).collect();
        ordered.sort_unstable();

        Self { rungs, ordered }
    }

    pub fn from_rungs(rungs: &[AscensoRung]) -> Self {
        Self::from_orders(
            rungs
                .iter()
                .map(|rung| (rung.course.id, rung.minimum_sort_order)),
        )
    }

    pub fn rung_of(&self, course_id: &CourseId) -> Option<i32> {
        self.rungs.get(course_id).copied()
    }

    /// Courses sitting strictly below `order`, lowest rung first. Courses sharing a rung
    /// never appear below one another.
    pub fn courses_below(&self, order: i32) -> impl Iterator<Item = CourseId> + '_ {
        self.ordered
            .iter()
            .take_while(move |(rung, _)| *rung < order)
            .map(|(_, course_id)| *course_id)
    }

    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }
}
