//! Pure eligibility evaluation over a prefetched [`CatalogSnapshot`].
//!
//! Checks run in a fixed order and the first failure wins: the course must exist, the
//! member must hold a rank, the rank must unlock the course, the course must not already
//! be approved, every direct prerequisite must be approved, and flagged courses also need
//! every lower ascenso rung approved.

mod ladder;
mod policy;
mod snapshot;

pub use ladder::AscensoLadder;
pub use policy::{EligibilityReason, EligibilityVerdict};
pub use snapshot::CatalogSnapshot;

use super::domain::{Course, CourseId, CourseSummary, MemberId, MemberRecord, Rank};

/// The parts of a member the evaluator looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStanding {
    pub member_id: MemberId,
    pub rank: Option<Rank>,
}

impl From<&MemberRecord> for MemberStanding {
    fn from(member: &MemberRecord) -> Self {
        Self {
            member_id: member.id,
            rank: member.rank.clone(),
        }
    }
}

pub fn evaluate(
    member: &MemberStanding,
    course_id: CourseId,
    snapshot: &CatalogSnapshot,
) -> EligibilityVerdict {
    let Some(course) = snapshot.course(&course_id) else {
        return EligibilityVerdict::ineligible(EligibilityReason::CourseNotFound);
    };

    let Some(rank) = member.rank.as_ref() else {
        return EligibilityVerdict::ineligible(EligibilityReason::NoRank);
    };

    if !snapshot.is_unlocked(&rank.id, &course_id) {
        return EligibilityVerdict::ineligible(EligibilityReason::NotUnlocked);
    }

    if snapshot.has_approved(&member.member_id, &course_id) {
        return EligibilityVerdict::ineligible(EligibilityReason::AlreadyApproved);
    }

    let missing = missing_explicit_prerequisites(member, course_id, snapshot);
    if !missing.is_empty() {
        return EligibilityVerdict::missing(missing);
    }

    if course.requires_all_previous_ascenso {
        let missing = missing_previous_ascenso(member, course, snapshot);
        if !missing.is_empty() {
            return EligibilityVerdict::missing(missing);
        }
    }

    EligibilityVerdict::eligible()
}

// Direct edges only. A cycle or a self edge is read once and cannot recurse.
fn missing_explicit_prerequisites(
    member: &MemberStanding,
    course_id: CourseId,
    snapshot: &CatalogSnapshot,
) -> Vec<CourseSummary> {
    snapshot
        .prerequisites_of(&course_id)
        .iter()
        .filter(|prerequisite| !snapshot.has_approved(&member.member_id, prerequisite))
        .filter_map(|prerequisite| snapshot.summary(prerequisite))
        .collect()
}

fn missing_previous_ascenso(
    member: &MemberStanding,
    course: &Course,
    snapshot: &CatalogSnapshot,
) -> Vec<CourseSummary> {
    let Some(ladder) = snapshot.ladder() else {
        tracing::warn!(
            course_id = %course.id,
            "ascenso ladder missing from snapshot; skipping previous-ascenso check"
        );
        return Vec::new();
    };

    // A course nobody unlocks has no position and so no lower rungs.
    let Some(position) = snapshot.ladder_position(&course.id) else {
        return Vec::new();
    };

    ladder
        .courses_below(position)
        .filter(|previous| *previous != course.id)
        .filter(|previous| !snapshot.has_approved(&member.member_id, previous))
        .filter_map(|previous| snapshot.summary(&previous))
        .collect()
}
