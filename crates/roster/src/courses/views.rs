use serde::{Deserialize, Serialize};

use super::domain::{
    ApprovedCourse, CourseId, CourseSummary, MemberId, MemberRecord, MemberRole, MemberSummary,
    Rank,
};
use super::eligibility::{EligibilityReason, EligibilityVerdict};

/// Switches for an instructor candidate scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CandidateScanOptions {
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub include_ineligible: bool,
}

/// Members partitioned by whether they may take a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateScan {
    pub course_id: CourseId,
    pub users: Vec<MemberSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ineligible: Option<Vec<IneligibleCandidate>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IneligibleCandidate {
    #[serde(flatten)]
    pub member: MemberSummary,
    pub reason: Option<EligibilityReason>,
    pub missing_prerequisites: Vec<CourseSummary>,
}

impl IneligibleCandidate {
    pub(crate) fn new(member: MemberSummary, verdict: EligibilityVerdict) -> Self {
        Self {
            member,
            reason: verdict.reason,
            missing_prerequisites: verdict.missing_prerequisites,
        }
    }
}

/// Member landing view: profile, approved history and what is open next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseDashboard {
    pub member: DashboardMember,
    pub approved: Vec<ApprovedCourse>,
    pub available: Vec<CourseSummary>,
    pub counts: DashboardCounts,
}

impl CourseDashboard {
    pub(crate) fn new(
        member: &MemberRecord,
        approved: Vec<ApprovedCourse>,
        available: Vec<CourseSummary>,
    ) -> Self {
        let counts = DashboardCounts {
            approved: approved.len(),
            available: available.len(),
        };
        Self {
            member: DashboardMember::from(member),
            approved,
            available,
            counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardMember {
    pub id: MemberId,
    pub name: String,
    pub public_name: Option<String>,
    pub email: String,
    pub role: MemberRole,
    pub rank: Option<Rank>,
}

impl From<&MemberRecord> for DashboardMember {
    fn from(member: &MemberRecord) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            public_name: member.public_name.clone(),
            email: member.email.clone(),
            role: member.role,
            rank: member.rank.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub approved: usize,
    pub available: usize,
}
