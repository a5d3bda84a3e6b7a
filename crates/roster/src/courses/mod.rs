//! Course progression for roster members: which courses a member may take next, which
//! members an instructor may approve, and the approval edges themselves.

pub mod catalog;
pub mod domain;
pub mod eligibility;
pub mod instructor;
pub mod memory;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::CatalogEditor;
pub use domain::{
    ApprovalEdge, ApprovedCourse, AscensoRung, Course, CourseCategory, CourseId, CourseSummary,
    MemberId, MemberRecord, MemberRole, MemberSummary, PrerequisiteEdge, Rank, RankCourseUnlock,
    RankId,
};
pub use eligibility::{
    evaluate, AscensoLadder, CatalogSnapshot, EligibilityReason, EligibilityVerdict,
    MemberStanding,
};
pub use instructor::{InstructorAccess, InstructorDesk, Requester};
pub use memory::InMemoryRoster;
pub use repository::{CatalogRepository, MemberRepository, RepositoryError};
pub use router::{catalog_router, course_router, REQUESTER_ID_HEADER, REQUESTER_ROLE_HEADER};
pub use seed::{CatalogSeed, MemberSeed, SeedImportError};
pub use service::{CourseProgressService, CourseServiceError};
pub use views::{
    CandidateScan, CandidateScanOptions, CourseDashboard, DashboardCounts, DashboardMember,
    IneligibleCandidate,
};
