use serde::{Deserialize, Serialize};

use super::super::domain::CourseSummary;

/// Why a member cannot take a course right now. Serialized with the wire codes callers
/// render messages from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityReason {
    NoRank,
    NotUnlocked,
    AlreadyApproved,
    MissingPrerequisites,
    CourseNotFound,
}

impl EligibilityReason {
    pub fn code(&self) -> &'static str {
        match self {
            EligibilityReason::NoRank => "NO_RANK",
            EligibilityReason::NotUnlocked => "NOT_UNLOCKED",
            EligibilityReason::AlreadyApproved => "ALREADY_APPROVED",
            EligibilityReason::MissingPrerequisites => "MISSING_PREREQUISITES",
            EligibilityReason::CourseNotFound => "COURSE_NOT_FOUND",
        }
    }
}

/// Outcome of evaluating one member against one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub reason: Option<EligibilityReason>,
    pub missing_prerequisites: Vec<CourseSummary>,
}

impl EligibilityVerdict {
    pub fn eligible() -> Self {
        Self {
            eligible: true,
            reason: None,
            missing_prerequisites: Vec::new(),
        }
    }

    pub fn ineligible(reason: EligibilityReason) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
            missing_prerequisites: Vec::new(),
        }
    }

    pub fn missing(missing_prerequisites: Vec<CourseSummary>) -> Self {
        Self {
            eligible: false,
            reason: Some(EligibilityReason::MissingPrerequisites),
            missing_prerequisites,
        }
    }

    /// Human readable explanation, listing prerequisite codes when that is the blocker.
    pub fn summary(&self) -> String {
        match self.reason {
            None => "eligible".to_string(),
            Some(EligibilityReason::MissingPrerequisites) => {
                let codes: Vec<&str> = self
                    .missing_prerequisites
                    .iter()
                    .map(|course| course.code.as_str())
                    .collect();
                format!("missing prerequisites: {}", codes.join(", "))
            }
            Some(reason) => format!("not eligible ({})", reason.code()),
        }
    }
}
