use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Catalog identifier of a course.
    CourseId
);
numeric_id!(
    /// Catalog identifier of a rank.
    RankId
);
numeric_id!(
    /// Roster identifier of a member account.
    MemberId
);

/// Course track. Only promotion courses take part in the ascenso ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseCategory {
    Ascenso,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<CourseCategory>,
    #[serde(default)]
    pub requires_all_previous_ascenso: bool,
}

impl Course {
    pub fn is_ascenso(&self) -> bool {
        self.category == Some(CourseCategory::Ascenso)
    }

    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

/// Lightweight projection used everywhere a course is reported back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: CourseId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    pub id: RankId,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    User,
    Editor,
    Moderator,
    Formacion,
    SuperAdmin,
}

impl MemberRole {
    pub fn label(&self) -> &'static str {
        match self {
            MemberRole::User => "USER",
            MemberRole::Editor => "EDITOR",
            MemberRole::Moderator => "MODERATOR",
            MemberRole::Formacion => "FORMACION",
            MemberRole::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl FromStr for MemberRole {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(MemberRole::User),
            "EDITOR" => Ok(MemberRole::Editor),
            "MODERATOR" => Ok(MemberRole::Moderator),
            "FORMACION" => Ok(MemberRole::Formacion),
            "SUPER_ADMIN" => Ok(MemberRole::SuperAdmin),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown member role '{0}'")]
pub struct UnknownRole(pub String);

/// Member account with its rank already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub public_name: Option<String>,
    pub email: String,
    pub role: MemberRole,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MemberRecord {
    pub fn rank_id(&self) -> Option<RankId> {
        self.rank.as_ref().map(|rank| rank.id)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn summary(&self) -> MemberSummary {
        MemberSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            deleted_at: self.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Edge granting a rank access to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCourseUnlock {
    pub rank_id: RankId,
    pub course_id: CourseId,
    #[serde(default)]
    pub note: Option<String>,
}

/// Explicit dependency: `course_id` requires `prerequisite` to be approved first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteEdge {
    pub course_id: CourseId,
    pub prerequisite: Course,
}

/// Approval edge as seen from the member side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedCourse {
    pub course: Course,
    pub approved_at: DateTime<Utc>,
}

/// Approval edge as returned by batch queries over several courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEdge {
    pub member_id: MemberId,
    pub course_id: CourseId,
    pub approved_at: DateTime<Utc>,
}

/// An ascenso course together with the lowest rank sort order that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AscensoRung {
    pub course: Course,
    pub minimum_sort_order: i32,
}
