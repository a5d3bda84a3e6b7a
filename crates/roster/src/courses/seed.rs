use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Course, CourseId, MemberId, MemberRole, Rank, RankCourseUnlock, RankId};

/// Full roster snapshot used to hydrate the in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub ranks: Vec<Rank>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub unlocks: Vec<RankCourseUnlock>,
    #[serde(default)]
    pub prerequisites: Vec<PrerequisiteSeed>,
    #[serde(default)]
    pub members: Vec<MemberSeed>,
    #[serde(default)]
    pub approvals: Vec<ApprovalSeed>,
    #[serde(default)]
    pub instructors: Vec<InstructorSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteSeed {
    pub course_id: CourseId,
    pub prerequisite_id: CourseId,
}

/// Member row as stored: the rank is a reference, resolved on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSeed {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub public_name: Option<String>,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: MemberRole,
    #[serde(default)]
    pub rank_id: Option<RankId>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

fn default_role() -> MemberRole {
    MemberRole::User
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSeed {
    pub member_id: MemberId,
    pub course_id: CourseId,
    #[serde(default = "Utc::now")]
    pub approved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorSeed {
    pub course_id: CourseId,
    pub member_id: MemberId,
}

#[derive(Debug)]
pub enum SeedImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Integrity(String),
}

impl std::fmt::Display for SeedImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedImportError::Io(err) => write!(f, "failed to read roster seed: {}", err),
            SeedImportError::Json(err) => write!(f, "invalid roster seed JSON: {}", err),
            SeedImportError::Integrity(detail) => {
                write!(f, "roster seed is inconsistent: {}", detail)
            }
        }
    }
}

impl std::error::Error for SeedImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedImportError::Io(err) => Some(err),
            SeedImportError::Json(err) => Some(err),
            SeedImportError::Integrity(_) => None,
        }
    }
}

impl From<std::io::Error> for SeedImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SeedImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl CatalogSeed {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeedImportError> {
        let seed: CatalogSeed = serde_json::from_reader(reader)?;
        seed.validate()?;
        Ok(seed)
    }

    /// Rejects dangling references, duplicate keys and self-referential prerequisites.
    pub fn validate(&self) -> Result<(), SeedImportError> {
        let rank_ids = unique_keys("rank id", self.ranks.iter().map(|rank| rank.id))?;
        let course_ids = unique_keys("course id", self.courses.iter().map(|course| course.id))?;
        unique_keys("course code", self.courses.iter().map(|course| course.code.trim()))?;
        let member_ids = unique_keys("member id", self.members.iter().map(|member| member.id))?;

        for member in &self.members {
            if let Some(rank_id) = member.rank_id {
                require(&rank_ids, rank_id, "rank", || format!("member {}", member.id))?;
            }
        }

        unique_keys(
            "unlock",
            self.unlocks.iter().map(|unlock| (unlock.rank_id, unlock.course_id)),
        )?;
        for unlock in &self.unlocks {
            require(&rank_ids, unlock.rank_id, "rank", || "unlock".to_string())?;
            require(&course_ids, unlock.course_id, "course", || "unlock".to_string())?;
        }

        unique_keys(
            "prerequisite",
            self.prerequisites
                .iter()
                .map(|edge| (edge.course_id, edge.prerequisite_id)),
        )?;
        for edge in &self.prerequisites {
            if edge.course_id == edge.prerequisite_id {
                return Err(SeedImportError::Integrity(format!(
                    "course {} lists itself as a prerequisite",
                    edge.course_id
                )));
            }
            require(&course_ids, edge.course_id, "course", || "prerequisite".to_string())?;
            require(&course_ids, edge.prerequisite_id, "course", || {
                "prerequisite".to_string()
            })?;
        }

        unique_keys(
            "approval",
            self.approvals
                .iter()
                .map(|approval| (approval.member_id, approval.course_id)),
        )?;
        for approval in &self.approvals {
            require(&member_ids, approval.member_id, "member", || "approval".to_string())?;
            require(&course_ids, approval.course_id, "course", || "approval".to_string())?;
        }

        unique_keys(
            "instructor assignment",
            self.instructors
                .iter()
                .map(|assignment| (assignment.course_id, assignment.member_id)),
        )?;
        for assignment in &self.instructors {
            require(&member_ids, assignment.member_id, "member", || {
                "instructor assignment".to_string()
            })?;
            require(&course_ids, assignment.course_id, "course", || {
                "instructor assignment".to_string()
            })?;
        }

        Ok(())
    }
}

fn unique_keys<K, I>(label: &str, keys: I) -> Result<BTreeSet<K>, SeedImportError>
where
    K: Ord + std::fmt::Debug,
    I: IntoIterator<Item = K>,
{
    let mut seen = BTreeSet::new();
    for key in keys {
        if seen.contains(&key) {
            return Err(SeedImportError::Integrity(format!(
                "duplicate {label} {key:?}"
            )));
        }
        seen.insert(key);
    }
    Ok(seen)
}

fn require<K, F>(
    known: &BTreeSet<K>,
    key: K,
    entity: &str,
    context: F,
) -> Result<(), SeedImportError>
where
    K: Ord + std::fmt::Display,
    F: FnOnce() -> String,
{
    if known.contains(&key) {
        Ok(())
    } else {
        Err(SeedImportError::Integrity(format!(
            "{} references unknown {entity} {key}",
            context()
        )))
    }
}
