//! Course eligibility, availability and instructor candidate resolution for rank-based
//! membership rosters.

pub mod config;
pub mod courses;
pub mod error;
pub mod telemetry;
