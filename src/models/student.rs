//! Student Entity
//!
//! The demo domain object served by the cached lookup endpoints.

use serde::{Deserialize, Serialize};

// == Student ==
/// A student record as returned by the lookup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier, also the cache key for lookups
    pub id: u64,
    /// Full name
    pub name: String,
    /// Enrolled course
    pub course: String,
}

impl Student {
    /// Creates a new student record.
    pub fn new(id: u64, name: impl Into<String>, course: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            course: course.into(),
        }
    }
}
