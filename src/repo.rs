//! Student Directory
//!
//! In-memory stand-in for the persistence layer. Lookups are deliberately
//! slowed down a little so the effect of caching is visible, and every
//! fetch is counted so tests can assert how often the backing store was
//! actually consulted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::info;

use crate::models::Student;

/// Simulated latency of one backing-store lookup.
const FETCH_DELAY: Duration = Duration::from_millis(20);

// == Student Directory ==
/// The data source consulted by the cache's compute function on a miss.
#[derive(Debug, Default)]
pub struct StudentDirectory {
    /// Records keyed by student id
    records: BTreeMap<u64, Student>,
    /// How many times `find` went to the backing store
    fetches: AtomicU64,
}

impl StudentDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory pre-populated with a few demo records.
    pub fn with_demo_records() -> Self {
        let mut directory = Self::new();
        directory.insert(Student::new(1, "Ada Lovelace", "Analytical Engines"));
        directory.insert(Student::new(2, "Grace Hopper", "Compilers"));
        directory.insert(Student::new(3, "Barbara Liskov", "Type Systems"));
        directory
    }

    /// Adds or replaces a record.
    pub fn insert(&mut self, student: Student) {
        self.records.insert(student.id, student);
    }

    // == Find ==
    /// Fetches one student by id, simulating a slow backing store.
    pub async fn find(&self, id: u64) -> Option<Student> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        info!(id, "fetching student from directory");
        tokio::time::sleep(FETCH_DELAY).await;
        self.records.get(&id).cloned()
    }

    // == Find All ==
    /// Returns every record, id-ordered. Not cached.
    pub fn all(&self) -> Vec<Student> {
        self.records.values().cloned().collect()
    }

    /// Number of times `find` hit the backing store.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}
