pub mod exam;
pub mod schedule;
pub mod score;

use serde::{Deserialize, Serialize};

use self::{exam::ExamResult, schedule::ScheduleResult, score::ScoreResult};

/// A selectable term from a portal dropdown menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermItem {
    /// Term label, e.g. "2025.1".
    pub name: String,
    /// Portal-relative link for the term, carried through unmodified.
    pub url: String,
}

/// Everything the request layer keeps in the result cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRecord {
    Schedule(ScheduleResult),
    Scores(ScoreResult),
    Exams(ExamResult),
    ValidTerms(Vec<String>),
}

/// Conversion between a typed result and its cache representation.
pub trait Cacheable: Clone + Sized {
    fn into_record(self) -> CachedRecord;
    fn from_record(record: CachedRecord) -> Option<Self>;
}

impl Cacheable for ScheduleResult {
    fn into_record(self) -> CachedRecord {
        CachedRecord::Schedule(self)
    }

    fn from_record(record: CachedRecord) -> Option<Self> {
        match record {
            CachedRecord::Schedule(result) => Some(result),
            _ => None,
        }
    }
}

impl Cacheable for ScoreResult {
    fn into_record(self) -> CachedRecord {
        CachedRecord::Scores(self)
    }

    fn from_record(record: CachedRecord) -> Option<Self> {
        match record {
            CachedRecord::Scores(result) => Some(result),
            _ => None,
        }
    }
}

impl Cacheable for ExamResult {
    fn into_record(self) -> CachedRecord {
        CachedRecord::Exams(self)
    }

    fn from_record(record: CachedRecord) -> Option<Self> {
        match record {
            CachedRecord::Exams(result) => Some(result),
            _ => None,
        }
    }
}

impl Cacheable for Vec<String> {
    fn into_record(self) -> CachedRecord {
        CachedRecord::ValidTerms(self)
    }

    fn from_record(record: CachedRecord) -> Option<Self> {
        match record {
            CachedRecord::ValidTerms(terms) => Some(terms),
            _ => None,
        }
    }
}
