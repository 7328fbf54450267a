use serde::{Deserialize, Serialize};

use super::TermItem;

/// Exam menus share the score menu's shape.
pub type ExamTermItem = TermItem;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamEntry {
    pub course_name: String,
    /// Week label as printed, e.g. "第18周".
    pub week: String,
    pub exam_date: String,
    pub day_of_week: String,
    pub time_range: String,
    pub time_start: String,
    pub time_end: String,
    pub location: String,
    pub course_type: String,
    pub class_name: String,
    /// Number of examinees.
    pub exam_count_num: u32,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamResult {
    pub student_name: String,
    pub current_term: String,
    pub available_terms: Vec<ExamTermItem>,
    /// Count announced by the page, independent of `exams.len()`.
    pub exam_count: u32,
    pub exams: Vec<ExamEntry>,
}
