use serde::{Deserialize, Serialize};

use super::TermItem;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub course_name: String,
    pub course_code: String,
    /// Grades are not always numeric ("合格", "通过").
    pub final_score: String,
    pub reexam_score: Option<String>,
    pub retake_score: Option<String>,
    pub course_type: String,
    pub credit: f64,
    /// Enrollment category, e.g. "主修".
    pub major: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    pub student_name: String,
    pub current_term: String,
    pub available_terms: Vec<TermItem>,
    /// Count announced by the page, independent of `scores.len()`.
    pub score_count: u32,
    pub scores: Vec<ScoreEntry>,
}
