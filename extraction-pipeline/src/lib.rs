#![allow(clippy::missing_docs_in_private_items)]

pub mod discovery;
pub mod exam;
pub mod schedule;
pub mod score;
mod utils;

pub use discovery::TermDiscovery;
pub use exam::{extract_exams, fetch_exam_document};
pub use schedule::{extract_schedule, fetch_schedule_document};
pub use score::{extract_scores, fetch_score_document};
