//! Per-term score listing (`ScoreQuery`).

use std::sync::OnceLock;

use common::{
    error::AppError,
    storage::types::score::{ScoreEntry, ScoreResult},
    utils::fetcher::{DocumentFetcher, Endpoint},
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

use crate::utils::{
    html::{cached_regex, ensure_document, first, selector, stripped_text},
    portal::read_header,
    slots::project,
};

static CREDIT: OnceLock<Result<Regex, String>> = OnceLock::new();
static COURSE_LABEL: OnceLock<Result<Regex, String>> = OnceLock::new();

/// Fetches the score page for `term`, or the portal's current term when the
/// term is absent or empty.
pub async fn fetch_score_document(
    fetcher: &dyn DocumentFetcher,
    user_id: &str,
    term: Option<&str>,
) -> Result<String, AppError> {
    let term = term.filter(|term| !term.is_empty());
    info!(user_id, term = term.unwrap_or("current"), "Fetching scores");

    match term {
        Some(term) => {
            fetcher
                .fetch(Endpoint::ScoreQuery, user_id, &[("term", term)])
                .await
        }
        None => fetcher.fetch(Endpoint::ScoreQuery, user_id, &[]).await,
    }
}

pub fn extract_scores(raw: &str) -> Result<ScoreResult, AppError> {
    ensure_document(raw, "score")?;

    let document = Html::parse_document(raw);
    let root = document.root_element();
    let header = read_header(root)?;

    let rows = RowSelectors::new()?;
    let mut scores = Vec::new();
    for row in root.select(&rows.row) {
        if let Some(entry) = extract_row(row, &rows)? {
            scores.push(entry);
        }
    }

    Ok(ScoreResult {
        student_name: header.student_name,
        current_term: header.current_term,
        available_terms: header.available_terms,
        score_count: header.reported_count,
        scores,
    })
}

struct RowSelectors {
    row: Selector,
    text: Selector,
    course: Selector,
    grade: Selector,
    score: Selector,
    kind: Selector,
    mark: Selector,
}

impl RowSelectors {
    fn new() -> Result<Self, AppError> {
        Ok(Self {
            row: selector("div.row")?,
            text: selector("div.text")?,
            course: selector("span.course")?,
            grade: selector("div.grade")?,
            score: selector("span.score")?,
            kind: selector("div.type")?,
            mark: selector("mark")?,
        })
    }
}

/// ```html
/// <div class="row"><div class="col-xs-12">
///   <div class="text">
///     <span class="course">【主修】【1500190200】军事技能(学分:1.0)</span>
///     <div class="grade">
///       期末成绩:<span class="score">合格</span><br/>
///       重考成绩:<span class="score"></span><br/>
///       重修成绩:<span class="score"></span>
///     </div>
///   </div>
///   <div class="type"><span class="require"><mark>必修课</mark></span></div>
/// </div></div>
/// ```
fn extract_row(row: ElementRef<'_>, s: &RowSelectors) -> Result<Option<ScoreEntry>, AppError> {
    let Some(text) = first(row, &s.text) else {
        return Ok(None);
    };
    let Some(course) = first(text, &s.course) else {
        return Ok(None);
    };

    let label = stripped_text(course);
    let credit = parse_credit(&label)?;
    let (major, course_code, course_name) = split_course_label(&label)?;

    let [final_score, reexam_score, retake_score] = match first(text, &s.grade) {
        Some(grade) => project::<_, 3>(grade.select(&s.score).map(stripped_text)),
        None => [None, None, None],
    };

    let course_type = first(row, &s.kind)
        .and_then(|kind| first(kind, &s.mark))
        .map(stripped_text)
        .unwrap_or_default();

    Ok(Some(ScoreEntry {
        course_name,
        course_code,
        final_score: final_score.unwrap_or_default(),
        reexam_score: reexam_score.filter(|score| !score.is_empty()),
        retake_score: retake_score.filter(|score| !score.is_empty()),
        course_type,
        credit,
        major,
    }))
}

/// `(学分:1.0)` anywhere in the label; absent or malformed means 0.0.
fn parse_credit(label: &str) -> Result<f64, AppError> {
    let pattern = cached_regex(&CREDIT, r"\(学分:([\d.]+)\)")?;
    Ok(pattern
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|value| value.as_str().parse().ok())
        .unwrap_or(0.0))
}

/// `【主修】【1500190200】军事技能(学分:1.0)` → (major, code, name).
/// Labels outside that shape keep the whole text as the name.
fn split_course_label(label: &str) -> Result<(String, String, String), AppError> {
    let pattern = cached_regex(&COURSE_LABEL, r"【(.*?)】【(.*?)】(.*?)(?:\(|$)")?;
    Ok(match pattern.captures(label) {
        Some(caps) => {
            let group = |index| caps.get(index).map_or("", |m| m.as_str());
            (
                group(1).to_string(),
                group(2).to_string(),
                group(3).trim().to_string(),
            )
        }
        None => (String::new(), String::new(), label.to_string()),
    })
}
