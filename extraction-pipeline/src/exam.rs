//! Exam arrangement listing (`ExamArrangeCl`).
//!
//! Each exam sits in a `div.text` whose direct children carry the fields by
//! position: the course block, three underlined fragments (week, schedule,
//! location), three plain spans (course type, class, headcount) and an
//! optional red note.

use std::sync::OnceLock;

use common::{
    error::AppError,
    storage::types::exam::{ExamEntry, ExamResult},
    utils::fetcher::{DocumentFetcher, Endpoint},
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::utils::{
    html::{cached_regex, ensure_document, first, selector, stripped_text},
    portal::read_header,
    slots::project,
};

static EXAM_SCHEDULE: OnceLock<Result<Regex, String>> = OnceLock::new();

pub async fn fetch_exam_document(
    fetcher: &dyn DocumentFetcher,
    user_id: &str,
    term: Option<&str>,
) -> Result<String, AppError> {
    let term = term.filter(|term| !term.is_empty());
    info!(user_id, term = term.unwrap_or("current"), "Fetching exam arrangement");

    match term {
        Some(term) => {
            fetcher
                .fetch(Endpoint::ExamQuery, user_id, &[("term", term)])
                .await
        }
        None => fetcher.fetch(Endpoint::ExamQuery, user_id, &[]).await,
    }
}

pub fn extract_exams(raw: &str) -> Result<ExamResult, AppError> {
    ensure_document(raw, "exam")?;

    let document = Html::parse_document(raw);
    let root = document.root_element();
    let header = read_header(root)?;

    let layout = ExamLayout::new()?;
    let mut exams = Vec::new();
    for block in root.select(&layout.text) {
        if let Some(exam) = extract_exam(block, &layout)? {
            exams.push(exam);
        }
    }

    Ok(ExamResult {
        student_name: header.student_name,
        current_term: header.current_term,
        available_terms: header.available_terms,
        exam_count: header.reported_count,
        exams,
    })
}

struct ExamLayout {
    text: Selector,
    course: Selector,
    mark: Selector,
    note: Selector,
}

impl ExamLayout {
    fn new() -> Result<Self, AppError> {
        Ok(Self {
            text: selector("div.row div.text")?,
            course: selector(".course")?,
            mark: selector("mark")?,
            note: selector(r#"font, .note, .red, [style*="red"]"#)?,
        })
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ExamSlot {
    date: String,
    day_of_week: String,
    start: String,
    end: String,
}

impl ExamSlot {
    fn time_range(&self) -> String {
        if self.start.is_empty() {
            String::new()
        } else {
            format!("{}-{}", self.start, self.end)
        }
    }
}

fn extract_exam(block: ElementRef<'_>, layout: &ExamLayout) -> Result<Option<ExamEntry>, AppError> {
    let mut course_name = None;
    let mut marked = Vec::new();
    let mut labeled = Vec::new();
    let mut note = String::new();

    for child in block.children().filter_map(ElementRef::wrap) {
        if layout.course.matches(&child) {
            let name = first(child, &layout.mark).map_or_else(|| stripped_text(child), stripped_text);
            course_name = Some(name);
        } else if layout.note.matches(&child) {
            note = stripped_text(child);
        } else {
            match child.value().name() {
                "u" => marked.push(stripped_text(child)),
                "span" => labeled.push(stripped_text(child)),
                _ => {}
            }
        }
    }

    let Some(course_name) = course_name.filter(|name| !name.is_empty()) else {
        debug!("Skipping exam block without a course name");
        return Ok(None);
    };

    let [week, schedule, location] = project::<_, 3>(marked);
    let [course_type, class_name, headcount] = project::<_, 3>(labeled);

    let headcount = headcount.unwrap_or_default();
    let exam_count_num = headcount.parse::<u32>().map_err(|_| {
        AppError::Extraction(format!(
            "exam headcount for `{course_name}` is not a number: `{headcount}`"
        ))
    })?;

    let slot = match schedule {
        Some(schedule) => parse_exam_slot(&schedule)?,
        None => ExamSlot::default(),
    };

    Ok(Some(ExamEntry {
        course_name,
        week: week.unwrap_or_default(),
        time_range: slot.time_range(),
        exam_date: slot.date,
        day_of_week: slot.day_of_week,
        time_start: slot.start,
        time_end: slot.end,
        location: location.unwrap_or_default(),
        course_type: course_type.unwrap_or_default(),
        class_name: class_name.unwrap_or_default(),
        exam_count_num,
        note,
    }))
}

/// `"2026年01月08日(星期四)14:00-16:00"`; anything else leaves every part empty.
fn parse_exam_slot(raw: &str) -> Result<ExamSlot, AppError> {
    let pattern = cached_regex(
        &EXAM_SCHEDULE,
        r"^(.+?)\s*[（(]\s*([^（()）]+?)\s*[)）]\s*([^\s~－-]+?)\s*[-~－]\s*([^\s~－-]+)$",
    )?;

    Ok(match pattern.captures(raw.trim()) {
        Some(caps) => {
            let group = |index| caps.get(index).map_or("", |m| m.as_str()).to_string();
            ExamSlot {
                date: group(1),
                day_of_week: group(2),
                start: group(3),
                end: group(4),
            }
        }
        None => {
            debug!(raw, "Exam schedule fragment has an unexpected shape");
            ExamSlot::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML_EXAM: &str = r#"
<!DOCTYPE html>
<html>
    <body>
        <div class="right">
            <span>张三</span>
            <span>2025.1</span>
        </div>
        <ul class="dropdown-menu" role="menu">
            <li><a href="/weixin/ExamArrangeCl?weiXinID=xxx&amp;term=2025.1">2025.1</a></li>
        </ul>
        <div class="words">
            <mark>2</mark>门考试。
        </div>
        <div class="row ">
            <div class="col-xs-12">
                <div class="text">
                    <div class="course"><mark>C语言程序设计</mark></div>
                    <u>第18周</u>
                    <u>
                        2026年01月08日(星期四)14:00-16:00
                    </u>
                    <u>教1-101</u>
                    <span>必修课</span>
                    <span>计算机241班</span>
                    <span>45</span>
                </div>
            </div>
        </div>
        <div class="row ">
            <div class="col-xs-12">
                <div class="text">
                    <div class="course"><mark>高等数学</mark></div>
                    <u>第19周</u>
                    <u>2026年01月10日(星期六)09:00-11:00</u>
                    <u>教2-201</u>
                    <span>必修课</span>
                    <span>计算机241班</span>
                    <span>38</span>
                    <font color="red">请携带学生证</font>
                </div>
            </div>
        </div>
    </body>
</html>
"#;

    fn block(inner: &str) -> String {
        format!(
            r#"<div class="words"><mark>1</mark>门考试。</div>
            <div class="row"><div class="col-xs-12"><div class="text">{inner}</div></div></div>"#
        )
    }

    #[test]
    fn parses_exam_page() {
        let result = extract_exams(SAMPLE_HTML_EXAM).expect("exams should parse");

        assert_eq!(result.student_name, "张三");
        assert_eq!(result.current_term, "2025.1");
        assert_eq!(result.exam_count, 2);
        assert_eq!(result.available_terms.len(), 1);
        assert_eq!(
            result.available_terms[0].url,
            "/weixin/ExamArrangeCl?weiXinID=xxx&term=2025.1"
        );
        assert_eq!(result.exams.len(), 2);

        let exam = &result.exams[0];
        assert_eq!(exam.course_name, "C语言程序设计");
        assert_eq!(exam.week, "第18周");
        assert_eq!(exam.exam_date, "2026年01月08日");
        assert_eq!(exam.day_of_week, "星期四");
        assert_eq!(exam.time_range, "14:00-16:00");
        assert_eq!(exam.time_start, "14:00");
        assert_eq!(exam.time_end, "16:00");
        assert_eq!(exam.location, "教1-101");
        assert_eq!(exam.course_type, "必修课");
        assert_eq!(exam.class_name, "计算机241班");
        assert_eq!(exam.exam_count_num, 45);
        assert_eq!(exam.note, "");
    }

    #[test]
    fn trailing_red_fragment_becomes_note() {
        let result = extract_exams(SAMPLE_HTML_EXAM).expect("exams should parse");
        let exam = &result.exams[1];
        assert_eq!(exam.course_name, "高等数学");
        assert_eq!(exam.exam_count_num, 38);
        assert_eq!(exam.note, "请携带学生证");
    }

    #[test]
    fn styled_span_note_is_not_a_labeled_field() {
        let html = block(
            r#"<div class="course"><mark>大学物理</mark></div>
            <u>第17周</u><u>2026年01月02日(星期五)08:00-10:00</u><u>教3-105</u>
            <span>必修课</span><span>土木242班</span><span>60</span>
            <span style="color:red">缓考</span>"#,
        );
        let result = extract_exams(&html).expect("exams should parse");
        assert_eq!(result.exams[0].note, "缓考");
        assert_eq!(result.exams[0].exam_count_num, 60);
    }

    #[test]
    fn missing_headcount_is_an_extraction_error() {
        let html = block(
            r#"<div class="course"><mark>线性代数</mark></div>
            <u>第18周</u><u>2026年01月08日(星期四)14:00-16:00</u><u>教1-101</u>
            <span>必修课</span><span>计算机241班</span>"#,
        );
        assert!(matches!(extract_exams(&html), Err(AppError::Extraction(_))));
    }

    #[test]
    fn non_numeric_headcount_is_an_extraction_error() {
        let html = block(
            r#"<div class="course"><mark>线性代数</mark></div>
            <u>第18周</u><u>待定</u><u>教1-101</u>
            <span>必修课</span><span>计算机241班</span><span>若干</span>"#,
        );
        assert!(matches!(extract_exams(&html), Err(AppError::Extraction(_))));
    }

    #[test]
    fn unexpected_schedule_shape_leaves_time_fields_empty() {
        let html = block(
            r#"<div class="course"><mark>线性代数</mark></div>
            <u>第18周</u><u>待定</u><u>教1-101</u>
            <span>必修课</span><span>计算机241班</span><span>30</span>"#,
        );
        let result = extract_exams(&html).expect("exams should parse");
        let exam = &result.exams[0];
        assert_eq!(exam.week, "第18周");
        assert_eq!(exam.exam_date, "");
        assert_eq!(exam.day_of_week, "");
        assert_eq!(exam.time_range, "");
        assert_eq!(exam.location, "教1-101");
    }

    #[test]
    fn times_with_seconds_are_kept_verbatim() {
        let slot = parse_exam_slot("2026年01月08日(星期四)14:00:00-16:00:00").expect("slot");
        assert_eq!(slot.date, "2026年01月08日");
        assert_eq!(slot.day_of_week, "星期四");
        assert_eq!(slot.start, "14:00:00");
        assert_eq!(slot.end, "16:00:00");
        assert_eq!(slot.time_range(), "14:00:00-16:00:00");
    }

    #[test]
    fn full_width_brackets_are_accepted() {
        let slot = parse_exam_slot("2026年01月08日（星期四）8:30-10:30").expect("slot");
        assert_eq!(
            slot,
            ExamSlot {
                date: "2026年01月08日".into(),
                day_of_week: "星期四".into(),
                start: "8:30".into(),
                end: "10:30".into(),
            }
        );
        assert_eq!(slot.time_range(), "8:30-10:30");
    }

    #[test]
    fn blocks_without_course_are_skipped() {
        let html = block("<u>第18周</u><span>45</span>");
        let result = extract_exams(&html).expect("exams should parse");
        assert!(result.exams.is_empty());
        assert_eq!(result.exam_count, 1);
    }

    #[test]
    fn course_block_without_mark_uses_its_text() {
        let html = block(
            r#"<div class="course">工程制图</div>
            <u>第18周</u><u>2026年01月08日(星期四)14:00-16:00</u><u>教1-101</u>
            <span>必修课</span><span>机械241班</span><span>40</span>"#,
        );
        let result = extract_exams(&html).expect("exams should parse");
        assert_eq!(result.exams[0].course_name, "工程制图");
    }

    #[test]
    fn empty_input_is_an_extraction_error() {
        assert!(matches!(extract_exams(""), Err(AppError::Extraction(_))));
    }

    #[test]
    fn extraction_is_repeatable() {
        assert_eq!(
            extract_exams(SAMPLE_HTML_EXAM).expect("first"),
            extract_exams(SAMPLE_HTML_EXAM).expect("second")
        );
    }
}
