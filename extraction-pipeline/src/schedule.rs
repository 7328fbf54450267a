//! Daily course schedule (`CalendarServlet`).
//!
//! ```html
//! <div class="center"><p>2026-01-05 星期一（第19周）</p></div>
//! <div class="calendar"><ul class="rl_info">
//!   <li><p>
//!     <span class="class_span">3-4节<br/></span>
//!     大学英语Ⅰ(考试)<br/>
//!     时间：19 3,4<br/>
//!     地点：进贤2-212<br/>
//!     教师：张三<br/>
//!   </p></li>
//! </ul></div>
//! ```

use std::sync::OnceLock;

use common::{
    error::AppError,
    storage::types::schedule::{CourseEntry, DateInfo, ScheduleResult, WeekRange},
    utils::fetcher::{DocumentFetcher, Endpoint},
};
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

use crate::utils::html::{
    cached_regex, ensure_document, first, selector, stripped_strings, stripped_text,
};

static WEEKDAY_AND_WEEK: OnceLock<Result<Regex, String>> = OnceLock::new();
static NAME_AND_STATUS: OnceLock<Result<Regex, String>> = OnceLock::new();

const TIME_PREFIX: &str = "时间";
const LOCATION_PREFIX: &str = "地点";
const TEACHER_PREFIX: &str = "教师";

pub async fn fetch_schedule_document(
    fetcher: &dyn DocumentFetcher,
    user_id: &str,
    date: &str,
) -> Result<String, AppError> {
    info!(user_id, date, "Fetching daily schedule");
    fetcher
        .fetch(Endpoint::DailySchedule, user_id, &[("date", date)])
        .await
}

pub fn extract_schedule(raw: &str) -> Result<ScheduleResult, AppError> {
    ensure_document(raw, "schedule")?;

    let document = Html::parse_document(raw);
    let root = document.root_element();

    let date_info = match first(root, &selector("div.center")?) {
        Some(center) => match first(center, &selector("p")?) {
            Some(line) => parse_date_line(&stripped_text(line))?,
            None => None,
        },
        None => None,
    };

    Ok(ScheduleResult {
        date_info,
        courses: extract_courses(root)?,
    })
}

/// `"2026-01-06 星期二（第20周）"`: date token before the first space, then a
/// weekday with an optional bracketed week number.
fn parse_date_line(line: &str) -> Result<Option<DateInfo>, AppError> {
    let (date, rest) = match line.split_once(' ') {
        Some((date, rest)) => (date, Some(rest)),
        None => (line, None),
    };
    if date.is_empty() {
        return Ok(None);
    }

    let mut info = DateInfo {
        date: date.to_string(),
        day_of_week: None,
        week_info: None,
    };

    if let Some(rest) = rest {
        let pattern = cached_regex(&WEEKDAY_AND_WEEK, r"([^（(]+)[（(]第?(\d+)周[）)]")?;
        match pattern.captures(rest) {
            Some(caps) => {
                info.day_of_week = caps.get(1).map(|m| m.as_str().trim().to_string());
                info.week_info = caps.get(2).map(|m| m.as_str().to_string());
            }
            None => info.day_of_week = Some(rest.trim().to_string()),
        }
    }

    Ok(Some(info))
}

fn extract_courses(root: ElementRef<'_>) -> Result<Vec<CourseEntry>, AppError> {
    let Some(calendar) = first(root, &selector("div.calendar")?) else {
        return Ok(Vec::new());
    };
    let Some(list) = first(calendar, &selector("ul.rl_info")?) else {
        return Ok(Vec::new());
    };

    let list_item = selector("li")?;
    let paragraph = selector("p")?;
    let period_span = selector("span.class_span")?;
    let mut courses = Vec::new();

    for item in list.select(&list_item) {
        let Some(p) = first(item, &paragraph) else {
            continue;
        };

        // The period label ("3-4节") is echoed inside the item; it is not a field.
        let period_label = first(p, &period_span)
            .map(stripped_text)
            .unwrap_or_default();
        let fragments = stripped_strings(item).filter(|fragment| *fragment != period_label);

        let course = parse_course_fragments(fragments)?;
        if course.name.is_empty() {
            debug!("Skipping schedule item without a course name");
            continue;
        }
        courses.push(course);
    }

    Ok(courses)
}

fn parse_course_fragments<'a>(
    fragments: impl Iterator<Item = &'a str>,
) -> Result<CourseEntry, AppError> {
    let mut course = CourseEntry::default();
    let mut found_name = false;

    for fragment in fragments {
        if fragment.starts_with(TIME_PREFIX) {
            course.time = value_after_colon(fragment);
            parse_time_descriptor(&course.time, &mut course.weeks, &mut course.periods);
        } else if fragment.starts_with(LOCATION_PREFIX) {
            course.location = value_after_colon(fragment);
        } else if fragment.starts_with(TEACHER_PREFIX) {
            course.teacher = value_after_colon(fragment);
        } else if !found_name {
            let (name, status) = split_name_and_status(fragment)?;
            course.name = name;
            course.status = status;
            found_name = true;
        }
    }

    Ok(course)
}

/// Text after the first colon (full- or half-width), trimmed. Without a colon
/// the whole fragment is the value.
fn value_after_colon(fragment: &str) -> String {
    let normalized = fragment.replace('：', ":");
    normalized
        .split_once(':')
        .map_or(normalized.as_str(), |(_, value)| value)
        .trim()
        .to_string()
}

/// `"高等数学(上课)"` → ("高等数学", "上课"); no trailing bracket → (whole, "").
fn split_name_and_status(fragment: &str) -> Result<(String, String), AppError> {
    let pattern = cached_regex(&NAME_AND_STATUS, r"(.+?)[（(]([^（()）]+)[)）]$")?;
    Ok(match pattern.captures(fragment) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
        ),
        None => (fragment.to_string(), String::new()),
    })
}

/// Splits `"<weeks> <periods>"`, e.g. `"1-17 1,2"` or `"15,17 5,6"`.
///
/// A malformed number stops the parse: weeks keep what was read before it and
/// periods are only written when every period parsed.
fn parse_time_descriptor(time: &str, weeks: &mut Vec<WeekRange>, periods: &mut Vec<u32>) {
    let tokens: Vec<&str> = time.split(' ').collect();
    let [week_token, period_token] = tokens.as_slice() else {
        return;
    };

    for piece in week_token.replace('，', ",").split(',') {
        match parse_week_piece(piece) {
            Ok(Some(range)) => weeks.push(range),
            Ok(None) => {}
            Err(_) => return,
        }
    }

    let parsed: Result<Vec<u32>, _> = period_token
        .replace('，', ",")
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::parse)
        .collect();
    if let Ok(parsed) = parsed {
        *periods = parsed;
    }
}

fn parse_week_piece(piece: &str) -> Result<Option<WeekRange>, std::num::ParseIntError> {
    if let Some((start, end)) = piece.split_once('-') {
        return Ok(Some(WeekRange::Span(
            start.trim().parse()?,
            end.trim().parse()?,
        )));
    }
    let piece = piece.trim();
    if piece.is_empty() {
        return Ok(None);
    }
    Ok(Some(WeekRange::Single(piece.parse()?)))
}
