use serde::{Deserialize, Serialize};

/// Date line at the top of a daily schedule page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInfo {
    pub date: String,
    pub day_of_week: Option<String>,
    /// Teaching week number, kept as the digits found on the page.
    pub week_info: Option<String>,
}

/// A run of teaching weeks: a single week or an inclusive `start..=end` span.
///
/// Serialized as `[week]` or `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub enum WeekRange {
    Single(u32),
    Span(u32, u32),
}

impl From<WeekRange> for Vec<u32> {
    fn from(range: WeekRange) -> Self {
        match range {
            WeekRange::Single(week) => vec![week],
            WeekRange::Span(start, end) => vec![start, end],
        }
    }
}

impl TryFrom<Vec<u32>> for WeekRange {
    type Error = String;

    fn try_from(values: Vec<u32>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [week] => Ok(Self::Single(*week)),
            [start, end] => Ok(Self::Span(*start, *end)),
            other => Err(format!(
                "week range must have one or two values, got {}",
                other.len()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CourseEntry {
    pub name: String,
    /// Parenthetical suffix after the name, e.g. "上课" or "考试".
    pub status: String,
    /// Raw time descriptor, e.g. "1-17 1,2".
    pub time: String,
    pub location: String,
    pub teacher: String,
    pub weeks: Vec<WeekRange>,
    pub periods: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub date_info: Option<DateInfo>,
    pub courses: Vec<CourseEntry>,
}
