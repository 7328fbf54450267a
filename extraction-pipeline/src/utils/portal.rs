//! Page furniture shared by the score and exam pages: the identity block, the
//! term dropdown and the summary sentence with its highlighted count.

use common::{error::AppError, storage::types::TermItem};
use scraper::ElementRef;
use tracing::debug;

use super::html::{first, selector, stripped_text};

#[derive(Debug, Default)]
pub struct PortalHeader {
    pub student_name: String,
    pub current_term: String,
    pub available_terms: Vec<TermItem>,
    pub reported_count: u32,
}

pub fn read_header(root: ElementRef<'_>) -> Result<PortalHeader, AppError> {
    let (student_name, current_term) = read_identity(root)?;
    Ok(PortalHeader {
        student_name,
        current_term,
        available_terms: read_term_menu(root)?,
        reported_count: read_reported_count(root)?,
    })
}

/// `<div class="right">姓名:<span>…</span>当前学期:<span>…</span></div>`.
/// Fewer than two spans leaves both values empty.
fn read_identity(root: ElementRef<'_>) -> Result<(String, String), AppError> {
    let Some(block) = first(root, &selector("div.right")?) else {
        return Ok((String::new(), String::new()));
    };

    let span = selector("span")?;
    let mut spans = block.select(&span);
    match (spans.next(), spans.next()) {
        (Some(name), Some(term)) => Ok((stripped_text(name), stripped_text(term))),
        _ => Ok((String::new(), String::new())),
    }
}

fn read_term_menu(root: ElementRef<'_>) -> Result<Vec<TermItem>, AppError> {
    let Some(menu) = first(root, &selector("ul.dropdown-menu")?) else {
        return Ok(Vec::new());
    };

    let link = selector("a")?;
    Ok(menu
        .select(&selector("li")?)
        .filter_map(|item| first(item, &link))
        .map(|anchor| TermItem {
            name: stripped_text(anchor),
            url: anchor.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect())
}

/// The count highlighted inside `<div class="words">`; unparsable means 0.
fn read_reported_count(root: ElementRef<'_>) -> Result<u32, AppError> {
    let Some(words) = first(root, &selector("div.words")?) else {
        return Ok(0);
    };
    let Some(highlight) = first(words, &selector("strong, mark")?) else {
        return Ok(0);
    };

    let raw = stripped_text(highlight);
    Ok(raw.parse().unwrap_or_else(|_| {
        debug!(raw = %raw, "Reported count is not a number, using 0");
        0
    }))
}
