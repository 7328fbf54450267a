use std::sync::OnceLock;

use common::error::AppError;
use regex::Regex;
use scraper::{ElementRef, Selector};

pub fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css)
        .map_err(|err| AppError::InternalError(format!("invalid selector `{css}`: {err}")))
}

/// Compiles `pattern` once per call site and hands out the shared instance.
pub fn cached_regex(
    cell: &'static OnceLock<Result<Regex, String>>,
    pattern: &str,
) -> Result<&'static Regex, AppError> {
    match cell.get_or_init(|| {
        Regex::new(pattern).map_err(|err| format!("invalid pattern `{pattern}`: {err}"))
    }) {
        Ok(regex) => Ok(regex),
        Err(err) => Err(AppError::InternalError(err.clone())),
    }
}

/// Rejects empty documents before any parsing happens.
pub fn ensure_document(raw: &str, kind: &str) -> Result<(), AppError> {
    if raw.is_empty() {
        return Err(AppError::Extraction(format!(
            "{kind} document is empty, nothing to extract"
        )));
    }
    Ok(())
}

pub fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Every descendant text node, trimmed, empties dropped, in document order.
pub fn stripped_strings<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.text().map(str::trim).filter(|text| !text.is_empty())
}

/// Concatenation of [`stripped_strings`].
pub fn stripped_text(element: ElementRef<'_>) -> String {
    stripped_strings(element).collect()
}
