//! Finds the terms in which a student actually has scores.
//!
//! The score page lists every term the student was enrolled in, including
//! terms that never produced a grade. Discovery probes each listed term and
//! keeps only those whose score listing is non-empty.

use std::sync::Arc;

use common::{error::AppError, utils::fetcher::DocumentFetcher};
use futures::future::join_all;
use tracing::{info, warn};

use crate::score::{extract_scores, fetch_score_document};

#[cfg(test)]
mod tests;

/// Outcome of probing a single term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TermProbe {
    Scored,
    Empty,
    /// The term could not be fetched or extracted; treated like `Empty`.
    Failed,
}

impl TermProbe {
    pub(crate) fn has_scores(self) -> bool {
        matches!(self, Self::Scored)
    }
}

#[derive(Clone)]
pub struct TermDiscovery {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl TermDiscovery {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Term names with at least one score, in the portal's menu order.
    ///
    /// The current-term page supplies the menu, so a failure there is
    /// returned as-is. Individual terms that fail are logged and dropped.
    pub async fn discover_valid_terms(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let current = fetch_score_document(self.fetcher.as_ref(), user_id, None).await?;
        let menu = extract_scores(&current)?.available_terms;

        if menu.is_empty() {
            info!(user_id, "No selectable terms on the score page");
            return Ok(Vec::new());
        }

        info!(user_id, terms = menu.len(), "Probing terms for scores");

        let probes = join_all(menu.iter().map(|term| self.probe(user_id, &term.name))).await;

        let valid: Vec<String> = menu
            .into_iter()
            .zip(probes)
            .filter(|(_, probe)| probe.has_scores())
            .map(|(term, _)| term.name)
            .collect();

        info!(user_id, valid = valid.len(), "Term discovery finished");
        Ok(valid)
    }

    async fn probe(&self, user_id: &str, term: &str) -> TermProbe {
        let outcome = match fetch_score_document(self.fetcher.as_ref(), user_id, Some(term)).await {
            Ok(raw) => extract_scores(&raw),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(result) if result.scores.is_empty() => {
                info!(user_id, term, "Term has no scores, skipping");
                TermProbe::Empty
            }
            Ok(result) => {
                info!(user_id, term, scores = result.scores.len(), "Term has scores");
                TermProbe::Scored
            }
            Err(err) => {
                warn!(user_id, term, error = %err, "Term probe failed, treating as empty");
                TermProbe::Failed
            }
        }
    }
}
