use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use common::{
    error::AppError,
    utils::fetcher::{DocumentFetcher, Endpoint},
};
use tokio::sync::{Barrier, Mutex};

use super::TermDiscovery;

const CURRENT: &str = "";

enum Page {
    Html(String),
    Status(u16),
}

#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, Page>,
    delays: HashMap<String, Duration>,
    barrier: Option<Arc<Barrier>>,
    requested: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn page(mut self, term: &str, html: String) -> Self {
        self.pages.insert(term.to_string(), Page::Html(html));
        self
    }

    fn failing(mut self, term: &str, status: u16) -> Self {
        self.pages.insert(term.to_string(), Page::Status(status));
        self
    }

    fn delayed(mut self, term: &str, delay: Duration) -> Self {
        self.delays.insert(term.to_string(), delay);
        self
    }

    fn gated(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }
}

#[async_trait]
impl DocumentFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        _user_id: &str,
        qualifiers: &[(&str, &str)],
    ) -> Result<String, AppError> {
        assert_eq!(endpoint, Endpoint::ScoreQuery);
        let term = qualifiers
            .iter()
            .find(|(key, _)| *key == "term")
            .map_or(CURRENT, |(_, value)| *value)
            .to_string();
        self.requested.lock().await.push(term.clone());

        if term != CURRENT {
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
        }
        if let Some(delay) = self.delays.get(&term) {
            tokio::time::sleep(*delay).await;
        }
        self.completed.lock().await.push(term.clone());

        match self.pages.get(&term) {
            Some(Page::Html(html)) => Ok(html.clone()),
            Some(Page::Status(status)) => Err(AppError::transport(
                format!("portal returned {status}"),
                Some(*status),
            )),
            None => Err(AppError::transport("no such page", Some(404))),
        }
    }
}

fn menu_page(terms: &[&str]) -> String {
    let items: String = terms
        .iter()
        .map(|term| format!(r#"<li><a href="/weixin/ScoreQuery?term={term}">{term}</a></li>"#))
        .collect();
    format!(
        r#"<div class="right"><span>张三</span><span>2025.1</span></div>
        <ul class="dropdown-menu">{items}</ul>
        <div class="words"><strong>0</strong>门考试成绩。</div>"#
    )
}

fn scored_page(courses: &[&str]) -> String {
    let rows: String = courses
        .iter()
        .map(|course| {
            format!(
                r#"<div class="row"><div class="text">
                    <span class="course">【主修】【1】{course}(学分:2.0)</span>
                    <div class="grade"><span class="score">80</span></div>
                </div></div>"#
            )
        })
        .collect();
    format!(
        r#"<div class="words"><strong>{}</strong>门考试成绩。</div>{rows}"#,
        courses.len()
    )
}

fn empty_page() -> String {
    r#"<div class="words"><strong>0</strong>门考试成绩。</div>"#.to_string()
}

fn discovery(fetcher: &Arc<ScriptedFetcher>) -> TermDiscovery {
    TermDiscovery::new(fetcher.clone())
}

#[tokio::test]
async fn keeps_only_terms_with_scores() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page(CURRENT, menu_page(&["2025.1", "2024.2", "2024.1"]))
            .page("2025.1", scored_page(&["高等数学"]))
            .page("2024.2", empty_page())
            .page("2024.1", scored_page(&["线性代数", "大学英语"])),
    );

    let terms = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect("discovery");

    assert_eq!(terms, vec!["2025.1".to_string(), "2024.1".to_string()]);
    let requested = fetcher.requested.lock().await.clone();
    assert_eq!(requested[0], CURRENT);
    assert_eq!(requested.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn result_follows_menu_order_not_completion_order() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page(CURRENT, menu_page(&["2024.2", "2025.1"]))
            .page("2024.2", scored_page(&["程序设计"]))
            .page("2025.1", scored_page(&["高等数学"]))
            .delayed("2024.2", Duration::from_secs(5))
            .delayed("2025.1", Duration::from_millis(10)),
    );

    let terms = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect("discovery");

    let completed = fetcher.completed.lock().await.clone();
    assert_eq!(completed, vec![CURRENT, "2025.1", "2024.2"]);
    assert_eq!(terms, vec!["2024.2".to_string(), "2025.1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn empty_term_finishing_first_is_dropped_without_reordering() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page(CURRENT, menu_page(&["2025.1", "2024.2"]))
            .page("2025.1", empty_page())
            .page("2024.2", scored_page(&["程序设计"]))
            .delayed("2024.2", Duration::from_secs(3)),
    );

    let terms = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect("discovery");

    assert_eq!(terms, vec!["2024.2".to_string()]);
}

#[tokio::test]
async fn term_probes_run_concurrently() {
    let terms = ["2025.1", "2024.2", "2024.1"];
    let fetcher = Arc::new(
        terms
            .iter()
            .fold(
                ScriptedFetcher::default().page(CURRENT, menu_page(&terms)),
                |fetcher, term| fetcher.page(term, scored_page(&["体育"])),
            )
            .gated(terms.len()),
    );

    // Every probe waits until all of them have started; sequential probing
    // would never get past the first one.
    let found = tokio::time::timeout(
        Duration::from_secs(5),
        discovery(&fetcher).discover_valid_terms("wx-1"),
    )
    .await
    .expect("probes should not wait on each other")
    .expect("discovery");

    assert_eq!(found.len(), terms.len());
}

#[tokio::test]
async fn failing_term_is_treated_as_empty() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page(CURRENT, menu_page(&["2025.1", "2024.2"]))
            .failing("2025.1", 502)
            .page("2024.2", scored_page(&["数据结构"])),
    );

    let terms = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect("discovery");

    assert_eq!(terms, vec!["2024.2".to_string()]);
}

#[tokio::test]
async fn unreadable_term_page_is_treated_as_empty() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page(CURRENT, menu_page(&["2025.1", "2024.2"]))
            .page("2025.1", String::new())
            .page("2024.2", scored_page(&["数据结构"])),
    );

    let terms = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect("discovery");

    assert_eq!(terms, vec!["2024.2".to_string()]);
}

#[tokio::test]
async fn current_term_failure_is_fatal() {
    let fetcher = Arc::new(ScriptedFetcher::default().failing(CURRENT, 503));

    let err = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect_err("current term failure must propagate");

    assert_eq!(err.upstream_status(), Some(503));
    assert_eq!(fetcher.requested.lock().await.len(), 1);
}

#[tokio::test]
async fn empty_current_page_is_an_extraction_error() {
    let fetcher = Arc::new(ScriptedFetcher::default().page(CURRENT, String::new()));

    let err = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect_err("empty page must propagate");

    assert!(matches!(err, AppError::Extraction(_)));
}

#[tokio::test]
async fn empty_menu_yields_no_terms() {
    let fetcher = Arc::new(ScriptedFetcher::default().page(CURRENT, menu_page(&[])));

    let terms = discovery(&fetcher)
        .discover_valid_terms("wx-1")
        .await
        .expect("discovery");

    assert!(terms.is_empty());
    assert_eq!(fetcher.requested.lock().await.len(), 1);
}

#[test]
fn only_scored_probes_count() {
    use super::TermProbe;

    assert!(TermProbe::Scored.has_scores());
    assert!(!TermProbe::Empty.has_scores());
    assert!(!TermProbe::Failed.has_scores());
}
