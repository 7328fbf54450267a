use std::{future::Future, sync::Arc, time::Duration};

use common::{
    error::AppError,
    storage::{
        cache::{fingerprint, ResultCache},
        types::{CachedRecord, Cacheable},
    },
    utils::{
        config::AppConfig,
        fetcher::{DocumentFetcher, PortalClient},
    },
};
use extraction_pipeline::TermDiscovery;
use tracing::debug;

/// Cache label for the valid-terms listing, which has no portal endpoint of its own.
pub const VALID_TERMS_LABEL: &str = "scores_valid_terms";

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub cache: Arc<ResultCache<CachedRecord>>,
    pub discovery: TermDiscovery,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = PortalClient::new(config)?;
        Ok(Self::with_fetcher(config, Arc::new(client)))
    }

    pub fn with_fetcher(config: &AppConfig, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            config: config.clone(),
            discovery: TermDiscovery::new(Arc::clone(&fetcher)),
            fetcher,
            cache: Arc::new(ResultCache::new()),
        }
    }

    /// Serves `T` from the cache when a fresh entry exists, otherwise runs
    /// `load` and stores its result for `ttl`. Failures are never cached.
    pub async fn cached<T, F, Fut>(
        &self,
        user_id: &str,
        label: &str,
        qualifiers: &[(&str, &str)],
        ttl: Duration,
        load: F,
    ) -> Result<T, AppError>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let keyed: Vec<(&str, &str)> = std::iter::once(("endpoint", label))
            .chain(qualifiers.iter().copied())
            .collect();
        let key = fingerprint(user_id, &keyed);

        if let Some(hit) = self.cache.get(&key).await.and_then(T::from_record) {
            debug!(user_id, label, "Serving cached result");
            return Ok(hit);
        }

        let value = load().await?;
        self.cache.set(key, value.clone().into_record(), ttl).await;
        Ok(value)
    }
}

/// Qualifier list for an optional term; absent and empty terms share one key.
pub fn term_qualifier(term: Option<&str>) -> Vec<(&str, &str)> {
    term.filter(|term| !term.is_empty())
        .map(|term| vec![("term", term)])
        .unwrap_or_default()
}
