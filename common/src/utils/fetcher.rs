use std::fmt;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    StatusCode,
};
use tracing::{debug, error};
use url::Url;

use crate::{error::AppError, utils::config::AppConfig};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Portal pages the service knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// One calendar day; qualifier `date` (`YYYY-MM-DD`) is required.
    DailySchedule,
    /// Term grades; qualifier `term` is optional.
    ScoreQuery,
    /// Exam timetable; qualifier `term` is optional.
    ExamQuery,
}

impl Endpoint {
    /// Path segment below the portal base url.
    pub fn path(self) -> &'static str {
        match self {
            Self::DailySchedule => "CalendarServlet",
            Self::ScoreQuery => "ScoreQuery",
            Self::ExamQuery => "ExamArrangeCl",
        }
    }

    /// Stable label used in cache fingerprints and log fields.
    pub fn label(self) -> &'static str {
        match self {
            Self::DailySchedule => "courses_daily",
            Self::ScoreQuery => "scores_info",
            Self::ExamQuery => "exams_schedule",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Turns an endpoint, a user identifier and query qualifiers into raw document text.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        user_id: &str,
        qualifiers: &[(&str, &str)],
    ) -> Result<String, AppError>;
}

/// Pooled HTTP client for the academic portal.
#[derive(Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let mut base = config.portal_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|err| {
            AppError::Validation(format!(
                "invalid portal base url `{}`: {err}",
                config.portal_base_url
            ))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|err| AppError::InternalError(format!("failed to build http client: {err}")))?;

        Ok(Self { client, base_url })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, AppError> {
        self.base_url
            .join(endpoint.path())
            .map_err(|err| AppError::InternalError(format!("invalid endpoint url: {err}")))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|err| AppError::Validation(format!("invalid header value: {err}")))
}

#[async_trait]
impl DocumentFetcher for PortalClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        user_id: &str,
        qualifiers: &[(&str, &str)],
    ) -> Result<String, AppError> {
        let url = self.endpoint_url(endpoint)?;
        let mut params = Vec::with_capacity(qualifiers.len().saturating_add(1));
        params.push(("weiXinID", user_id));
        params.extend_from_slice(qualifiers);

        debug!(%endpoint, user_id, ?qualifiers, "Requesting portal document");

        let response = self
            .client
            .get(url.clone())
            .query(&params)
            .send()
            .await
            .map_err(|err| {
                error!(%endpoint, %url, error = %err, "Portal request failed");
                AppError::transport(
                    format!("network request failed: {err}"),
                    err.status().map(|status| status.as_u16()),
                )
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(%endpoint, %url, status = status.as_u16(), "Portal returned non-200 status");
            return Err(AppError::transport(
                format!("portal returned status {}", status.as_u16()),
                Some(status.as_u16()),
            ));
        }

        // The portal does not always declare a charset; its pages are UTF-8.
        response.text_with_charset("utf-8").await.map_err(|err| {
            AppError::transport(
                format!("failed to read portal response: {err}"),
                err.status().map(|status| status.as_u16()),
            )
        })
    }
}
