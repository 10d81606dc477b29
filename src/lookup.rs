//! Flight schedule lookup
//!
//! Fetches schedule entries for the derived [`ScheduleQuery`] and follows the
//! service's continuation tokens until the last page.
//!
//! ## Key Types
//!
//! - [`ScheduleSource`] - Seam over "fetch one page", so the pagination loop
//!   can run against the HTTP client or an in-memory fake
//! - [`HttpScheduleSource`] - `reqwest` client for the RapidAPI flight-info service
//! - [`fetch_all_schedules`] - Sequential pagination into one flat list
//!
//! ## Request Shape
//!
//! The first request is `GET {base_url}/schedules` with the date window,
//! carrier and airport list encoded as query parameters. Every later request
//! uses the previous page's `paging.next` value as the full target URL.
//! Both carry the `X-RapidAPI-Key` and `X-RapidAPI-Host` headers.

use crate::config::LookupConfig;
use crate::error::{SbhError, SbhResult};
use crate::models::*;
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

const API_KEY_HEADER: &str = "X-RapidAPI-Key";
const API_HOST_HEADER: &str = "X-RapidAPI-Host";

/// What to request next: the initial query, or a continuation token.
#[derive(Debug, Clone, Copy)]
pub enum PageTarget<'a> {
    Query(&'a ScheduleQuery),
    Token(&'a str),
}

#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch_page(&self, target: PageTarget<'_>) -> SbhResult<SchedulePage>;
}

/// All schedule entries of a lookup plus the number of pages it took.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFetch {
    pub records: Vec<ScheduleRecord>,
    pub pages: usize,
}

/// Requests pages one after another until a page carries no continuation token.
///
/// `max_pages` of 0 means no limit. A token handed out a second time would
/// repeat the same pages forever and fails the lookup instead.
pub async fn fetch_all_schedules<S>(
    source: &S,
    query: &ScheduleQuery,
    max_pages: usize,
) -> SbhResult<ScheduleFetch>
where
    S: ScheduleSource + ?Sized,
{
    let mut fetch = ScheduleFetch::default();
    let mut next: Option<String> = None;
    let mut seen_tokens = HashSet::new();

    loop {
        if max_pages > 0 && fetch.pages >= max_pages {
            warn!(max_pages, "Schedule lookup still paginating, giving up");
            return Err(SbhError::PageLimit { max_pages });
        }

        let target = match next.as_deref() {
            Some(token) => PageTarget::Token(token),
            None => PageTarget::Query(query),
        };
        let page = source.fetch_page(target).await?;
        fetch.pages += 1;

        let token = page.next_token().map(str::to_string);
        debug!(
            page = fetch.pages,
            entries = page.data.len(),
            has_next = token.is_some(),
            "Received schedule page"
        );
        fetch.records.extend(page.data);

        match token {
            Some(token) => {
                if !seen_tokens.insert(token.clone()) {
                    warn!(token = %token, pages = fetch.pages, "Continuation token repeated");
                    return Err(SbhError::RepeatedToken { token });
                }
                next = Some(token);
            }
            None => break,
        }
    }

    info!(
        pages = fetch.pages,
        entries = fetch.records.len(),
        "Schedule lookup complete"
    );
    Ok(fetch)
}

#[derive(Debug, Clone)]
pub struct HttpScheduleSource {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    host: String,
}

impl HttpScheduleSource {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        host: impl Into<String>,
        timeout: Duration,
    ) -> SbhResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SbhError::MissingApiKey);
        }

        let mut base_url = Url::parse(base_url).map_err(|e| SbhError::Url(e.to_string()))?;
        // join() replaces the last segment unless the path ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            host: host.into(),
        })
    }

    pub fn from_config(config: &LookupConfig) -> SbhResult<Self> {
        let api_key = config.api_key.clone().ok_or(SbhError::MissingApiKey)?;
        Self::new(
            &config.base_url,
            api_key,
            config.host.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// URL of the first page for `query`.
    pub fn query_url(&self, query: &ScheduleQuery) -> SbhResult<Url> {
        let mut url = self
            .base_url
            .join("schedules")
            .map_err(|e| SbhError::Url(e.to_string()))?;

        let window = format!("{}/{}", query.range.start, query.range.end);
        let airports = query.airports.join(",");

        url.query_pairs_mut()
            .append_pair("version", &query.version)
            .append_pair("DepartureDateTime", &window)
            .append_pair("CarrierCode", &query.carrier)
            .append_pair("DepartureAirport", &airports)
            .append_pair("ArrivalAirport", &airports)
            .append_pair("CodeType", &query.code_type);

        Ok(url)
    }

    /// Continuation tokens are normally absolute URLs; relative ones resolve
    /// against the base URL.
    pub fn token_url(&self, token: &str) -> SbhResult<Url> {
        Url::parse(token)
            .or_else(|_| self.base_url.join(token))
            .map_err(|e| SbhError::Url(e.to_string()))
    }

    fn target_url(&self, target: PageTarget<'_>) -> SbhResult<Url> {
        match target {
            PageTarget::Query(query) => self.query_url(query),
            PageTarget::Token(token) => self.token_url(token),
        }
    }
}

#[async_trait]
impl ScheduleSource for HttpScheduleSource {
    async fn fetch_page(&self, target: PageTarget<'_>) -> SbhResult<SchedulePage> {
        let url = self.target_url(target)?;
        debug!(url = %url, "Requesting schedule page");

        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_HOST_HEADER, &self.host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "Schedule lookup rejected");
            return Err(SbhError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let page: SchedulePage = serde_json::from_str(&body)?;
        Ok(page)
    }
}
