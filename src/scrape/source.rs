//! Source adapter contract and shared extraction machinery
//!
//! One adapter per external board. Each declares its identity, rate limits,
//! listing defaults, and per-field CSS selector fallback lists; the shared
//! driver here walks result cards and extracts whatever fields the current
//! markup happens to expose. Markup drift yields fewer fields, not errors.

use crate::scrape::client::{FetchError, SourceClient};
use crate::types::{SourceId, WorkItem};
use crate::util::collapse_whitespace;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// Adapter-level fetch limits. Different boards enforce different rates, so
/// these are per-source, never global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLimits {
    /// Minimum spacing between two requests to this source
    pub delay: Duration,
    /// Maximum pages fetched per (term, location) query
    pub max_pages: u32,
}

/// Source-typical defaults the normalizer applies to missing fields.
#[derive(Debug, Clone, Copy)]
pub struct ListingDefaults {
    pub title_placeholder: &'static str,
    pub duration: &'static str,
    pub salary: &'static str,
    pub study_levels: &'static [&'static str],
}

/// One extracted result card, fields exactly as the page exposed them.
/// Owned by the adapter for the duration of one parse call, then handed to
/// the normalizer and discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub duration: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub skills: Vec<String>,
    pub study_levels: Vec<String>,
}

impl RawListing {
    /// A card from which nothing at all could be extracted is markup noise,
    /// not a listing.
    pub fn is_blank(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.domain.is_none()
            && self.description.is_none()
            && self.salary.is_none()
            && self.duration.is_none()
            && self.posted_at.is_none()
            && self.skills.is_empty()
            && self.study_levels.is_empty()
    }
}

/// One parsed result page.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub records: Vec<RawListing>,
    pub has_next: bool,
}

impl ParsedPage {
    /// Valid non-error outcome for an exhausted query.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Contract implemented once per external source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn id(&self) -> SourceId;

    fn limits(&self) -> SourceLimits;

    fn defaults(&self) -> ListingDefaults;

    /// Build the result-page URL for one work item. Failure here is an
    /// adapter configuration problem and fatal for the adapter.
    fn page_url(&self, item: &WorkItem) -> Result<Url, FetchError>;

    /// Extract raw records from one page of result markup. Never fails:
    /// unrecognized markup produces an empty page.
    fn parse_page(&self, html: &str) -> ParsedPage;

    /// Fetch and parse one result page through the shared client.
    async fn fetch_page(
        &self,
        client: &SourceClient,
        item: &WorkItem,
    ) -> Result<ParsedPage, FetchError> {
        let url = self.page_url(item)?;
        tracing::debug!(source = %self.id(), page = item.page, url = %url, "fetching result page");
        let html = client.get_html(&url).await?;
        Ok(self.parse_page(&html))
    }
}

// ============================================================================
// Selector-driven extraction
// ============================================================================

/// Compile an ordered fallback list of CSS selectors, skipping any that do
/// not parse.
pub(crate) fn compile(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

/// First selector in the list that matches anything under `scope` wins;
/// returns its collapsed text if non-empty.
pub(crate) fn first_text(scope: &ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        if let Some(element) = scope.select(selector).next() {
            let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Like [`first_text`] but reads an attribute instead of text content.
pub(crate) fn first_attr(
    scope: &ElementRef<'_>,
    selectors: &[Selector],
    attr: &str,
) -> Option<String> {
    for selector in selectors {
        for element in scope.select(selector) {
            if let Some(value) = element.value().attr(attr) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Per-field selector tables for one source, compiled once at adapter
/// construction.
#[derive(Debug)]
pub(crate) struct CardSelectors {
    pub cards: Vec<Selector>,
    pub title: Vec<Selector>,
    pub company: Vec<Selector>,
    pub location: Vec<Selector>,
    pub description: Vec<Selector>,
    pub salary: Vec<Selector>,
    pub duration: Vec<Selector>,
    /// Elements carrying a machine-readable `datetime` attribute
    pub posted: Vec<Selector>,
    pub next_page: Vec<Selector>,
}

impl CardSelectors {
    /// Walk the first card selector that matches anything and extract one raw
    /// record per card. Blank cards are dropped. `has_next` requires both a
    /// pagination link and a non-empty result set.
    pub(crate) fn parse_page(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        let mut cards: Vec<ElementRef<'_>> = Vec::new();
        for selector in &self.cards {
            cards = document.select(selector).collect();
            if !cards.is_empty() {
                break;
            }
        }

        let mut records = Vec::new();
        for card in &cards {
            let record = RawListing {
                title: first_text(card, &self.title),
                company: first_text(card, &self.company),
                location: first_text(card, &self.location),
                domain: None,
                description: first_text(card, &self.description),
                salary: first_text(card, &self.salary),
                duration: first_text(card, &self.duration),
                posted_at: first_attr(card, &self.posted, "datetime")
                    .and_then(|v| parse_posted_date(&v)),
                skills: Vec::new(),
                study_levels: Vec::new(),
            };
            if !record.is_blank() {
                records.push(record);
            }
        }

        let root = document.root_element();
        let has_next = !records.is_empty()
            && self
                .next_page
                .iter()
                .any(|selector| root.select(selector).next().is_some());

        ParsedPage { records, has_next }
    }
}

/// Parse a `datetime` attribute value. Boards publish either a bare date or
/// a full RFC 3339 instant.
fn parse_posted_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
