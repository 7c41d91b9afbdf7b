//! Welcome to the Jungle adapter

use crate::scrape::client::FetchError;
use crate::scrape::source::{
    compile, CardSelectors, ListingDefaults, ParsedPage, SourceAdapter, SourceLimits,
};
use crate::types::{SourceId, WorkItem};
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://www.welcometothejungle.com/fr/jobs";

pub const DEFAULT_LIMITS: SourceLimits = SourceLimits {
    delay: Duration::from_millis(2500),
    max_pages: 3,
};

const DEFAULTS: ListingDefaults = ListingDefaults {
    title_placeholder: "Stage inconnu",
    duration: "6 mois",
    salary: "",
    study_levels: &["bac+3", "bac+4", "bac+5"],
};

pub struct WttjAdapter {
    limits: SourceLimits,
    selectors: CardSelectors,
}

impl WttjAdapter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_LIMITS)
    }

    pub fn with_limits(limits: SourceLimits) -> Self {
        Self {
            limits,
            selectors: CardSelectors {
                cards: compile(&[
                    r#"[data-testid="search-results-list-item-wrapper"]"#,
                    r#"li[data-role="jobs:thumb"]"#,
                    ".ais-Hits-item",
                    "article",
                ]),
                title: compile(&["h4", "h3", r#"[class*="job-title"]"#]),
                company: compile(&[
                    r#"[class*="organization-name"]"#,
                    r#"[class*="company"]"#,
                    "span.name",
                ]),
                location: compile(&[r#"[name="location"] ~ span"#, r#"[class*="location"]"#]),
                description: compile(&[r#"[class*="description"]"#]),
                salary: compile(&[r#"[class*="salary"]"#]),
                duration: compile(&[r#"[class*="contract-duration"]"#, r#"[class*="contract"]"#]),
                posted: compile(&["time[datetime]"]),
                next_page: compile(&[
                    r#"a[aria-label="Next page"]"#,
                    r#"[data-testid="pagination-next"]"#,
                    r#"a[rel="next"]"#,
                ]),
            },
        }
    }
}

impl Default for WttjAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for WttjAdapter {
    fn id(&self) -> SourceId {
        SourceId::Wttj
    }

    fn limits(&self) -> SourceLimits {
        self.limits
    }

    fn defaults(&self) -> ListingDefaults {
        DEFAULTS
    }

    fn page_url(&self, item: &WorkItem) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(SEARCH_URL).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("query", &item.term)
            .append_pair("aroundQuery", &item.location)
            .append_pair("page", &item.page.to_string());
        Ok(url)
    }

    fn parse_page(&self, html: &str) -> ParsedPage {
        self.selectors.parse_page(html)
    }
}
