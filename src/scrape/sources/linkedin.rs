//! LinkedIn Jobs adapter

use crate::scrape::client::FetchError;
use crate::scrape::source::{
    compile, CardSelectors, ListingDefaults, ParsedPage, SourceAdapter, SourceLimits,
};
use crate::types::{SourceId, WorkItem};
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://www.linkedin.com/jobs/search";

/// LinkedIn paginates with a result offset, 25 results per page.
const RESULTS_PER_PAGE: u32 = 25;

/// The strictest board of the set; anything faster trips its bot wall.
pub const DEFAULT_LIMITS: SourceLimits = SourceLimits {
    delay: Duration::from_millis(5000),
    max_pages: 2,
};

const DEFAULTS: ListingDefaults = ListingDefaults {
    title_placeholder: "Offre inconnue",
    duration: "6 mois",
    salary: "",
    study_levels: &["bac+3", "bac+4", "bac+5"],
};

pub struct LinkedinAdapter {
    limits: SourceLimits,
    selectors: CardSelectors,
}

impl LinkedinAdapter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_LIMITS)
    }

    pub fn with_limits(limits: SourceLimits) -> Self {
        Self {
            limits,
            selectors: CardSelectors {
                cards: compile(&[
                    "div.base-card",
                    "li.jobs-search-results__list-item",
                    ".job-search-card",
                ]),
                title: compile(&[
                    "h3.base-search-card__title",
                    ".base-search-card__title",
                    "h3",
                ]),
                company: compile(&[
                    "h4.base-search-card__subtitle",
                    "a.hidden-nested-link",
                    ".base-search-card__subtitle",
                ]),
                location: compile(&[
                    "span.job-search-card__location",
                    ".job-search-card__location",
                ]),
                description: compile(&[".base-search-card__metadata p"]),
                salary: compile(&[".job-search-card__salary-info"]),
                duration: compile(&[r#"[class*="contract"]"#]),
                posted: compile(&[
                    "time.job-search-card__listdate",
                    "time[datetime]",
                ]),
                next_page: compile(&[
                    r#"button[aria-label="Voir la page suivante"]"#,
                    r#"a[rel="next"]"#,
                ]),
            },
        }
    }
}

impl Default for LinkedinAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for LinkedinAdapter {
    fn id(&self) -> SourceId {
        SourceId::Linkedin
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
        let offset = item.page.saturating_sub(1) * RESULTS_PER_PAGE;
        url.query_pairs_mut()
            .append_pair("keywords", &item.term)
            .append_pair("location", &item.location)
            .append_pair("start", &offset.to_string());
        Ok(url)
    }

    fn parse_page(&self, html: &str) -> ParsedPage {
        self.selectors.parse_page(html)
    }
}
