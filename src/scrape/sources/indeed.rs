//! Indeed France adapter

use crate::scrape::client::FetchError;
use crate::scrape::source::{
    compile, CardSelectors, ListingDefaults, ParsedPage, SourceAdapter, SourceLimits,
};
use crate::types::{SourceId, WorkItem};
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://fr.indeed.com/emplois";

/// Indeed paginates with a result offset, 10 results per page.
const RESULTS_PER_PAGE: u32 = 10;

pub const DEFAULT_LIMITS: SourceLimits = SourceLimits {
    delay: Duration::from_millis(4000),
    max_pages: 3,
};

const DEFAULTS: ListingDefaults = ListingDefaults {
    title_placeholder: "Stage inconnu",
    duration: "6 mois",
    salary: "",
    study_levels: &["bac+3", "bac+4", "bac+5"],
};

pub struct IndeedAdapter {
    limits: SourceLimits,
    selectors: CardSelectors,
}

impl IndeedAdapter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_LIMITS)
    }

    pub fn with_limits(limits: SourceLimits) -> Self {
        Self {
            limits,
            selectors: CardSelectors {
                cards: compile(&[
                    "div.job_seen_beacon",
                    ".jobsearch-SerpJobCard",
                    ".result",
                    "article",
                ]),
                title: compile(&["h2.jobTitle span", "h2.jobTitle", ".jobTitle", "h2"]),
                company: compile(&[
                    r#"[data-testid="company-name"]"#,
                    ".companyName",
                    ".company",
                ]),
                location: compile(&[
                    r#"[data-testid="text-location"]"#,
                    ".companyLocation",
                    ".location",
                ]),
                description: compile(&[".job-snippet", ".summary"]),
                salary: compile(&[
                    r#"[data-testid="attribute_snippet_testid"]"#,
                    ".salary-snippet",
                    r#"[class*="salary"]"#,
                ]),
                duration: compile(&[r#"[class*="contract"]"#]),
                posted: compile(&["time[datetime]"]),
                next_page: compile(&[
                    r#"a[data-testid="pagination-page-next"]"#,
                    r#"a[aria-label="Next Page"]"#,
                    r#"a[rel="next"]"#,
                ]),
            },
        }
    }
}

impl Default for IndeedAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for IndeedAdapter {
    fn id(&self) -> SourceId {
        SourceId::Indeed
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
            .append_pair("q", &item.term)
            .append_pair("l", &item.location)
            .append_pair("start", &offset.to_string());
        Ok(url)
    }

    fn parse_page(&self, html: &str) -> ParsedPage {
        self.selectors.parse_page(html)
    }
}
