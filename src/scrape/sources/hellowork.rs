//! HelloWork (France Travail) adapter

use crate::scrape::client::FetchError;
use crate::scrape::source::{
    compile, CardSelectors, ListingDefaults, ParsedPage, SourceAdapter, SourceLimits,
};
use crate::types::{SourceId, WorkItem};
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://candidat.francetravail.fr/offres/recherche";

/// Built-in limits; the board throttles aggressively on bursts.
pub const DEFAULT_LIMITS: SourceLimits = SourceLimits {
    delay: Duration::from_millis(3000),
    max_pages: 5,
};

const DEFAULTS: ListingDefaults = ListingDefaults {
    title_placeholder: "Stage inconnu",
    duration: "6 mois",
    salary: "",
    study_levels: &["bac+3", "bac+4", "bac+5"],
};

pub struct HelloworkAdapter {
    limits: SourceLimits,
    selectors: CardSelectors,
}

impl HelloworkAdapter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_LIMITS)
    }

    pub fn with_limits(limits: SourceLimits) -> Self {
        Self {
            limits,
            selectors: CardSelectors {
                cards: compile(&[
                    ".result-card",
                    ".media.with-fav",
                    "li.result",
                    r#"[class*="offre"]"#,
                    "article",
                ]),
                title: compile(&["h2.media-heading", ".media-heading", "h2", "h3"]),
                company: compile(&[".subtext .t4", ".subtext", r#"[class*="company"]"#]),
                location: compile(&[".subtext-place", ".location", r#"[class*="lieu"]"#]),
                description: compile(&[".description", "p.description", "p"]),
                salary: compile(&[".salary", r#"[class*="salaire"]"#]),
                duration: compile(&[".contract-duration", r#"[class*="duree"]"#]),
                posted: compile(&["time[datetime]"]),
                next_page: compile(&[r#"a[rel="next"]"#, ".pagination-next a", "li.next a"]),
            },
        }
    }
}

impl Default for HelloworkAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for HelloworkAdapter {
    fn id(&self) -> SourceId {
        SourceId::Hellowork
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
            .append_pair("motsCles", &item.term)
            .append_pair("lieux", &item.location)
            .append_pair("page", &item.page.to_string());
        Ok(url)
    }

    fn parse_page(&self, html: &str) -> ParsedPage {
        self.selectors.parse_page(html)
    }
}
