//! La bonne alternance adapter (alternance.emploi.gouv.fr)

use crate::scrape::client::FetchError;
use crate::scrape::source::{
    compile, CardSelectors, ListingDefaults, ParsedPage, SourceAdapter, SourceLimits,
};
use crate::types::{SourceId, WorkItem};
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://www.alternance.emploi.gouv.fr/recherches-offres-emplois";

/// Government portal, tolerant of crawlers but shallow result sets.
pub const DEFAULT_LIMITS: SourceLimits = SourceLimits {
    delay: Duration::from_millis(2000),
    max_pages: 2,
};

/// Apprenticeship contracts run on school-year cycles, so the fallback
/// duration is a year range rather than a semester.
const DEFAULTS: ListingDefaults = ListingDefaults {
    title_placeholder: "Offre inconnue",
    duration: "1-3 ans",
    salary: "Indiqué sur l'offre",
    study_levels: &["bac+2", "bac+3", "bac+4", "bac+5"],
};

pub struct AlternanceAdapter {
    limits: SourceLimits,
    selectors: CardSelectors,
}

impl AlternanceAdapter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_LIMITS)
    }

    pub fn with_limits(limits: SourceLimits) -> Self {
        Self {
            limits,
            selectors: CardSelectors {
                cards: compile(&[
                    ".offre-card",
                    "div.fr-card",
                    r#"[class*="resultat"]"#,
                    "article",
                ]),
                title: compile(&["h3.fr-card__title", ".offre-card__titre", "h3", "h2"]),
                company: compile(&[
                    ".fr-card__detail",
                    ".offre-card__entreprise",
                    r#"[class*="entreprise"]"#,
                ]),
                location: compile(&[
                    ".fr-card__desc .localisation",
                    ".offre-card__lieu",
                    r#"[class*="lieu"]"#,
                ]),
                description: compile(&[".fr-card__desc", ".offre-card__description"]),
                salary: compile(&[r#"[class*="salaire"]"#]),
                duration: compile(&[r#"[class*="duree"]"#, r#"[class*="contrat"]"#]),
                posted: compile(&["time[datetime]"]),
                next_page: compile(&[
                    r#"a[rel="next"]"#,
                    ".fr-pagination__link--next:not([aria-disabled=\"true\"])",
                ]),
            },
        }
    }
}

impl Default for AlternanceAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for AlternanceAdapter {
    fn id(&self) -> SourceId {
        SourceId::Alternance
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
            .append_pair("q", &item.term)
            .append_pair("lieu", &item.location)
            .append_pair("page", &item.page.to_string());
        Ok(url)
    }

    fn parse_page(&self, html: &str) -> ParsedPage {
        self.selectors.parse_page(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobType;

    #[test]
    fn test_page_url_shape() {
        let adapter = AlternanceAdapter::new();
        let item = WorkItem::new(
            SourceId::Alternance,
            "alternance",
            "Strasbourg",
            1,
            JobType::Apprenticeship,
        );
        let url = adapter.page_url(&item).unwrap();
        assert_eq!(url.host_str(), Some("www.alternance.emploi.gouv.fr"));
        assert!(url.query().unwrap().contains("q=alternance"));
        assert!(url.query().unwrap().contains("lieu=Strasbourg"));
        assert!(url.query().unwrap().contains("page=1"));
    }

    #[test]
    fn test_parse_dsfr_cards() {
        let adapter = AlternanceAdapter::new();
        let html = r#"
            <div class="fr-card">
                <h3 class="fr-card__title">Apprenti développeur web</h3>
                <p class="fr-card__detail">Mairie de Strasbourg</p>
                <div class="fr-card__desc">
                    <span class="localisation">Strasbourg (67)</span>
                    Contrat d'apprentissage au sein de la direction du numérique.
                </div>
            </div>
            <div class="fr-card">
                <h3 class="fr-card__title">Apprenti comptable</h3>
                <p class="fr-card__detail">Cabinet Roux</p>
            </div>
            <a rel="next" href="?page=2">Suivant</a>
        "#;

        let page = adapter.parse_page(html);
        assert_eq!(page.records.len(), 2);
        assert!(page.has_next);
        assert_eq!(
            page.records[0].title.as_deref(),
            Some("Apprenti développeur web")
        );
        assert_eq!(
            page.records[0].company.as_deref(),
            Some("Mairie de Strasbourg")
        );
        assert_eq!(
            page.records[0].location.as_deref(),
            Some("Strasbourg (67)")
        );
    }

    #[test]
    fn test_defaults_mark_salary_as_listed() {
        let adapter = AlternanceAdapter::new();
        assert_eq!(adapter.defaults().salary, "Indiqué sur l'offre");
        assert_eq!(adapter.defaults().duration, "1-3 ans");
    }
}
