//! URL in, score out: parser and aggregator wired together.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::aggregator::{Aggregator, EvaluationError, ScoredPage};
use crate::page::ParseFailure;
use crate::parse::{valid_address, PageParser};

#[derive(Clone)]
pub struct CredibilityService {
    parser: Arc<dyn PageParser>,
    aggregator: Aggregator,
}

impl CredibilityService {
    pub fn new(parser: Arc<dyn PageParser>, aggregator: Aggregator) -> Self {
        Self { parser, aggregator }
    }

    /// Invalid addresses fail before any fetch is attempted.
    #[instrument(target = "evaluation", skip(self), fields(parser = self.parser.name()))]
    pub async fn evaluate_url(&self, url: &str) -> Result<ScoredPage, EvaluationError> {
        let url = url.trim();
        if !valid_address(url) {
            return Err(ParseFailure::InvalidUrl(url.to_string()).into());
        }
        info!(target: "evaluation", url, "evaluating");
        let page = self.parser.parse(url).await;
        self.aggregator.evaluate(page).await
    }

    pub fn signal_names(&self) -> Vec<String> {
        self.aggregator
            .registry()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{sentinel_score, EvaluationSettings};
    use crate::parse::StaticPageParser;
    use crate::signals::default_registry;

    fn service(parser: StaticPageParser) -> CredibilityService {
        let aggregator = Aggregator::new(default_registry().unwrap(), EvaluationSettings::default());
        CredibilityService::new(Arc::new(parser), aggregator)
    }

    #[tokio::test]
    async fn invalid_address_is_parse_failure() {
        let svc = service(StaticPageParser::new());
        let r = svc.evaluate_url("not a url").await;
        assert_eq!(
            r.clone().unwrap_err(),
            EvaluationError::Parse(ParseFailure::InvalidUrl("not a url".into()))
        );
        assert_eq!(sentinel_score(&r), -1.0);
    }

    #[tokio::test]
    async fn unknown_page_is_parse_failure() {
        let svc = service(StaticPageParser::new());
        let r = svc.evaluate_url("https://example.org/missing").await;
        assert_eq!(r.unwrap_err(), EvaluationError::Parse(ParseFailure::Absent));
    }

    #[test]
    fn lists_signals() {
        let svc = service(StaticPageParser::new());
        assert_eq!(svc.signal_names().len(), 18);
    }
}
