// ============================================================================
// Orchestrator
// ============================================================================
// Pour un ticker : un fetch + une normalisation par endpoint configuré,
// chacun indépendant des autres. Le résultat agrégé contient toujours une
// entrée par endpoint, succès ou échec.
//
// CONCEPTS RUST :
// 1. Générique sur un trait (S: DataSource) : dispatch statique
// 2. Result par entrée : un échec n'interrompt jamais la boucle
// 3. async/await séquentiel : pas de concurrence entre endpoints
// ============================================================================

use std::time::Duration;

use tracing::{debug, error, info, instrument};

use crate::api::DataSource;
use crate::error::{EndpointError, TickerError};
use crate::models::{EndpointDescriptor, Table, Ticker};
use crate::normalize::normalize_endpoint;

/// Résultat d'un endpoint
#[derive(Debug, Clone)]
pub struct EndpointOutcome {
    pub endpoint: EndpointDescriptor,
    pub result: Result<Table, EndpointError>,
}

impl EndpointOutcome {
    pub fn name(&self) -> &'static str {
        self.endpoint.name
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn table(&self) -> Option<&Table> {
        self.result.as_ref().ok()
    }

    /// Message d'erreur affiché à l'utilisateur
    pub fn notice(&self) -> Option<String> {
        self.result
            .as_ref()
            .err()
            .map(|_| format!("Failed to fetch {}", self.endpoint.name))
    }
}

/// Résultat agrégé d'une recherche, dans l'ordre des endpoints configurés
#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub ticker: Ticker,
    pub outcomes: Vec<EndpointOutcome>,
}

impl AggregateResult {
    /// Résultat d'un endpoint par son nom
    pub fn get(&self, name: &str) -> Option<&Result<Table, EndpointError>> {
        self.outcomes
            .iter()
            .find(|o| o.endpoint.name == name)
            .map(|o| &o.result)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

/// Orchestrateur piloté par une table de descripteurs
pub struct Orchestrator<S> {
    source: S,
    endpoints: Vec<EndpointDescriptor>,
    /// Pause entre deux endpoints (rate limiting)
    delay: Duration,
}

impl<S: DataSource> Orchestrator<S> {
    pub fn new(source: S, endpoints: Vec<EndpointDescriptor>) -> Self {
        Self {
            source,
            endpoints,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Valide la saisie utilisateur puis lance la recherche
    ///
    /// Une saisie vide est rejetée avant tout appel réseau.
    pub async fn run_input(&self, input: &str) -> Result<AggregateResult, TickerError> {
        let ticker = Ticker::parse(input)?;
        Ok(self.run(&ticker).await)
    }

    /// Interroge chaque endpoint configuré, séquentiellement
    #[instrument(skip(self, ticker), fields(ticker = %ticker, endpoints = self.endpoints.len()))]
    pub async fn run(&self, ticker: &Ticker) -> AggregateResult {
        let mut outcomes = Vec::with_capacity(self.endpoints.len());

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            debug!(endpoint = endpoint.name, progress = i + 1, total = self.endpoints.len(), "Fetching endpoint");

            let result = self.fetch_one(endpoint, ticker).await;
            match &result {
                Ok(table) => info!(endpoint = endpoint.name, rows = table.len(), "Endpoint loaded"),
                Err(e) => error!(endpoint = endpoint.name, error = %e, "Endpoint failed"),
            }

            outcomes.push(EndpointOutcome {
                endpoint: *endpoint,
                result,
            });

            // Petit délai entre les requêtes (rate limiting)
            if !self.delay.is_zero() && i + 1 < self.endpoints.len() {
                tokio::time::sleep(self.delay).await;
            }
        }

        let aggregate = AggregateResult {
            ticker: ticker.clone(),
            outcomes,
        };
        info!(
            succeeded = aggregate.succeeded(),
            failed = aggregate.failed(),
            "Fetch action complete"
        );
        aggregate
    }

    async fn fetch_one(
        &self,
        endpoint: &EndpointDescriptor,
        ticker: &Ticker,
    ) -> Result<Table, EndpointError> {
        let raw = self.source.fetch(endpoint, ticker).await?;
        Ok(normalize_endpoint(&raw, endpoint)?)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, NormalizeError};
    use crate::models::{default_endpoints, ExpectedShape};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source en mémoire : réponses par nom d'endpoint, compteur d'appels
    struct StubSource {
        responses: HashMap<&'static str, Result<Value, FetchError>>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(responses: Vec<(&'static str, Result<Value, FetchError>)>) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DataSource for StubSource {
        async fn fetch(
            &self,
            endpoint: &EndpointDescriptor,
            _ticker: &Ticker,
        ) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(endpoint.name)
                .cloned()
                .unwrap_or(Err(FetchError::Status { code: 404 }))
        }
    }

    #[tokio::test]
    async fn test_one_entry_per_endpoint_even_when_all_fail() {
        let orchestrator = Orchestrator::new(StubSource::new(vec![]), default_endpoints());
        let ticker = Ticker::parse("AAPL").unwrap();

        let result = orchestrator.run(&ticker).await;

        assert_eq!(result.len(), default_endpoints().len());
        assert_eq!(result.failed(), result.len());
        assert_eq!(orchestrator.source().calls(), default_endpoints().len());
    }

    #[tokio::test]
    async fn test_empty_dcf_does_not_abort_others() {
        let source = StubSource::new(vec![
            (
                "Income Statement",
                Ok(json!([
                    {"date": "2023-12-31", "revenue": "383285000000"},
                    {"date": "2022-12-31", "revenue": "394328000000"}
                ])),
            ),
            ("DCF Reports", Ok(json!([]))),
            ("Ratings", Ok(json!([{"symbol": "AAPL", "rating": "S", "ratingScore": 5}]))),
        ]);
        let orchestrator = Orchestrator::new(source, default_endpoints());

        let result = orchestrator.run_input("aapl").await.unwrap();

        assert_eq!(result.ticker.as_str(), "AAPL");
        assert_eq!(result.len(), default_endpoints().len());

        let dcf = result.outcomes.iter().find(|o| o.name() == "DCF Reports").unwrap();
        assert_eq!(dcf.result, Err(EndpointError::Normalize(NormalizeError::Empty)));
        assert_eq!(dcf.notice().as_deref(), Some("Failed to fetch DCF Reports"));

        let income = result.get("Income Statement").unwrap().as_ref().unwrap();
        assert_eq!(income.len(), 2);
        assert!(result.get("Ratings").unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_empty_ticker_makes_no_call() {
        let orchestrator = Orchestrator::new(StubSource::new(vec![]), default_endpoints());

        let err = orchestrator.run_input("   ").await.unwrap_err();

        assert_eq!(err, TickerError::Empty);
        assert_eq!(orchestrator.source().calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_kept_per_endpoint() {
        let endpoints = vec![
            EndpointDescriptor::new("A", "a", ExpectedShape::Object),
            EndpointDescriptor::new("B", "b", ExpectedShape::Object),
        ];
        let source = StubSource::new(vec![
            ("A", Err(FetchError::Status { code: 401 })),
            ("B", Ok(json!({"symbol": "MSFT", "dcf": 400.1}))),
        ]);
        let orchestrator = Orchestrator::new(source, endpoints);

        let result = orchestrator.run(&Ticker::parse("msft").unwrap()).await;

        let names: Vec<_> = result.outcomes.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(
            result.get("A"),
            Some(&Err(EndpointError::Fetch(FetchError::Status { code: 401 })))
        );
        assert_eq!(result.succeeded(), 1);
        assert!(result.outcomes[1].notice().is_none());
    }
}
