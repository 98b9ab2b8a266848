// ============================================================================
// API Client : Financial Modeling Prep
// ============================================================================
// Un GET par appel : {base_url}/{chemin}/{TICKER}?apikey={clé}
// (ou {base_url}/{chemin}?symbol={TICKER}&apikey={clé})
//
// CONCEPTS RUST AVANCÉS :
// 1. Trait avec méthode async (impl Future) : seam pour les tests
// 2. reqwest::Url : segments et query encodés, jamais de concaténation
// 3. Result<T, FetchError> : erreurs typées, la clé API n'y apparaît jamais
// ============================================================================

use std::future::Future;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{EndpointDescriptor, Ticker, TickerParam};

/// Source de données JSON pour un endpoint et un ticker
///
/// CONCEPT RUST : Trait comme point d'injection
/// - FmpClient : implémentation réseau
/// - Les tests de l'orchestrateur fournissent une implémentation en mémoire
pub trait DataSource {
    fn fetch(
        &self,
        endpoint: &EndpointDescriptor,
        ticker: &Ticker,
    ) -> impl Future<Output = std::result::Result<Value, FetchError>> + Send;
}

/// Payload d'erreur renvoyé par FMP avec un statut 200
/// Ex: {"Error Message": "Invalid API KEY. Please retry or visit our documentation..."}
#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    #[serde(rename = "Error Message")]
    message: String,
}

/// Client HTTP pour l'API FMP
///
/// Le reqwest::Client est construit une seule fois (pool de connexions
/// partagé entre les endpoints d'une même recherche).
pub struct FmpClient {
    http: reqwest::Client,
    config: Config,
}

impl FmpClient {
    pub fn new(config: Config) -> Result<Self> {
        debug!("Creating HTTP client");
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self { http, config })
    }

    /// Construit l'URL complète d'un endpoint pour un ticker
    ///
    /// CONCEPT RUST : path_segments_mut() / query_pairs_mut()
    /// - Le ticker est un segment encodé ('/' -> %2F, '#' -> %23)
    /// - Ou une paire de query encodée ('&' -> %26) selon l'endpoint
    pub fn endpoint_url(
        &self,
        endpoint: &EndpointDescriptor,
        ticker: &Ticker,
    ) -> std::result::Result<Url, FetchError> {
        let base = &self.config.base_url;
        let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base URL", base)))?;
            segments
                .pop_if_empty()
                .extend(endpoint.path.split('/').filter(|s| !s.is_empty()));
            if endpoint.ticker_param == TickerParam::PathSegment {
                segments.push(ticker.as_str());
            }
        }

        {
            let mut query = url.query_pairs_mut();
            if let TickerParam::Query(name) = endpoint.ticker_param {
                query.append_pair(name, ticker.as_str());
            }
            query.append_pair("apikey", &self.config.api_key);
        }

        Ok(url)
    }
}

impl DataSource for FmpClient {
    #[instrument(skip(self, endpoint, ticker), fields(endpoint = endpoint.name, ticker = %ticker))]
    async fn fetch(
        &self,
        endpoint: &EndpointDescriptor,
        ticker: &Ticker,
    ) -> std::result::Result<Value, FetchError> {
        let url = self.endpoint_url(endpoint, ticker)?;
        debug!(url = %redact_url(&url), "Sending HTTP request to FMP");

        let response = self.http.get(url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, "FMP returned error status");
            return Err(FetchError::Status {
                code: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;

        // FMP signale clé invalide / quota dépassé avec un 200
        if body.is_object() {
            if let Ok(payload) = ApiErrorPayload::deserialize(&body) {
                warn!(message = %payload.message, "FMP returned an error payload");
                return Err(FetchError::Api(payload.message));
            }
        }

        info!("Successfully fetched endpoint");
        Ok(body)
    }
}

/// URL affichable dans les logs : la valeur de apikey est masquée
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

// ============================================================================
// Tests unitaires
// ============================================================================
