// ============================================================================
// Module : error
// ============================================================================
// Taxonomie des erreurs de la bibliothèque
//
// CONCEPT RUST : thiserror
// - #[derive(thiserror::Error)] génère Display + std::error::Error
// - #[from] génère les conversions pour l'opérateur ?
// - Le binaire (main.rs) reste sur anyhow, la bibliothèque expose des types
// ============================================================================

use crate::models::ExpectedShape;

/// Saisie utilisateur invalide (avant tout appel réseau)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerError {
    #[error("Please enter a valid ticker symbol.")]
    Empty,

    /// Aucun caractère alphanumérique, ou espace / caractère de contrôle
    #[error("'{0}' is not a valid ticker symbol.")]
    Invalid(String),
}

/// Échec d'un appel HTTP vers l'API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Réponse HTTP hors 2xx
    #[error("HTTP status {code}")]
    Status { code: u16 },

    /// DNS, connexion refusée, TLS...
    #[error("transport error: {0}")]
    Transport(String),

    /// Corps de réponse illisible (JSON invalide)
    #[error("malformed response body: {0}")]
    Body(String),

    /// FMP renvoie ses erreurs (clé invalide, quota) en 200 + {"Error Message": ...}
    #[error("API error: {0}")]
    Api(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // without_url() : l'URL contient la clé API, elle ne doit pas fuiter
        let err = err.without_url();
        if err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Payload JSON qui ne correspond pas à la forme attendue
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("empty response")]
    Empty,

    #[error("expected {expected}, received {found}")]
    ShapeMismatch {
        expected: ExpectedShape,
        found: String,
    },
}

/// Échec de construction d'un graphique
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("column '{0}' is not in the table")]
    MissingColumn(String),

    #[error("no date column to use as a time axis")]
    NoDateAxis,

    #[error("no numeric values to plot for '{0}'")]
    NoData(String),
}

/// Erreur par endpoint, agrégée par l'orchestrateur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}
