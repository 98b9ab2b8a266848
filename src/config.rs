// ============================================================================
// Configuration
// ============================================================================
// Base URL, clé API et paramètres réseau, lus une seule fois au démarrage
// puis passés par référence (pas d'état global mutable)
//
// Variables d'environnement (ou fichier .env) :
// - FMP_API_KEY          : obligatoire
// - FMP_BASE_URL         : défaut https://financialmodelingprep.com/api
// - FMP_REQUEST_DELAY_MS : pause entre deux endpoints, défaut 0
// - FMP_USER_AGENT       : défaut finscope/<version>
// ============================================================================

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api";

/// Configuration de l'application
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    /// Délai entre deux appels d'endpoint (rate limiting)
    pub request_delay: Duration,
    pub user_agent: String,
}

impl Config {
    /// Configuration minimale avec les valeurs par défaut
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            request_delay: Duration::ZERO,
            user_agent: default_user_agent(),
        }
    }

    /// Lit la configuration depuis l'environnement du processus
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lookup
    ///
    /// CONCEPT RUST : Injection via closure
    /// - from_env() passe std::env::var
    /// - Les tests passent une HashMap, sans toucher à l'environnement global
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("FMP_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .context("FMP_API_KEY n'est pas défini (environnement ou fichier .env)")?;

        let mut config = Self::new(api_key.trim());

        if let Some(base_url) = lookup("FMP_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }

        if let Some(delay) = lookup("FMP_REQUEST_DELAY_MS") {
            let millis: u64 = delay
                .trim()
                .parse()
                .with_context(|| format!("FMP_REQUEST_DELAY_MS invalide : {:?}", delay))?;
            config.request_delay = Duration::from_millis(millis);
        }

        if let Some(user_agent) = lookup("FMP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        Ok(config)
    }
}

fn default_user_agent() -> String {
    format!("finscope/{}", env!("CARGO_PKG_VERSION"))
}

/// Debug masque la clé API (les configs finissent dans les logs)
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("request_delay", &self.request_delay)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
