// ============================================================================
// Structure : EndpointDescriptor
// ============================================================================
// Décrit une source de données FMP : chemin, forme de la réponse JSON,
// type de graphique proposé par défaut
//
// CONCEPT RUST : Données statiques
// - &'static str : les descripteurs vivent dans le binaire
// - Copy : un descripteur se passe par valeur sans allocation
// ============================================================================

use std::fmt;

use crate::chart::ChartKind;

/// Emplacement du ticker dans la requête
///
/// Le ticker n'est jamais collé dans une chaîne : le client l'ajoute comme
/// segment de chemin ou paramètre de query, encodé par reqwest::Url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerParam {
    /// Dernier segment du chemin : v3/rating/AAPL
    PathSegment,
    /// Paramètre de query : v4/score?symbol=AAPL
    Query(&'static str),
}

/// Forme attendue du JSON renvoyé par un endpoint
///
/// CONCEPT RUST : Enum "tagged variant"
/// - Remplace l'inspection au cas par cas du payload
/// - Le normaliseur fait un match explicite (forme attendue, forme reçue)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    /// Tableau d'objets : une ligne par élément
    List,
    /// Tableau contenant un seul objet utile (le premier)
    Singleton,
    /// Objet nu
    Object,
}

impl fmt::Display for ExpectedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpectedShape::List => "list of records",
            ExpectedShape::Singleton => "singleton list",
            ExpectedShape::Object => "object",
        };
        f.write_str(label)
    }
}

/// Une source de données configurée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Nom affiché (ex: "DCF Reports")
    pub name: &'static str,

    /// Chemin relatif au base URL, sans le ticker
    /// Ex: "v3/income-statement" ou "v4/score"
    pub path: &'static str,

    pub ticker_param: TickerParam,

    pub shape: ExpectedShape,

    /// Clé de l'objet englobant qui contient les enregistrements
    /// Ex: historical-price-full renvoie {"symbol": ..., "historical": [...]}
    pub payload_key: Option<&'static str>,

    /// Graphique proposé en premier pour cet endpoint
    pub chart_kind: ChartKind,
}

impl EndpointDescriptor {
    pub const fn new(name: &'static str, path: &'static str, shape: ExpectedShape) -> Self {
        let chart_kind = match shape {
            ExpectedShape::List => ChartKind::TimeSeries,
            ExpectedShape::Singleton | ExpectedShape::Object => ChartKind::Categorical,
        };
        Self {
            name,
            path,
            ticker_param: TickerParam::PathSegment,
            shape,
            payload_key: None,
            chart_kind,
        }
    }

    pub const fn with_payload_key(mut self, key: &'static str) -> Self {
        self.payload_key = Some(key);
        self
    }

    /// Le ticker passe en paramètre de query au lieu du chemin
    pub const fn with_ticker_query(mut self, name: &'static str) -> Self {
        self.ticker_param = TickerParam::Query(name);
        self
    }
}

/// Endpoints interrogés pour chaque ticker, dans l'ordre d'affichage
pub fn default_endpoints() -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor::new(
            "Income Statement",
            "v3/income-statement",
            ExpectedShape::List,
        ),
        EndpointDescriptor::new("Valuation", "v3/valuation", ExpectedShape::Object),
        EndpointDescriptor::new("Key Metrics", "v3/key-metrics", ExpectedShape::List),
        EndpointDescriptor::new("Ratings", "v3/rating", ExpectedShape::Singleton),
        EndpointDescriptor::new(
            "DCF Reports",
            "v3/discounted-cash-flow",
            ExpectedShape::Singleton,
        ),
        // Seul endpoint v4, le ticker passe en query parameter
        EndpointDescriptor::new("Financial Scores", "v4/score", ExpectedShape::Singleton)
            .with_ticker_query("symbol"),
        EndpointDescriptor::new(
            "Price History",
            "v3/historical-price-full",
            ExpectedShape::List,
        )
        .with_payload_key("historical"),
    ]
}
