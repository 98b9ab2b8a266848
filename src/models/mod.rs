// ============================================================================
// Module : models
// ============================================================================
// Structures de données : ticker, descripteurs d'endpoint, table normalisée
// ============================================================================

pub mod endpoint; // Descripteurs des endpoints FMP
pub mod table;    // Table normalisée et cellules typées
pub mod ticker;   // Symbole boursier validé

// Re-export des structures principales pour simplifier les imports
pub use endpoint::{default_endpoints, EndpointDescriptor, ExpectedShape, TickerParam};
pub use table::{format_compact, is_identifier_column, Cell, Table};
pub use ticker::Ticker;
