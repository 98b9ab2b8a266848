// ============================================================================
// Module : api
// ============================================================================
// Clients API pour récupérer les données financières
// ============================================================================

pub mod fmp; // Client API Financial Modeling Prep

// Re-export des types principaux
pub use fmp::{DataSource, FmpClient};
