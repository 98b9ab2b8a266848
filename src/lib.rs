// ============================================================================
// Finscope - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;          // Client Financial Modeling Prep
pub mod app;          // État de l'application
pub mod chart;        // Construction des graphiques
pub mod config;       // Configuration (variables d'environnement)
pub mod error;        // Erreurs typées
pub mod metrics;      // Sélection des colonnes traçables
pub mod models;       // Ticker, descripteurs d'endpoints, tables
pub mod normalize;    // JSON brut -> Table
pub mod orchestrator; // Un fetch par endpoint, résultats agrégés
pub mod ui;           // Interface utilisateur
