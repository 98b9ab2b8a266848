// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Routing des écrans, header, footer
pub mod table;     // Rendu d'une table normalisée
pub mod chart;     // Rendu des graphiques (ligne, barres)

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use dashboard::render;
