// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Emprunts : les vues (table, métriques) sont empruntées à App, pas copiées
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use crate::chart::{field_breakdown, render_chart, Chart, ChartKind};
use crate::error::RenderError;
use crate::metrics::plottable_columns;
use crate::models::{Table, Ticker};
use crate::orchestrator::{AggregateResult, EndpointOutcome};

/// Prompt de la saisie du ticker
pub const TICKER_PROMPT: &str = "Stock Ticker: ";

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Saisie du ticker (écran de démarrage)
    Input,

    /// Liste des endpoints + table de l'endpoint sélectionné
    Results,

    /// Graphique de la métrique sélectionnée
    ChartView,
}

/// Mode du graphique, cyclé avec la touche 'c'
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    TimeSeries,
    Categorical,
    /// Une barre par champ numérique de la première ligne
    Breakdown,
}

impl ChartMode {
    pub fn next(&self) -> ChartMode {
        match self {
            ChartMode::TimeSeries => ChartMode::Categorical,
            ChartMode::Categorical => ChartMode::Breakdown,
            ChartMode::Breakdown => ChartMode::TimeSeries,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartMode::TimeSeries => "time-series",
            ChartMode::Categorical => "categorical",
            ChartMode::Breakdown => "breakdown",
        }
    }
}

impl From<ChartKind> for ChartMode {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::TimeSeries => ChartMode::TimeSeries,
            ChartKind::Categorical => ChartMode::Categorical,
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    pub current_screen: Screen,

    /// Buffer de saisie du ticker
    pub input_buffer: String,

    pub input_prompt: String,

    /// Avertissement affiché sous la saisie (ticker vide, erreur worker)
    pub warning: Option<String>,

    /// CONCEPT : Background loading state
    /// - true : affiche un indicateur de chargement
    pub is_loading: bool,

    pub loading_message: Option<String>,

    /// Résultat de la dernière recherche (None avant la première)
    pub results: Option<AggregateResult>,

    /// Index de l'endpoint sélectionné
    pub selected_index: usize,

    /// Index de la métrique sélectionnée parmi les colonnes traçables
    pub metric_index: usize,

    pub chart_mode: ChartMode,

    /// Première ligne de champs affichée dans la table (scroll vertical)
    pub field_scroll: usize,

    /// Décalage depuis l'enregistrement le plus récent (scroll horizontal)
    pub record_offset: usize,

    /// Two-step quit : première pression de 'q' -> confirmation
    pub confirm_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            current_screen: Screen::Input, // Commence sur la saisie
            input_buffer: String::new(),
            input_prompt: TICKER_PROMPT.to_string(),
            warning: None,
            is_loading: false,
            loading_message: None,
            results: None,
            selected_index: 0,
            metric_index: 0,
            chart_mode: ChartMode::TimeSeries,
            field_scroll: 0,
            record_offset: 0,
            confirm_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : appelé à chaque itération de la boucle
    pub fn tick(&mut self) {}

    // ========================================================================
    // Résultats
    // ========================================================================

    /// Remplace les résultats et revient sur l'écran Results
    pub fn set_results(&mut self, results: AggregateResult) {
        self.results = Some(results);
        self.warning = None;
        self.selected_index = 0;
        self.reset_selection();
        self.current_screen = Screen::Results;
    }

    pub fn outcomes(&self) -> &[EndpointOutcome] {
        self.results
            .as_ref()
            .map(|r| r.outcomes.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_outcome(&self) -> Option<&EndpointOutcome> {
        self.outcomes().get(self.selected_index)
    }

    pub fn selected_table(&self) -> Option<&Table> {
        self.selected_outcome()?.table()
    }

    /// Navigue vers le haut dans la liste des endpoints
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
        self.reset_selection();
    }

    /// Navigue vers le bas, sans dépasser le dernier endpoint
    pub fn navigate_down(&mut self) {
        let max_index = self.outcomes().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
        self.reset_selection();
    }

    /// Métrique et mode par défaut de l'endpoint sélectionné
    fn reset_selection(&mut self) {
        self.metric_index = 0;
        self.field_scroll = 0;
        self.record_offset = 0;
        self.chart_mode = self
            .selected_outcome()
            .map(|o| ChartMode::from(o.endpoint.chart_kind))
            .unwrap_or(ChartMode::TimeSeries);
    }

    // ========================================================================
    // Scroll de la table
    // ========================================================================

    pub fn scroll_fields_down(&mut self, lines: usize) {
        let max = self
            .selected_table()
            .map(|t| t.columns().len().saturating_sub(1))
            .unwrap_or(0);
        self.field_scroll = (self.field_scroll + lines).min(max);
    }

    pub fn scroll_fields_up(&mut self, lines: usize) {
        self.field_scroll = self.field_scroll.saturating_sub(lines);
    }

    /// Décale la fenêtre vers les enregistrements plus anciens
    pub fn older_records(&mut self) {
        let max = self
            .selected_table()
            .map(|t| t.len().saturating_sub(1))
            .unwrap_or(0);
        self.record_offset = (self.record_offset + 1).min(max);
    }

    pub fn newer_records(&mut self) {
        self.record_offset = self.record_offset.saturating_sub(1);
    }

    // ========================================================================
    // Métriques et graphique
    // ========================================================================

    /// Colonnes traçables de l'endpoint sélectionné
    pub fn metrics(&self) -> Vec<&str> {
        self.selected_table()
            .map(plottable_columns)
            .unwrap_or_default()
    }

    pub fn selected_metric(&self) -> Option<&str> {
        self.metrics().get(self.metric_index).copied()
    }

    /// Métrique suivante (cyclique)
    pub fn next_metric(&mut self) {
        let count = self.metrics().len();
        if count > 0 {
            self.metric_index = (self.metric_index + 1) % count;
        }
    }

    /// Métrique précédente (cyclique)
    pub fn previous_metric(&mut self) {
        let count = self.metrics().len();
        if count > 0 {
            self.metric_index = (self.metric_index + count - 1) % count;
        }
    }

    pub fn next_chart_mode(&mut self) {
        self.chart_mode = self.chart_mode.next();
    }

    /// Graphique courant : None si l'endpoint sélectionné n'a pas de table
    pub fn current_chart(&self) -> Option<Result<Chart, RenderError>> {
        let table = self.selected_table()?;

        let chart = match self.chart_mode {
            ChartMode::Breakdown => field_breakdown(table),
            mode => {
                let kind = if mode == ChartMode::TimeSeries {
                    ChartKind::TimeSeries
                } else {
                    ChartKind::Categorical
                };
                match self.selected_metric() {
                    Some(metric) => render_chart(table, metric, kind),
                    None => Err(RenderError::NoData(
                        self.selected_outcome().map(|o| o.name()).unwrap_or("?").to_string(),
                    )),
                }
            }
        };
        Some(chart)
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    pub fn show_chart(&mut self) {
        if self.results.is_some() {
            self.current_screen = Screen::ChartView;
        }
    }

    pub fn show_results(&mut self) {
        if self.results.is_some() {
            self.current_screen = Screen::Results;
        }
    }

    pub fn is_on_results(&self) -> bool {
        self.current_screen == Screen::Results
    }

    pub fn is_on_chart(&self) -> bool {
        self.current_screen == Screen::ChartView
    }

    // ========================================================================
    // Quit confirmation
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Loading
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode saisie (nouvelle recherche)
    pub fn start_input(&mut self) {
        self.current_screen = Screen::Input;
        self.input_buffer.clear();
        self.input_prompt = TICKER_PROMPT.to_string();
        self.warning = None;
    }

    /// Annule la saisie : retour aux résultats s'il y en a
    pub fn cancel_input(&mut self) {
        self.input_buffer.clear();
        self.warning = None;
        if self.results.is_some() {
            self.current_screen = Screen::Results;
        }
    }

    /// Valide la saisie
    ///
    /// CONCEPT : Validation avant tout appel réseau
    /// - Saisie vide : avertissement, on reste sur l'écran de saisie
    /// - Sinon : retourne le Ticker à envoyer au worker
    pub fn submit_input(&mut self) -> Option<Ticker> {
        match Ticker::parse(&self.input_buffer) {
            Ok(ticker) => {
                self.input_buffer.clear();
                self.warning = None;
                Some(ticker)
            }
            Err(e) => {
                self.warning = Some(e.to_string());
                None
            }
        }
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::Input
    }

    pub fn set_warning(&mut self, message: String) {
        self.warning = Some(message);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EndpointError, NormalizeError};
    use crate::models::{default_endpoints, ExpectedShape};
    use crate::normalize::normalize;
    use serde_json::json;

    fn sample_results() -> AggregateResult {
        let endpoints = default_endpoints();
        let income = normalize(
            &json!([
                {"date": "2023-12-31", "revenue": 383285000000i64, "netIncome": 96995000000i64},
                {"date": "2022-12-31", "revenue": 394328000000i64, "netIncome": 99803000000i64}
            ]),
            ExpectedShape::List,
        );
        let valuation = normalize(&json!({"symbol": "AAPL", "dcf": 150.2}), ExpectedShape::Object);

        AggregateResult {
            ticker: Ticker::parse("AAPL").unwrap(),
            outcomes: vec![
                EndpointOutcome {
                    endpoint: endpoints[0],
                    result: income.map_err(EndpointError::from),
                },
                EndpointOutcome {
                    endpoint: endpoints[1],
                    result: valuation.map_err(EndpointError::from),
                },
                EndpointOutcome {
                    endpoint: endpoints[4],
                    result: Err(NormalizeError::Empty.into()),
                },
            ],
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.is_in_input_mode());
        assert!(app.results.is_none());
        assert!(app.current_chart().is_none());
    }

    #[test]
    fn test_empty_submit_warns() {
        let mut app = App::new();
        app.append_char(' ');

        assert!(app.submit_input().is_none());
        assert_eq!(app.warning.as_deref(), Some("Please enter a valid ticker symbol."));
        assert!(app.is_in_input_mode());
    }

    #[test]
    fn test_submit_uppercases() {
        let mut app = App::new();
        for c in "tsla".chars() {
            app.append_char(c);
        }
        app.backspace();
        app.append_char('a');

        let ticker = app.submit_input().unwrap();
        assert_eq!(ticker.as_str(), "TSLA");
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_results_clear_warning() {
        let mut app = App::new();
        app.set_warning("Search already running".to_string());

        app.set_results(sample_results());
        assert!(app.warning.is_none());
    }

    #[test]
    fn test_results_navigation() {
        let mut app = App::new();
        app.set_results(sample_results());
        assert!(app.is_on_results());

        assert_eq!(app.selected_outcome().unwrap().name(), "Income Statement");
        assert_eq!(app.chart_mode, ChartMode::TimeSeries);

        app.navigate_down();
        assert_eq!(app.selected_outcome().unwrap().name(), "Valuation");
        assert_eq!(app.chart_mode, ChartMode::Categorical);

        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);
        assert!(app.selected_table().is_none());
        assert!(app.current_chart().is_none());

        app.navigate_up();
        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_metric_cycle() {
        let mut app = App::new();
        app.set_results(sample_results());

        assert_eq!(app.metrics(), vec!["revenue", "netIncome"]);
        assert_eq!(app.selected_metric(), Some("revenue"));

        app.next_metric();
        assert_eq!(app.selected_metric(), Some("netIncome"));
        app.next_metric();
        assert_eq!(app.selected_metric(), Some("revenue"));
        app.previous_metric();
        assert_eq!(app.selected_metric(), Some("netIncome"));
    }

    #[test]
    fn test_current_chart_modes() {
        let mut app = App::new();
        app.set_results(sample_results());

        let chart = app.current_chart().unwrap().unwrap();
        assert_eq!(chart.kind, ChartKind::TimeSeries);
        assert_eq!(chart.points.len(), 2);

        app.next_chart_mode();
        assert_eq!(app.chart_mode, ChartMode::Categorical);
        let chart = app.current_chart().unwrap().unwrap();
        assert_eq!(chart.kind, ChartKind::Categorical);

        app.next_chart_mode();
        let chart = app.current_chart().unwrap().unwrap();
        assert_eq!(chart.points.len(), 2); // revenue + netIncome de la première ligne

        // Valuation : pas de colonne date
        app.navigate_down();
        app.chart_mode = ChartMode::TimeSeries;
        assert_eq!(app.current_chart(), Some(Err(RenderError::NoDateAxis)));
    }

    #[test]
    fn test_table_scroll_bounded() {
        let mut app = App::new();
        app.set_results(sample_results());

        // Income Statement : 3 colonnes, 2 enregistrements
        app.scroll_fields_down(10);
        assert_eq!(app.field_scroll, 2);
        app.scroll_fields_up(1);
        assert_eq!(app.field_scroll, 1);

        app.older_records();
        app.older_records();
        assert_eq!(app.record_offset, 1);
        app.newer_records();
        assert_eq!(app.record_offset, 0);

        app.navigate_down();
        assert_eq!(app.field_scroll, 0);
    }

    #[test]
    fn test_cancel_input_returns_to_results() {
        let mut app = App::new();
        app.cancel_input();
        assert!(app.is_in_input_mode());

        app.set_results(sample_results());
        app.start_input();
        assert!(app.is_in_input_mode());
        app.cancel_input();
        assert!(app.is_on_results());
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }
}
