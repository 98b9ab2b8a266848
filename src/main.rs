// ============================================================================
// Finscope - Explorateur de données financières (FMP)
// ============================================================================
// Programme TUI : saisie d'un ticker, récupération de chaque endpoint FMP
// configuré, tables et graphiques par endpoint
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : un worker thread possède le runtime tokio
// 4. Channels mpsc : l'UI ne bloque jamais pendant les appels réseau
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use finscope::api::FmpClient;
use finscope::app::App;
use finscope::config::Config;
use finscope::models::{default_endpoints, Ticker};
use finscope::orchestrator::{AggregateResult, Orchestrator};
use finscope::ui::{events::EventHandler, render};

/// Lignes de champs sautées par PageUp / PageDown
const PAGE_SIZE: usize = 10;

// ============================================================================
// AppCommand / AppResult : communication avec le worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Interroger tous les endpoints configurés pour un ticker
    Fetch { ticker: Ticker },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Une entrée par endpoint, succès ou échec
    Fetched(AggregateResult),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, rotation quotidienne
// ============================================================================

/// Répertoire des logs : data_local_dir()/finscope/logs, sinon ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("finscope").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/finscope/logs/finscope.log.*
///
/// # Contrôler le niveau de log
/// RUST_LOG=finscope=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "finscope.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Thread UI vs worker
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour finscope, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finscope=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("Finscope starting up");

    // .env optionnel : les variables déjà définies gardent la priorité
    if let Err(e) = dotenv::dotenv() {
        debug!(error = %e, "No .env file loaded");
    }

    // Configuration et client construits avant le TUI : une erreur
    // s'affiche normalement dans le terminal
    let config = Config::from_env().context("Configuration invalide")?;
    debug!(?config, "Configuration loaded");

    let delay = config.request_delay;
    let client = FmpClient::new(config)?;
    let orchestrator = Orchestrator::new(client, default_endpoints()).with_delay(delay);

    // Le runtime est créé ici puis déplacé dans le worker
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // CONCEPT RUST : Arc<Mutex<>> pour partage entre threads
    let app = Arc::new(Mutex::new(App::new()));

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, orchestrator, runtime);

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Verrouille l'état partagé
///
/// Un thread qui panique en tenant le verrou ne doit pas bloquer l'UI :
/// on récupère l'état tel quel.
fn lock(app: &Mutex<App>) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - std::thread::spawn() : crée un thread OS
// - runtime.block_on() bloque le worker, jamais l'UI
// ============================================================================

fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    orchestrator: Orchestrator<FmpClient>,
    runtime: tokio::runtime::Runtime,
) {
    std::thread::spawn(move || {
        // recv() échoue quand l'UI a fermé le channel
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::Fetch { ticker } => {
                    let aggregate = runtime.block_on(orchestrator.run(&ticker));

                    if result_tx.send(AppResult::Fetched(aggregate)).is_err() {
                        warn!("UI closed before results were delivered");
                        break;
                    }
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Render
//   2. Input
//   3. Tick
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    while lock(&app).is_running() {
        // 0. RÉSULTATS : try_recv ne bloque pas
        match result_rx.try_recv() {
            Ok(AppResult::Fetched(aggregate)) => {
                info!(
                    ticker = %aggregate.ticker,
                    succeeded = aggregate.succeeded(),
                    failed = aggregate.failed(),
                    "Results received"
                );
                let mut app = lock(&app);
                app.stop_loading();
                app.set_results(aggregate);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                let mut app = lock(&app);
                if app.is_loading_data() {
                    error!("Worker thread disconnected!");
                    app.stop_loading();
                    app.set_warning("Background worker stopped".to_string());
                }
            }
        }

        // 1. RENDER
        terminal.draw(|frame| {
            let app = lock(&app);
            render(frame, &app);
        })?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(&mut lock(&app), event, &command_tx),
            Err(e) => warn!(error = %e, "Failed to read terminal event"),
        }

        // 3. UPDATE
        lock(&app).tick();
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Avertissement affiché si Enter est pressé pendant une recherche
const SEARCH_RUNNING_WARNING: &str = "Search already running, please wait for the results.";

/// Envoie une recherche au worker
fn submit_search(app: &mut App, command_tx: &mpsc::Sender<AppCommand>) {
    if app.is_loading_data() {
        debug!("Search already running, ignoring submit");
        app.set_warning(SEARCH_RUNNING_WARNING.to_string());
        return;
    }

    // Saisie invalide : submit_input() pose l'avertissement, aucun appel réseau
    let Some(ticker) = app.submit_input() else {
        debug!("Invalid ticker symbol, ignoring");
        return;
    };

    info!(ticker = %ticker, "User submitted ticker");
    app.start_loading(Some(format!("Fetching data for {}...", ticker)));

    if command_tx.send(AppCommand::Fetch { ticker }).is_err() {
        error!("Worker channel closed");
        app.stop_loading();
        app.set_warning("Background worker stopped".to_string());
    }
}

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Les arms du mode saisie passent avant les raccourcis : 'q', 'j', 'k'...
///   sont des caractères valides dans un ticker
fn handle_event(app: &mut App, event: finscope::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use finscope::ui::events::{
        get_char_from_event, is_backspace_event, is_chart_mode_event, is_down_event,
        is_enter_event, is_escape_event, is_new_search_event, is_newer_records_event,
        is_next_metric_event, is_older_records_event, is_page_down_event, is_page_up_event,
        is_previous_metric_event, is_quit_event, is_ticker_char_event, is_up_event, Event,
    };

    if let Event::Tick = event {
        return;
    }

    // Two-step quit : seconde pression de 'q'
    if app.is_awaiting_quit_confirmation() {
        if is_quit_event(&event) {
            info!("User confirmed quit");
            app.quit();
        } else {
            app.cancel_quit();
        }
        return;
    }

    match event {
        // ========================================
        // Écran de saisie
        // ========================================
        Event::Key(_) if is_escape_event(&event) && app.is_in_input_mode() => {
            if app.results.is_some() {
                info!("User cancelled input");
                app.cancel_input();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }
        Event::Key(_) if is_enter_event(&event) && app.is_in_input_mode() => {
            submit_search(app, command_tx);
        }
        Event::Key(_) if is_backspace_event(&event) && app.is_in_input_mode() => {
            app.backspace();
        }
        Event::Key(_) if is_ticker_char_event(&event) && app.is_in_input_mode() => {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        Event::Key(_) if app.is_in_input_mode() => {}

        // ========================================
        // Raccourcis communs
        // ========================================
        Event::Key(_) if is_quit_event(&event) => {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        Event::Key(_) if is_new_search_event(&event) => {
            info!("User started a new search");
            app.start_input();
        }
        Event::Key(_) if is_up_event(&event) => {
            debug!("User navigated up");
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) => {
            debug!("User navigated down");
            app.navigate_down();
        }

        // ========================================
        // Écran Results
        // ========================================
        Event::Key(_) if is_enter_event(&event) && app.is_on_results() => {
            if let Some(outcome) = app.selected_outcome() {
                info!(endpoint = outcome.name(), "User opened chart view");
            }
            app.show_chart();
        }
        Event::Key(_) if is_page_down_event(&event) && app.is_on_results() => {
            app.scroll_fields_down(PAGE_SIZE);
        }
        Event::Key(_) if is_page_up_event(&event) && app.is_on_results() => {
            app.scroll_fields_up(PAGE_SIZE);
        }
        Event::Key(_) if is_older_records_event(&event) && app.is_on_results() => {
            app.older_records();
        }
        Event::Key(_) if is_newer_records_event(&event) && app.is_on_results() => {
            app.newer_records();
        }

        // ========================================
        // Écran ChartView
        // ========================================
        Event::Key(_) if is_escape_event(&event) && app.is_on_chart() => {
            debug!("User returned to results");
            app.show_results();
        }
        Event::Key(_) if is_next_metric_event(&event) && app.is_on_chart() => {
            app.next_metric();
            debug!(metric = ?app.selected_metric(), "User changed to next metric");
        }
        Event::Key(_) if is_previous_metric_event(&event) && app.is_on_chart() => {
            app.previous_metric();
            debug!(metric = ?app.selected_metric(), "User changed to previous metric");
        }
        Event::Key(_) if is_chart_mode_event(&event) && app.is_on_chart() => {
            app.next_chart_mode();
            debug!(mode = app.chart_mode.label(), "User changed chart mode");
        }

        _ => {
            // Autres touches : ignorées
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même si la boucle a échoué
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use finscope::app::Screen;
    use finscope::ui::events::Event;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_typing_q_in_input_does_not_quit() {
        let (tx, _rx) = mpsc::channel();
        let mut app = App::new();

        handle_event(&mut app, key(KeyCode::Char('q')), &tx);

        assert_eq!(app.input_buffer, "q");
        assert!(!app.is_awaiting_quit_confirmation());
    }

    #[test]
    fn test_empty_submit_sends_nothing() {
        let (tx, rx) = mpsc::channel();
        let mut app = App::new();

        handle_event(&mut app, key(KeyCode::Enter), &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(app.warning.as_deref(), Some("Please enter a valid ticker symbol."));
        assert!(!app.is_loading_data());
    }

    #[test]
    fn test_submit_sends_fetch_command() {
        let (tx, rx) = mpsc::channel();
        let mut app = App::new();

        for c in "aapl".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)), &tx);
        }
        handle_event(&mut app, key(KeyCode::Enter), &tx);

        match rx.try_recv() {
            Ok(AppCommand::Fetch { ticker }) => assert_eq!(ticker.as_str(), "AAPL"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(app.is_loading_data());
    }

    #[test]
    fn test_submit_while_loading_warns() {
        let (tx, rx) = mpsc::channel();
        let mut app = App::new();

        for c in "msft".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)), &tx);
        }
        handle_event(&mut app, key(KeyCode::Enter), &tx);
        assert!(rx.try_recv().is_ok());

        // Seconde saisie pendant le chargement : rien n'est envoyé
        handle_event(&mut app, key(KeyCode::Char('x')), &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(app.warning.as_deref(), Some(SEARCH_RUNNING_WARNING));
        assert_eq!(app.input_buffer, "x");
    }

    #[test]
    fn test_invalid_ticker_warns() {
        let (tx, rx) = mpsc::channel();
        let mut app = App::new();

        handle_event(&mut app, key(KeyCode::Char('.')), &tx);
        handle_event(&mut app, key(KeyCode::Char('.')), &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(app.warning.as_deref(), Some("'..' is not a valid ticker symbol."));
    }

    #[test]
    fn test_escape_without_results_asks_to_quit() {
        let (tx, _rx) = mpsc::channel();
        let mut app = App::new();

        handle_event(&mut app, key(KeyCode::Esc), &tx);
        assert!(app.is_awaiting_quit_confirmation());

        handle_event(&mut app, key(KeyCode::Char('q')), &tx);
        assert!(!app.is_running());
        assert_eq!(app.current_screen, Screen::Input);
    }
}
