// ============================================================================
// LazyFolio - Tableau de bord boursier dans le terminal
// ============================================================================
// Treemap du S&P 500, fiches des actions, portefeuille et passage d'ordres
// sur un backend de courtage simulé
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Worker thread : les appels HTTP tournent dans un runtime tokio séparé
// 4. Channels : commandes vers le worker, résultats vers la boucle
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use lazyfolio::api::{ApiClient, ReqwestTransport};
use lazyfolio::app::{App, Focus};
use lazyfolio::config::Config;
use lazyfolio::logging::init_logging;
use lazyfolio::router::Route;
use lazyfolio::session::{FileTokenStorage, MemoryTokenStorage, SessionStore};
use lazyfolio::ui::{events::EventHandler, render, Event};
use lazyfolio::worker::{spawn_worker, AppCommand, AppResult};

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::parse();

    // Logging en premier : si l'init échoue, on continue sans logs
    init_logging(&config.log_dir()).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api_url = %config.api_url, "LazyFolio starting up");

    // Session : lue une seule fois au démarrage
    let session = Arc::new(if config.no_persist {
        SessionStore::new(MemoryTokenStorage::new())
    } else {
        SessionStore::new(FileTokenStorage::in_dir(&config.data_dir()))
    });
    session.initialize();

    let transport = ReqwestTransport::new(config.timeout())?;
    let client = ApiClient::new(&config.api_url, Arc::new(transport), Arc::clone(&session));

    // Channels pour communication avec le worker thread
    // - command_tx/rx : event loop -> worker
    // - result_tx/rx : worker -> event loop
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    let worker = spawn_worker(client, command_rx, result_tx)?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(session);
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Fermer le channel des commandes arrête le worker
    drop(command_tx);
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop
// ============================================================================
// 1. Applique les résultats du worker (non-bloquant)
// 2. Envoie les commandes accumulées par App
// 3. Dessine
// 4. Attend un événement (max 250ms) et le traite
// 5. Tick (redirections différées, garde de navigation)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    let mut worker_alive = true;

    while app.is_running() {
        // CONCEPT RUST : try_recv() non-bloquant
        // - On vide tout ce qui est arrivé depuis la dernière frame
        loop {
            match result_rx.try_recv() {
                Ok(result) => app.apply(result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if worker_alive {
                        error!("Worker thread disconnected!");
                        worker_alive = false;
                    }
                    break;
                }
            }
        }

        dispatch(app, command_tx);

        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => error!(error = ?e, "Failed to read terminal event"),
        }

        dispatch(app, command_tx);
        app.tick();
    }

    Ok(())
}

/// Envoie au worker les commandes accumulées par App
fn dispatch(app: &mut App, command_tx: &mpsc::Sender<AppCommand>) {
    for command in app.take_commands() {
        debug!(?command, "Dispatching command");
        if command_tx.send(command).is_err() {
            error!("Command channel closed, worker is gone");
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT RUST : Match guards
// - Event::Key(_) if condition : le bras ne matche que si la condition est vraie
// - L'ordre des bras compte : la saisie en cours passe avant les raccourcis
// ============================================================================

fn handle_event(app: &mut App, event: Event) {
    use lazyfolio::ui::events::{
        click_position, is_enter_event, is_escape_event, is_force_quit_event,
        is_next_range_event, is_previous_range_event, is_quit_event, is_search_event,
        is_tab_event, move_position, nav_key,
    };

    match event {
        Event::Key(_) if is_force_quit_event(&event) => {
            info!("User forced quit");
            app.quit();
        }

        // Un champ a le focus : les touches vont à la saisie
        Event::Key(_) if app.focus != Focus::None => {
            app.cancel_quit();
            handle_input_key(app, &event);
        }

        // Two-step quit
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_search_event(&event) => {
            app.cancel_quit();
            app.focus_search();
        }

        Event::Key(_) if is_escape_event(&event) => {
            app.cancel_quit();
            debug!("User navigated back");
            app.escape();
        }

        Event::Key(_) if is_enter_event(&event) => {
            app.cancel_quit();
            app.resume_editing();
        }

        Event::Key(_) if is_tab_event(&event) => {
            app.cancel_quit();
            app.next_field();
        }

        Event::Key(_) if is_next_range_event(&event) => {
            app.cancel_quit();
            app.shift_range(true);
        }

        Event::Key(_) if is_previous_range_event(&event) => {
            app.cancel_quit();
            app.shift_range(false);
        }

        Event::Key(_) if nav_key(&event).is_some() => {
            app.cancel_quit();
            match nav_key(&event) {
                Some('g') => app.go(Route::Home),
                Some('p') => app.go(Route::Portfolio),
                Some('t') => app.go(Route::Trade),
                Some('a') => app.toggle_auth(),
                Some('r') => app.go(Route::Register),
                _ => {}
            }
        }

        // Toute autre touche annule la confirmation de quit
        Event::Key(_) => app.cancel_quit(),

        Event::Mouse(_) => {
            if let Some((column, row)) = click_position(&event) {
                app.cancel_quit();
                app.pointer_down(column, row);
            } else if let Some((column, row)) = move_position(&event) {
                app.pointer_moved(column, row);
            }
        }

        Event::Resize(columns, rows) => {
            debug!(columns, rows, "Terminal resized");
            app.resized();
        }

        Event::Tick => {}
    }
}

/// Saisie dans le champ qui a le focus
fn handle_input_key(app: &mut App, event: &Event) {
    use lazyfolio::ui::events::{
        get_char_from_event, is_backspace_event, is_down_event, is_enter_event,
        is_escape_event, is_tab_event, is_up_event,
    };

    if is_escape_event(event) {
        app.escape();
    } else if is_enter_event(event) {
        app.enter();
    } else if is_tab_event(event) {
        app.next_field();
    } else if is_backspace_event(event) {
        app.backspace();
    } else if is_up_event(event) {
        app.up();
    } else if is_down_event(event) {
        app.down();
    } else if let Some(c) = get_char_from_event(event) {
        app.type_char(c);
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal : raw mode, écran alternatif, souris
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

/// Restaure le terminal dans son état d'origine
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
