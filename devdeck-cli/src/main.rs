mod runner;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use devdeck_core::catalog::Catalog;
use devdeck_core::config::{ConfigError, DeckConfig};
use devdeck_core::dashboard::{Dashboard, DashboardEvent, Effect, InputKey};
use devdeck_core::runner::ActionRunner;

use runner::ShellRunner;
use ui::Theme;

#[derive(Parser)]
#[command(name = "devdeck")]
#[command(about = "Dashboard for the local dev environment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Init {
        #[arg(short, long)]
        force: bool,
    },
    Status {
        #[arg(long)]
        json: bool,
    },
    Tui,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { force }) => match run_init(force) {
            Ok(()) => return Ok(()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Status { json }) => return run_status(json).await,
        Some(Commands::Tui) | None => {
            // Fall through to TUI
        }
    }

    run_tui().await
}

/// Load the catalog from a discovered config file, falling back to the
/// compiled-in default when there is none
fn load_catalog() -> Catalog {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => return Catalog::builtin(),
    };

    match DeckConfig::discover(&cwd) {
        Ok((path, config)) => {
            eprintln!("Loaded catalog from: {}", path.display());
            config.to_catalog()
        }
        Err(ConfigError::NotFound { .. }) => Catalog::builtin(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Forward keyboard and resize events into the dashboard channel
fn spawn_input_reader(events: mpsc::Sender<DashboardEvent>) {
    tokio::spawn(async move {
        loop {
            if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                let mapped = match event::read() {
                    Ok(CEvent::Key(key)) => map_key(key).map(DashboardEvent::Key),
                    Ok(CEvent::Resize(width, height)) => {
                        Some(DashboardEvent::Resize { width, height })
                    }
                    _ => None,
                };
                if let Some(event) = mapped {
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Spinner heartbeat
fn spawn_ticker(events: mpsc::Sender<DashboardEvent>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(120));
        loop {
            interval.tick().await;
            if events.send(DashboardEvent::Tick).await.is_err() {
                break;
            }
        }
    });
}

fn map_key(key: KeyEvent) -> Option<InputKey> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputKey::Interrupt);
    }
    match key.code {
        KeyCode::Tab => Some(InputKey::Tab),
        KeyCode::Enter => Some(InputKey::Enter),
        KeyCode::Esc => Some(InputKey::Esc),
        KeyCode::Up => Some(InputKey::Up),
        KeyCode::Down => Some(InputKey::Down),
        KeyCode::PageUp => Some(InputKey::PageUp),
        KeyCode::PageDown => Some(InputKey::PageDown),
        KeyCode::Home => Some(InputKey::Home),
        KeyCode::End => Some(InputKey::End),
        KeyCode::Backspace => Some(InputKey::Backspace),
        KeyCode::Char(c) => Some(InputKey::Char(c)),
        _ => None,
    }
}

/// Hand one effect to the appropriate worker; false means stop the loop
fn dispatch(
    effect: Effect,
    app: &Dashboard,
    runner: &Arc<dyn ActionRunner>,
    events: &mpsc::Sender<DashboardEvent>,
) -> bool {
    match effect {
        Effect::Quit => false,
        Effect::RefreshStatus => {
            runner::spawn_status_refresh(runner.clone(), &app.catalog, events.clone());
            true
        }
        Effect::RunCommand { name, action } => {
            runner::spawn_command(runner.clone(), name, action, events.clone());
            true
        }
    }
}

async fn run_tui() -> io::Result<()> {
    let catalog = load_catalog();
    let runner: Arc<dyn ActionRunner> = Arc::new(ShellRunner::new());
    let theme = Theme::default();

    let (event_tx, event_rx) = mpsc::channel::<DashboardEvent>(100);
    spawn_input_reader(event_tx.clone());
    spawn_ticker(event_tx.clone());

    let (app, initial) = Dashboard::new(catalog);
    dispatch(initial, &app, &runner, &event_tx);

    let mut terminal = setup_terminal()?;
    let res = tui_loop(&mut terminal, app, event_rx, &runner, &event_tx, &theme).await;
    restore_terminal(terminal)?;
    res
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: Dashboard,
    mut events: mpsc::Receiver<DashboardEvent>,
    runner: &Arc<dyn ActionRunner>,
    event_tx: &mpsc::Sender<DashboardEvent>,
    theme: &Theme,
) -> io::Result<()> {
    // Crossterm only reports size changes, so seed the initial dimensions
    let size = terminal.size()?;
    app.handle(DashboardEvent::Resize {
        width: size.width,
        height: size.height,
    });

    loop {
        terminal.draw(|frame| ui::render(frame, &app, theme))?;

        let Some(event) = events.recv().await else {
            break;
        };
        if let Some(effect) = app.handle(event) {
            if !dispatch(effect, &app, runner, event_tx) {
                break;
            }
        }
    }
    Ok(())
}

/// One-shot status report without entering the TUI
async fn run_status(json: bool) -> io::Result<()> {
    let catalog = load_catalog();
    let runner = ShellRunner::new();

    let mut rows = Vec::with_capacity(catalog.services.len());
    for svc in &catalog.services {
        let status = runner.probe_status(&svc.probe).await;
        rows.push((svc, status));
    }

    if json {
        let entries: Vec<serde_json::Value> = rows
            .iter()
            .map(|(svc, status)| {
                serde_json::json!({
                    "name": svc.name,
                    "status": status.label(),
                    "category": svc.category.label(),
                    "port": svc.port,
                    "description": svc.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (svc, status) in &rows {
            let port = svc
                .port
                .map(|p| format!(" | Port: {}", p))
                .unwrap_or_default();
            println!(
                "{} {:24} {:8} {}{}",
                status.icon(),
                svc.name,
                status.label(),
                svc.description,
                port
            );
        }
    }

    Ok(())
}

/// Write a starter devdeck.yaml seeded from the compiled-in catalog
fn run_init(force: bool) -> Result<(), String> {
    let cwd =
        std::env::current_dir().map_err(|e| format!("Failed to get current directory: {}", e))?;

    let config_names = ["devdeck.yaml", "devdeck.yml", ".devdeck.yaml", ".devdeck.yml"];
    for name in &config_names {
        let path = cwd.join(name);
        if path.exists() {
            if !force {
                return Err(format!(
                    "Config file {} already exists. Use --force to overwrite.",
                    path.display()
                ));
            }
            println!("Overwriting existing config: {}", path.display());
        }
    }

    let starter = DeckConfig::starter();
    let body =
        serde_yaml::to_string(&starter).map_err(|e| format!("Failed to render config: {}", e))?;
    let yaml = format!("# devdeck catalog\n# Generated by `devdeck init`\n\n{}", body);

    let output_path = cwd.join("devdeck.yaml");
    std::fs::write(&output_path, yaml).map_err(|e| format!("Failed to write config: {}", e))?;

    println!("Created: {}\n", output_path.display());
    println!("Next steps:");
    println!("  1. Review and customize devdeck.yaml");
    println!("  2. Run `devdeck` to open the dashboard");

    Ok(())
}
