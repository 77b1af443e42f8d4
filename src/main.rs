use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use clap::{Parser, Subcommand};
use crossterm::cursor::SetCursorStyle;
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

mod app;
mod artifact_io;
mod candidate_source;
mod catalog;
mod composer;
mod config;
mod default_config;
mod error;
mod events;
mod lookup;
mod placeholder;
mod render;
mod sink;
mod suggestions;
mod text_layout;
mod theme;
mod token_codec;
mod trigger;
mod ui;

use app::App;
use candidate_source::CandidateSource;
use composer::{Composer, KeyOutcome};
use config::Config;
use events::AppEvent;
use placeholder::PlaceholderCycler;
use sink::JsonlSink;
use suggestions::SuggestionKey;
use theme::Theme;

const LOG_FILE_NAME: &str = "docmention.log";

/// Compose messages that reference documents with `@` mentions.
#[derive(Debug, Parser)]
#[command(name = "docmention", version)]
struct Cli {
    /// Config file; defaults to ~/.docmention/config.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "PATH", default_value = "theme.toml")]
    theme: PathBuf,
    /// JSON catalog of `{id, title, content}` documents.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "endpoint")]
    catalog: Option<PathBuf>,
    /// HTTP lookup service.
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,
    /// Append every submitted message to this JSONL file.
    #[arg(long, value_name = "PATH")]
    sink: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Print the candidates a query resolves to as a JSON array.
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Print the plain and mention segments of a composed text as JSON.
    Decode { text: String },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    match cli.command.as_ref() {
        Some(command) => {
            init_stderr_logging();
            println!("{}", command_output(&cli, command)?);
            Ok(())
        }
        None => {
            let log_path = cli
                .log_file
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME));
            init_file_logging(&log_path)?;
            run_interactive(&cli)
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .try_init();
}

// The TUI owns the terminal, so interactive runs log to a file.
fn init_file_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn load_config(cli: &Cli) -> io::Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).map_err(io::Error::other)?;
    if let Some(catalog) = cli.catalog.as_deref() {
        config.set_catalog(catalog);
    }
    if let Some(endpoint) = cli.endpoint.as_deref() {
        config.set_endpoint(endpoint);
    }
    Ok(config)
}

fn build_source(config: &Config) -> io::Result<CandidateSource> {
    let lookup = config.build_lookup().map_err(io::Error::other)?;
    Ok(CandidateSource::new(lookup).with_limit(config.lookup.limit))
}

fn command_output(cli: &Cli, command: &Command) -> io::Result<String> {
    match command {
        Command::Search { query } => {
            let config = load_config(cli)?;
            let source = build_source(&config)?.inline();
            let candidates = source.search(query);
            tracing::debug!(%query, count = candidates.len(), "search finished");
            serde_json::to_string_pretty(&candidates).map_err(io::Error::other)
        }
        Command::Decode { text } => {
            serde_json::to_string_pretty(&token_codec::decode(text)).map_err(io::Error::other)
        }
    }
}

fn build_app(cli: &Cli, config: &Config) -> io::Result<App> {
    let mut composer =
        Composer::new(build_source(config)?).with_scope(config.composer.trigger_scope);
    if let Some(path) = cli.sink.as_ref() {
        let sink = JsonlSink::new(path.clone());
        tracing::info!(path = %sink.path().display(), "forwarding messages to sink");
        composer = composer.with_sink(Box::new(sink));
    }
    let placeholder = PlaceholderCycler::new(
        config.composer.placeholders.clone(),
        config.placeholder_interval(),
    );
    Ok(App::new(composer, placeholder))
}

fn run_interactive(cli: &Cli) -> io::Result<()> {
    let config = load_config(cli)?;
    let app = build_app(cli, &config)?;
    let theme = Theme::load_or_default(&cli.theme);

    enable_raw_mode()?;
    let result = run_terminal(app, &theme);
    let restored = restore_terminal();
    result.and(restored)
}

fn run_terminal(app: App, theme: &Theme) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        SetCursorStyle::SteadyBar
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    run_app(&mut terminal, app, theme)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        SetCursorStyle::DefaultUserShape,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
) -> io::Result<()> {
    app.start(Instant::now());
    while app.running {
        app.poll_background();
        terminal.draw(|frame| ui::render(frame, &app, theme, Instant::now()))?;

        let event = events::next_event()?;
        let size = terminal.size()?;
        handle_event(&mut app, event, Rect::new(0, 0, size.width, size.height));
    }
    Ok(())
}

fn handle_event(app: &mut App, event: AppEvent, screen: Rect) {
    let width = ui::input_text_width(screen);
    match event {
        AppEvent::Tick => app.on_tick(),
        AppEvent::Quit => app.quit(),
        AppEvent::MoveUp => {
            if app.composer_mut().on_key(SuggestionKey::Up) == KeyOutcome::Ignored {
                app.composer_mut().move_caret_up(width);
            }
        }
        AppEvent::MoveDown => {
            if app.composer_mut().on_key(SuggestionKey::Down) == KeyOutcome::Ignored {
                app.composer_mut().move_caret_down(width);
            }
        }
        AppEvent::CursorLeft => app.composer_mut().move_caret_left(),
        AppEvent::CursorRight => app.composer_mut().move_caret_right(),
        AppEvent::CursorHome => app.composer_mut().set_caret(0),
        AppEvent::CursorEnd => app.composer_mut().set_caret(usize::MAX),
        AppEvent::ScrollLogUp | AppEvent::MouseScrollUp => {
            let max_scroll = ui::log_max_scroll(screen, app);
            app.scroll_log_up(max_scroll);
        }
        AppEvent::ScrollLogDown | AppEvent::MouseScrollDown => {
            let max_scroll = ui::log_max_scroll(screen, app);
            app.scroll_log_down(max_scroll);
        }
        AppEvent::InputChar(c) => app.composer_mut().insert_char(c),
        AppEvent::Backspace => app.composer_mut().backspace(),
        AppEvent::ClearInput => app.composer_mut().on_edit(String::new()),
        AppEvent::Submit => {
            if app.composer().is_suggesting() {
                app.composer_mut().on_key(SuggestionKey::Enter);
            } else {
                app.submit();
            }
        }
        AppEvent::Escape => {
            app.composer_mut().on_key(SuggestionKey::Escape);
        }
        AppEvent::MouseLeftClick(column, row) => {
            if let Some(index) = ui::suggestion_hit_test(screen, app, column, row) {
                app.composer_mut().click_candidate(index);
            } else if app.composer().controller().listens_for_outside_clicks()
                && !ui::popup_contains(screen, app, column, row)
            {
                app.composer_mut().on_outside_click();
            }
        }
        AppEvent::MouseMoved(column, row) => {
            if let Some(index) = ui::suggestion_hit_test(screen, app, column, row) {
                app.composer_mut().hover_candidate(index);
            }
        }
        AppEvent::FocusLost => app.composer_mut().on_blur(),
    }
}

#[cfg(test)]
#[path = "../tests/unit/main_launch_tests.rs"]
mod tests;
