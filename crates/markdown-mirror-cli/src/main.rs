mod app;
mod args;
mod highlight;
mod layout;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_mirror_config::Config;
use markdown_mirror_engine::{Lexer, PreviewRenderer, RuleTable};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::{
    env,
    fs::File,
    io::{Stdout, Write, stdout},
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use app::App;
use args::{Args, Mode};

/// Frame interval of the scroll animation.
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let mut argv = env::args();
    let program = argv
        .next()
        .unwrap_or_else(|| "markdown-mirror-cli".to_string());
    let args = match Args::parse(argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", args::usage(&program));
            process::exit(1);
        }
    };

    init_logging(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => Config::load_or_default(expand(path))?,
        None => load_or_create_config(&Config::config_path())?,
    };
    let rules = RuleTable::markdown(&config.rule_options())?;
    let file = expand(&args.file);

    match args.mode {
        Mode::Tokens => print_tokens(&file, &rules),
        Mode::Html => print_html(&file),
        Mode::Interactive => run_interactive(&file, &rules, &config),
    }
}

fn expand(path: &Path) -> PathBuf {
    Config::expand_path(path).unwrap_or_else(|| path.to_path_buf())
}

/// Loads the config at `path`, writing the defaults there on first run.
fn load_or_create_config(path: &Path) -> Result<Config> {
    if let Some(config) = Config::load_from_path(path)? {
        return Ok(config);
    }
    let config = Config::default();
    match config.save_to_path(path) {
        Ok(()) => log::info!("Created default config file at {}", path.display()),
        Err(e) => log::warn!("Failed to create default config file: {e}"),
    }
    Ok(config)
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder
            .target(env_logger::Target::Pipe(Box::new(file)))
            .filter_level(log::LevelFilter::Debug)
            .parse_default_env();
    }
    builder.init();
    Ok(())
}

fn read(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn print_tokens(file: &Path, rules: &RuleTable) -> Result<()> {
    let text = read(file)?;
    let mut out = stdout().lock();
    for token in Lexer::new(rules).tokenize(&text) {
        writeln!(out, "{token}")?;
    }
    Ok(())
}

fn print_html(file: &Path) -> Result<()> {
    let text = read(file)?;
    let mut out = stdout().lock();
    out.write_all(PreviewRenderer::new().render(&text).as_bytes())?;
    Ok(())
}

fn run_interactive(file: &Path, rules: &RuleTable, config: &Config) -> Result<()> {
    let mut app = App::open(file, rules, config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{err:?}");
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size()?;
        let (source, result) = ui::pane_areas(Rect::new(0, 0, size.width, size.height));
        app.set_areas(source, result);

        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(FRAME)? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    if app.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        app.tick();
    }
}
