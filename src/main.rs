use clap::Parser;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, MouseButton, MouseEventKind};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::info;
use utmgrid::{
    storage, App, AppConfig, AppEvent, ArboardClipboard, Args, ConfigManager, Storage, APP_NAME,
};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(&mut *app, frame.area()))?;
    Ok(())
}

fn open_storage(config: &AppConfig) -> Result<Storage> {
    match &config.storage.data_dir {
        Some(dir) => Ok(Storage::new(dir)),
        None => Storage::for_app(APP_NAME),
    }
}

fn run(mut terminal: DefaultTerminal, config: &AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let storage = open_storage(config)?;
    let mut app = App::new(config, storage, Box::new(ArboardClipboard::new()))?;
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Mouse(mouse)
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) =>
                {
                    tx.send(AppEvent::Click(mouse.column, mouse.row))?
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        } else {
            tx.send(AppEvent::Tick)?;
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }

    app.flush();
    info!("exiting");
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        match manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error writing configuration: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.reset_rows || args.clear_saved {
        let mut config = AppConfig::load(APP_NAME)?;
        config.apply_args(args);
        let storage = open_storage(&config)?;
        if args.reset_rows {
            if let Err(e) = storage.remove(storage::ROWS_KEY) {
                eprintln!("Error removing rows: {}", e);
                std::process::exit(1);
            }
            println!("Grid rows cleared");
        }
        if args.clear_saved {
            if let Err(e) = storage.remove(storage::SAVED_KEY) {
                eprintln!("Error removing saved links: {}", e);
                std::process::exit(1);
            }
            println!("Saved links cleared");
        }
        return Ok(Some(()));
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let mut config = AppConfig::load(APP_NAME)?;
    config.apply_args(&args);
    let _log_guard = utmgrid::logging::init(APP_NAME, &config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = run(terminal, &config);
    crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
