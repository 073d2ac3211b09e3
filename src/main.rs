use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use taskflow::config::{Args, Config};
use taskflow::logging::init_logging;
use taskflow::storage::FileStore;
use taskflow::ui::run_app;
use taskflow::TaskBoard;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_args(Args::parse());
    let _logger = init_logging(config.log_level, &config.log_dir())?;

    let mut board = TaskBoard::open(FileStore::new(&config.data_dir));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut board);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    board.close();

    if let Err(err) = result {
        log::error!("event=app_exit status=error error={err}");
        eprintln!("{:?}", err);
    }
    Ok(())
}
