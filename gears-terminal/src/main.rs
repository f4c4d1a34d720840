/// Gears Terminal Demo - Three Rotating Gears
///
/// Renders the classic red, green and blue gears in the terminal.
/// Controls:
///   - Right drag: Rotate the view
///   - Left drag on the window: Move the window
///   - F11 / F: Toggle fullscreen
///   - Q/ESC: Quit
use anyhow::Result;
use clap::Parser;
use gears_terminal::{Config, Options, TerminalApp};

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from(Options::parse());
    log::debug!("starting with {:?}", config);

    let mut app = TerminalApp::new(config)?;
    app.run()?;

    if let Some(report) = app.last_report() {
        println!("{}", report);
    }
    Ok(())
}
