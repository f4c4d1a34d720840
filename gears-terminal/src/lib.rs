/// Terminal host for the gears demo
///
/// Owns the terminal surface, translates crossterm input into window and
/// view changes, and drives one `Scene` frame per loop iteration.
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use gears_core::{FpsCounter, FpsReport, FrameTimer, Scene};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;
pub mod window;

pub use config::{ColorDepth, Config, Options};
pub use renderer::{AsciiRenderer, Frame};
pub use window::{Button, Geometry, PointerState, Window};

/// Frame pacing when syncing to the terminal
const TARGET_FRAME_TIME: Duration = Duration::from_micros(1_000_000 / 60);

fn enter_screen<W: Write>(out: &mut W) -> Result<()> {
    execute!(
        out,
        terminal::EnterAlternateScreen,
        EnableMouseCapture,
        cursor::Hide
    )
    .context("entering alternate screen")
}

/// Undo `enter_screen` and raw mode. Both steps always run; the first
/// failure is the one reported.
fn restore_terminal<W, F>(out: &mut W, disable_raw_mode: F) -> Result<()>
where
    W: Write,
    F: FnOnce() -> io::Result<()>,
{
    let screen = execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    )
    .context("leaving alternate screen");
    let raw = disable_raw_mode().context("disabling raw mode");
    screen.and(raw)
}

/// Main application struct for terminal gear rendering
pub struct TerminalApp {
    config: Config,
    scene: Scene,
    window: Window,
    pointer: PointerState,
    renderer: AsciiRenderer,
    timer: FrameTimer,
    fps: FpsCounter,
    last_report: Option<FpsReport>,
    started: Instant,
    running: bool,
}

impl TerminalApp {
    pub fn new(config: Config) -> Result<Self> {
        let (cols, rows) = terminal::size().context("querying terminal size")?;

        let mut window = Window::new(cols, rows);
        if config.fullscreen {
            window.set_fullscreen(true);
        }
        let scene = Scene::new(window.geometry.width, window.geometry.height)
            .context("building gears")?;
        let renderer = AsciiRenderer::new(
            cols as usize,
            rows as usize,
            config.color_depth,
            config.opaque,
        );

        let mut app = Self {
            config,
            scene,
            window,
            pointer: PointerState::new(),
            renderer,
            timer: FrameTimer::new(),
            fps: FpsCounter::new(),
            last_report: None,
            started: Instant::now(),
            running: true,
        };
        app.update_viewport();
        Ok(app)
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("enabling raw mode")?;

        let result = enter_screen(&mut stdout()).and_then(|()| self.main_loop());
        let restored = restore_terminal(&mut stdout(), terminal::disable_raw_mode);

        log::info!("gears exiting");
        result.and(restored)
    }

    /// The most recent frame-rate report, if any interval has completed.
    pub fn last_report(&self) -> Option<FpsReport> {
        self.last_report
    }

    fn main_loop(&mut self) -> Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::ZERO)? {
                self.handle_event(event::read()?);
            }
            if !self.running {
                break;
            }

            if !self.config.delay.is_zero() {
                std::thread::sleep(self.config.delay);
            }

            // Update
            let now = self.started.elapsed().as_secs_f64();
            let dt = self.timer.tick(now);
            self.scene.update(dt);

            // Render
            self.render()?;

            if let Some(report) = self.fps.frame(now) {
                log::info!("{}", report);
                self.last_report = Some(report);
            }

            // Frame timing
            if self.config.frame_sync {
                let elapsed = frame_start.elapsed();
                if elapsed < TARGET_FRAME_TIME {
                    std::thread::sleep(TARGET_FRAME_TIME - elapsed);
                }
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => {
                self.renderer.resize(cols as usize, rows as usize);
                self.window.terminal_resized(cols, rows);
                self.update_viewport();
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::F(11) | KeyCode::Char('f') => {
                self.window.toggle_fullscreen();
                self.update_viewport();
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let (col, row) = (column as i32, row as i32);
        let button = |button: MouseButton| match button {
            MouseButton::Left => Some(Button::Left),
            MouseButton::Right => Some(Button::Right),
            MouseButton::Middle => None,
        };

        match kind {
            MouseEventKind::Down(b) | MouseEventKind::Up(b) => {
                if let Some(b) = button(b) {
                    let pressed = matches!(kind, MouseEventKind::Down(_));
                    self.pointer.button(b, pressed, col, row, &self.window);
                }
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let moving = self.pointer.is_moving();
                if let Some((dx, dy)) = self.pointer.motion(col, row, &mut self.window) {
                    self.scene.view.drag(dx, dy);
                }
                if moving {
                    self.update_viewport();
                }
            }
            _ => {}
        }
    }

    /// Push the window's geometry into the camera and the renderer.
    fn update_viewport(&mut self) {
        let geometry = self.window.geometry;
        self.scene.resize(geometry.width, geometry.height);

        let frame = (!self.window.fullscreen).then(|| Frame {
            rect: self.window.frame(),
            title: window::TITLE.to_string(),
        });
        self.renderer.set_viewport(self.window.content(), frame);
    }

    fn render(&mut self) -> Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render gears
        self.scene.draw(&mut self.renderer);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let fps = self
            .last_report
            .map(|report| report.to_string())
            .unwrap_or_else(|| format!("{} frames", self.fps.frames()));
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Gears | {} | Controls: right-drag=rotate left-drag=move F11/f=fullscreen Esc/q=quit",
                fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_restore_leaves_alternate_screen() {
        let mut out = Vec::new();
        restore_terminal(&mut out, || Ok(())).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1049l"));
        assert!(written.contains("\x1b[?25h"));
    }

    #[test]
    fn test_restore_disables_raw_mode_after_screen_failure() {
        let mut raw_disabled = false;
        let result = restore_terminal(&mut BrokenPipe, || {
            raw_disabled = true;
            Ok(())
        });
        assert!(raw_disabled);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "leaving alternate screen");
    }

    #[test]
    fn test_restore_reports_raw_mode_failure() {
        let result = restore_terminal(&mut Vec::new(), || {
            Err(io::Error::new(io::ErrorKind::Other, "no tty"))
        });
        assert_eq!(result.unwrap_err().to_string(), "disabling raw mode");
    }

    #[test]
    fn test_enter_screen_reports_write_failure() {
        let err = enter_screen(&mut BrokenPipe).unwrap_err();
        assert_eq!(err.to_string(), "entering alternate screen");
    }
}
