/// Window geometry and pointer state for the terminal surface
///
/// The terminal plays the compositor: the gears live in a movable window
/// rectangle that can be toggled fullscreen. Geometry is kept in logical
/// pixels; every terminal cell covers `CELL_WIDTH` x `CELL_HEIGHT` of them.
use std::fmt;

/// Logical pixels per terminal column
pub const CELL_WIDTH: u32 = 8;
/// Logical pixels per terminal row
pub const CELL_HEIGHT: u32 = 16;

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 400;

pub const TITLE: &str = "Terminal Gears";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Logical size of a block of terminal cells.
    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as u32 * CELL_WIDTH, rows as u32 * CELL_HEIGHT)
    }

    /// Cells needed to show this geometry, at least one in each direction.
    pub fn cells(&self) -> (i32, i32) {
        (
            (self.width / CELL_WIDTH).max(1) as i32,
            (self.height / CELL_HEIGHT).max(1) as i32,
        )
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// A rectangle of terminal cells; may extend past the terminal edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= self.x && col < self.x + self.width && row >= self.y && row < self.y + self.height
    }

    /// The rectangle shrunk by one cell on every side.
    pub fn inset(&self) -> Rect {
        Rect {
            x: self.x + 1,
            y: self.y + 1,
            width: (self.width - 2).max(0),
            height: (self.height - 2).max(0),
        }
    }
}

/// The gears window inside the terminal.
#[derive(Debug, Clone)]
pub struct Window {
    /// Current drawable size
    pub geometry: Geometry,
    /// Size restored when leaving fullscreen or maximized state
    pub window_size: Geometry,
    pub fullscreen: bool,
    pub maximized: bool,
    /// Top-left cell of the window frame
    position: (i32, i32),
    terminal: (u16, u16),
}

impl Window {
    /// A default-sized window centered in a terminal of `cols` x `rows`.
    pub fn new(cols: u16, rows: u16) -> Self {
        let geometry = Geometry::default();
        let (w, h) = geometry.cells();
        Self {
            geometry,
            window_size: geometry,
            fullscreen: false,
            maximized: false,
            position: (
                ((cols as i32 - w - 2) / 2).max(0),
                ((rows as i32 - h - 2) / 2).max(0),
            ),
            terminal: (cols, rows),
        }
    }

    /// Apply a configure event and return the geometry to render at.
    ///
    /// A positive size is adopted and, outside fullscreen/maximized states,
    /// remembered as the window size. A zero size restores the remembered
    /// window size unless the window is fullscreen or maximized.
    pub fn configure(&mut self, width: u32, height: u32, fullscreen: bool, maximized: bool) -> Geometry {
        self.fullscreen = fullscreen;
        self.maximized = maximized;

        if width > 0 && height > 0 {
            if !fullscreen && !maximized {
                self.window_size = Geometry::new(width, height);
            }
            self.geometry = Geometry::new(width, height);
        } else if !fullscreen && !maximized {
            self.geometry = self.window_size;
        }

        log::debug!(
            "configure {}x{} fullscreen={} maximized={} -> {}",
            width,
            height,
            fullscreen,
            maximized,
            self.geometry
        );
        self.geometry
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) -> Geometry {
        if fullscreen {
            let size = Geometry::from_cells(self.terminal.0, self.terminal.1);
            self.configure(size.width, size.height, true, false)
        } else {
            self.configure(0, 0, false, false)
        }
    }

    pub fn toggle_fullscreen(&mut self) -> Geometry {
        log::info!("fullscreen {}", if self.fullscreen { "off" } else { "on" });
        self.set_fullscreen(!self.fullscreen)
    }

    /// Track a terminal resize; a fullscreen window follows the terminal.
    pub fn terminal_resized(&mut self, cols: u16, rows: u16) -> Geometry {
        self.terminal = (cols, rows);
        if self.fullscreen {
            return self.set_fullscreen(true);
        }
        self.position = self.clamp_position(self.position);
        self.geometry
    }

    /// The window including its one-cell frame.
    pub fn frame(&self) -> Rect {
        let (w, h) = self.geometry.cells();
        if self.fullscreen {
            return Rect {
                x: 0,
                y: 0,
                width: w,
                height: h,
            };
        }
        Rect {
            x: self.position.0,
            y: self.position.1,
            width: w + 2,
            height: h + 2,
        }
    }

    /// Cells the gears are drawn into.
    pub fn content(&self) -> Rect {
        if self.fullscreen {
            self.frame()
        } else {
            self.frame().inset()
        }
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Move the frame's top-left cell, keeping part of the frame on screen.
    pub fn move_to(&mut self, col: i32, row: i32) {
        self.position = self.clamp_position((col, row));
    }

    fn clamp_position(&self, (col, row): (i32, i32)) -> (i32, i32) {
        let max_col = (self.terminal.0 as i32 - 1).max(0);
        let max_row = (self.terminal.1 as i32 - 1).max(0);
        (col.clamp(0, max_col), row.clamp(0, max_row))
    }
}

/// Pointer buttons tracked by [`PointerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// Drag bookkeeping for view rotation and window moves.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    rotate_drag: bool,
    /// Grab offset from the window origin while a move is in progress
    move_grab: Option<(i32, i32)>,
    last: (i32, i32),
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotate_drag
    }

    pub fn is_moving(&self) -> bool {
        self.move_grab.is_some()
    }

    /// Right button toggles rotate-drag; left press inside the window starts a move.
    pub fn button(&mut self, button: Button, pressed: bool, col: i32, row: i32, window: &Window) {
        match button {
            Button::Right => self.rotate_drag = pressed,
            Button::Left if pressed => {
                if !window.fullscreen && window.frame().contains(col, row) {
                    let (x, y) = window.position();
                    self.move_grab = Some((col - x, row - y));
                }
            }
            Button::Left => self.move_grab = None,
        }
        self.last = (col, row);
    }

    /// Pointer motion to `(col, row)`.
    ///
    /// Moves the window when a move is in progress and returns the drag
    /// delta in logical pixels when rotate-dragging.
    pub fn motion(&mut self, col: i32, row: i32, window: &mut Window) -> Option<(f32, f32)> {
        let (last_col, last_row) = self.last;
        self.last = (col, row);

        if let Some((grab_col, grab_row)) = self.move_grab {
            window.move_to(col - grab_col, row - grab_row);
        }

        if !self.rotate_drag {
            return None;
        }
        let dx = (col - last_col) * CELL_WIDTH as i32;
        let dy = (row - last_row) * CELL_HEIGHT as i32;
        Some((dx as f32, dy as f32))
    }
}
