/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use gears_core::{Camera, GearMesh, GearUniforms, RenderSink};
use std::io::Write;

use crate::config::ColorDepth;
use crate::window::Rect;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// A vertex after projection into viewport cells, with its lit color.
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    color: [f32; 3],
}

/// Window decoration drawn around the viewport.
#[derive(Debug, Clone)]
pub struct Frame {
    pub rect: Rect,
    pub title: String,
}

/// ASCII renderer that rasterizes gear strips into terminal cells
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    viewport: Rect,
    frame: Option<Frame>,
    color_depth: ColorDepth,
    opaque: bool,
    depth_buffer: Vec<f32>,
    color_buffer: Vec<[f32; 3]>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, color_depth: ColorDepth, opaque: bool) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            viewport: Rect {
                x: 0,
                y: 0,
                width: width as i32,
                height: height as i32,
            },
            frame: None,
            color_depth,
            opaque,
            depth_buffer: vec![f32::INFINITY; size],
            color_buffer: vec![[0.0; 3]; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.color_buffer = vec![[0.0; 3]; size];
        self.char_buffer = vec![' '; size];
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Cells that gear draws land in, and the decoration around them.
    pub fn set_viewport(&mut self, viewport: Rect, frame: Option<Frame>) {
        self.viewport = viewport;
        self.frame = frame;
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.color_buffer.fill([0.0; 3]);
        self.char_buffer.fill(' ');
    }

    /// Character at a buffer cell, `' '` where nothing was drawn.
    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        (col < self.width && row < self.height).then(|| self.char_buffer[row * self.width + col])
    }

    fn project(&self, vertex: &gears_core::Vertex, uniforms: &GearUniforms) -> Option<ScreenVertex> {
        let (x, y, depth) = Camera::project_to_screen(
            &vertex.position,
            &uniforms.model_view_projection,
            self.viewport.width as u32,
            self.viewport.height as u32,
        )?;
        let [r, g, b, _] = uniforms.shade(&vertex.normal);

        Some(ScreenVertex {
            x: x + self.viewport.x as f32,
            y: y + self.viewport.y as f32,
            depth,
            color: [r, g, b],
        })
    }

    fn rasterize_triangle(&mut self, v: [ScreenVertex; 3]) {
        let [v0, v1, v2] = v;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to the viewport and the screen
        let min_x = min_x.max(self.viewport.x).max(0);
        let max_x = max_x
            .min(self.viewport.x + self.viewport.width - 1)
            .min(self.width as i32 - 1);
        let min_y = min_y.max(self.viewport.y).max(0);
        let max_y = max_y
            .min(self.viewport.y + self.viewport.height - 1)
            .min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // Interpolate depth
                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                let mut color = [0.0; 3];
                for (c, out) in color.iter_mut().enumerate() {
                    *out = w0 * v0.color[c] + w1 * v1.color[c] + w2 * v2.color[c];
                }
                let brightness = color[0].max(color[1]).max(color[2]).clamp(0.0, 1.0);
                let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;

                self.depth_buffer[idx] = depth;
                self.color_buffer[idx] = color;
                self.char_buffer[idx] = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
            }
        }
    }

    fn frame_char(&self, col: i32, row: i32) -> Option<char> {
        let frame = self.frame.as_ref()?;
        let rect = frame.rect;
        if !rect.contains(col, row) {
            return None;
        }

        let (left, right) = (rect.x, rect.x + rect.width - 1);
        let (top, bottom) = (rect.y, rect.y + rect.height - 1);
        let c = match (col, row) {
            (c, r) if c == left && r == top => '┌',
            (c, r) if c == right && r == top => '┐',
            (c, r) if c == left && r == bottom => '└',
            (c, r) if c == right && r == bottom => '┘',
            (c, _) if c == left || c == right => '│',
            (_, r) if r == top => {
                // Title starts two cells after the corner
                let offset = (col - left - 2) as usize;
                frame.title.chars().nth(offset).filter(|_| col >= left + 2).unwrap_or('─')
            }
            (_, r) if r == bottom => '─',
            _ => return None,
        };
        Some(c)
    }

    fn color(&self, rgb: [f32; 3]) -> Color {
        match self.color_depth {
            ColorDepth::TrueColor => {
                let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
                Color::Rgb { r, g, b }
            }
            ColorDepth::Ansi16 => ansi16(rgb),
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<(Color, Color)> = None;

        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let (col, row) = (x as i32, y as i32);
                let idx = y * self.width + x;

                let background = if self.opaque && self.viewport.contains(col, row) {
                    Color::Black
                } else {
                    Color::Reset
                };
                let (c, foreground) = if let Some(c) = self.frame_char(col, row) {
                    (c, Color::Grey)
                } else if self.depth_buffer[idx].is_finite() {
                    (self.char_buffer[idx], self.color(self.color_buffer[idx]))
                } else {
                    (' ', Color::Reset)
                };

                if current != Some((foreground, background)) {
                    writer.queue(SetForegroundColor(foreground))?;
                    writer.queue(SetBackgroundColor(background))?;
                    current = Some((foreground, background));
                }
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderSink for AsciiRenderer {
    fn draw_gear(&mut self, mesh: &GearMesh, uniforms: &GearUniforms) {
        if self.viewport.width <= 0 || self.viewport.height <= 0 {
            return;
        }

        for triangle in mesh.triangles() {
            let [a, b, c] = &triangle.vertices;
            // Triangle is clipped when any corner is behind the eye
            let (Some(a), Some(b), Some(c)) = (
                self.project(a, uniforms),
                self.project(b, uniforms),
                self.project(c, uniforms),
            ) else {
                continue;
            };
            self.rasterize_triangle([a, b, c]);
        }
    }
}

/// Nearest of the 16 ANSI colors for a lit RGB value.
pub fn ansi16(rgb: [f32; 3]) -> Color {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    if max < 0.1 {
        return Color::Black;
    }

    let bright = max > 0.6;
    let [r, g, b] = rgb.map(|c| c >= max * 0.5);
    match (r, g, b, bright) {
        (true, false, false, true) => Color::Red,
        (true, false, false, false) => Color::DarkRed,
        (false, true, false, true) => Color::Green,
        (false, true, false, false) => Color::DarkGreen,
        (false, false, true, true) => Color::Blue,
        (false, false, true, false) => Color::DarkBlue,
        (true, true, false, true) => Color::Yellow,
        (true, true, false, false) => Color::DarkYellow,
        (false, true, true, true) => Color::Cyan,
        (false, true, true, false) => Color::DarkCyan,
        (true, false, true, true) => Color::Magenta,
        (true, false, true, false) => Color::DarkMagenta,
        (_, _, _, true) => Color::White,
        _ => Color::Grey,
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gears_core::Scene;

    fn drawn_cells(renderer: &AsciiRenderer) -> usize {
        let (width, height) = renderer.size();
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.cell(x, y) != Some(' '))
            .count()
    }

    #[test]
    fn test_barycentric_inside_and_outside() {
        let inside = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(inside.0 >= 0.0 && inside.1 >= 0.0 && inside.2 >= 0.0);

        let outside = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (5.0, 5.0)).unwrap();
        assert!(outside.0 < 0.0 || outside.1 < 0.0 || outside.2 < 0.0);

        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }

    #[test]
    fn test_scene_covers_viewport() {
        let scene = Scene::new(640, 640).unwrap();
        let mut renderer = AsciiRenderer::new(80, 40, ColorDepth::TrueColor, false);
        scene.draw(&mut renderer);

        let drawn = drawn_cells(&renderer);
        assert!(drawn > 200, "only {} cells drawn", drawn);
        assert!(drawn < 80 * 40);

        renderer.clear();
        assert_eq!(drawn_cells(&renderer), 0);
    }

    #[test]
    fn test_draws_stay_inside_viewport() {
        let scene = Scene::new(400, 400).unwrap();
        let mut renderer = AsciiRenderer::new(100, 40, ColorDepth::Ansi16, true);
        let viewport = Rect {
            x: 30,
            y: 5,
            width: 50,
            height: 25,
        };
        renderer.set_viewport(viewport, None);
        scene.draw(&mut renderer);

        assert!(drawn_cells(&renderer) > 0);
        for y in 0..40 {
            for x in 0..100 {
                if renderer.cell(x, y) != Some(' ') {
                    assert!(viewport.contains(x as i32, y as i32), "cell ({}, {}) outside", x, y);
                }
            }
        }
    }

    #[test]
    fn test_empty_viewport_draws_nothing() {
        let scene = Scene::new(400, 400).unwrap();
        let mut renderer = AsciiRenderer::new(20, 10, ColorDepth::TrueColor, false);
        renderer.set_viewport(Rect { x: 0, y: 0, width: 0, height: 0 }, None);
        scene.draw(&mut renderer);
        assert_eq!(drawn_cells(&renderer), 0);
    }

    #[test]
    fn test_frame_decoration() {
        let mut renderer = AsciiRenderer::new(20, 10, ColorDepth::TrueColor, false);
        let rect = Rect { x: 1, y: 1, width: 10, height: 5 };
        renderer.set_viewport(rect.inset(), Some(Frame { rect, title: "Gears".into() }));

        assert_eq!(renderer.frame_char(1, 1), Some('┌'));
        assert_eq!(renderer.frame_char(10, 5), Some('┘'));
        assert_eq!(renderer.frame_char(2, 1), Some('─'));
        assert_eq!(renderer.frame_char(3, 1), Some('G'));
        assert_eq!(renderer.frame_char(1, 3), Some('│'));
        assert_eq!(renderer.frame_char(4, 3), None);
        assert_eq!(renderer.frame_char(0, 0), None);
    }

    #[test]
    fn test_ansi16_palette() {
        assert_eq!(ansi16([0.96, 0.12, 0.0]), Color::Red);
        assert_eq!(ansi16([0.16, 0.02, 0.0]), Color::DarkRed);
        assert_eq!(ansi16([0.0, 0.96, 0.24]), Color::Green);
        assert_eq!(ansi16([0.24, 0.24, 1.2]), Color::Blue);
        assert_eq!(ansi16([0.0, 0.0, 0.0]), Color::Black);
    }

    #[test]
    fn test_draw_writes_every_row() {
        let scene = Scene::new(400, 400).unwrap();
        let mut renderer = AsciiRenderer::new(30, 12, ColorDepth::TrueColor, true);
        scene.draw(&mut renderer);

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        assert!(!out.is_empty());
    }
}
