use crate::config::SpriteEdges;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// The machine's own pixels. Sprites are XORed in; nothing else lights a
/// pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = false);
    }

    /// None outside the screen
    pub fn is_lit(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// row-major snapshot for whoever presents the frame
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// XOR an 8-pixel-wide sprite in at (x, y); true if any lit pixel was
    /// switched off by the sprite
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8], edges: SpriteEdges) -> bool {
        // the origin always wraps; the edge mode decides what happens after it
        let x0 = x as usize % self.width;
        let y0 = y as usize % self.height;
        let mut collision = false;
        for (row, bits) in sprite.iter().enumerate() {
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let (px, py) = match edges {
                    SpriteEdges::Wrap => ((x0 + col) % self.width, (y0 + row) % self.height),
                    SpriteEdges::Clip => {
                        if x0 + col >= self.width || y0 + row >= self.height {
                            continue;
                        }
                        (x0 + col, y0 + row)
                    }
                };
                let p = &mut self.pixels[py * self.width + px];
                collision |= *p;
                *p ^= true;
            }
        }
        collision
    }
}

/// Display is used by the interpreter to present frames. It should abstract
/// the implementation details, so a variety of kinds of screen would work.
pub trait Display {
    /// present the current frame
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coords of every pixel in `frame` that is `lit`
    fn points_from_frame<'a>(
        &self,
        frame: &'a FrameBuffer,
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = frame.width();
        frame
            .pixels()
            .iter()
            .enumerate()
            .filter(move |(_, p)| **p == lit)
            .map(move |(n, _)| {
                (
                    (n % w) as f64,        // x
                    -1.0 * (n / w) as f64, // y
                )
            })
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(x, y),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        if frame.width() != self.resolution.0 || frame.height() != self.resolution.1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "MonoTermDisplay must have correct-sized frame to draw",
            ));
        }

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        let resolution = &self.resolution;
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &resolution.points_from_frame(frame, false).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.points_from_frame(frame, true).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; keeps the last frame presented
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Vec<bool>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = frame.pixels().to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLYPH_0: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    fn lit_count(fb: &FrameBuffer) -> usize {
        fb.pixels().iter().filter(|p| **p).count()
    }

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_points_from_frame() {
        let r = Resolution(64, 32);
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(3, 2, &[0x80], SpriteEdges::Wrap);
        let lit: Vec<_> = r.points_from_frame(&fb, true).collect();
        assert_eq!(lit, vec![(3.0, -2.0)]);
        assert_eq!(r.points_from_frame(&fb, false).count(), 64 * 32 - 1);
    }

    // FrameBuffer tests
    #[test]
    fn test_new_is_blank() {
        let fb = FrameBuffer::new(64, 32);
        assert_eq!(fb.pixels().len(), 2048);
        assert_eq!(lit_count(&fb), 0);
    }

    #[test]
    fn test_draw_glyph() {
        let mut fb = FrameBuffer::new(64, 32);
        assert!(!fb.draw_sprite(0, 0, &GLYPH_0, SpriteEdges::Wrap));
        for (y, row) in GLYPH_0.iter().enumerate() {
            for x in 0..8 {
                assert_eq!(fb.is_lit(x, y), Some(row & (0x80 >> x) != 0), "({}, {})", x, y);
            }
        }
        assert_eq!(lit_count(&fb), 14);
    }

    #[test]
    fn test_redraw_erases_and_collides() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(10, 7, &GLYPH_0, SpriteEdges::Wrap);
        assert!(fb.draw_sprite(10, 7, &GLYPH_0, SpriteEdges::Wrap));
        assert_eq!(lit_count(&fb), 0);
    }

    #[test]
    fn test_no_collision_lighting_pixels() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(0, 0, &[0xf0], SpriteEdges::Wrap);
        // touches only unlit pixels next door
        assert!(!fb.draw_sprite(4, 0, &[0xf0], SpriteEdges::Wrap));
        assert_eq!(lit_count(&fb), 8);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(0, 0, &[0xff; 15], SpriteEdges::Wrap);
        fb.clear();
        assert_eq!(lit_count(&fb), 0);
    }

    #[test]
    fn test_wrap_at_edges() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(62, 31, &[0xf0, 0xf0], SpriteEdges::Wrap);
        assert_eq!(fb.is_lit(62, 31), Some(true));
        assert_eq!(fb.is_lit(63, 31), Some(true));
        assert_eq!(fb.is_lit(0, 31), Some(true));
        assert_eq!(fb.is_lit(1, 31), Some(true));
        assert_eq!(fb.is_lit(62, 0), Some(true));
        assert_eq!(fb.is_lit(1, 0), Some(true));
        assert_eq!(lit_count(&fb), 8);
    }

    #[test]
    fn test_clip_at_edges() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(62, 31, &[0xf0, 0xf0], SpriteEdges::Clip);
        assert_eq!(fb.is_lit(62, 31), Some(true));
        assert_eq!(fb.is_lit(63, 31), Some(true));
        assert_eq!(fb.is_lit(0, 31), Some(false));
        assert_eq!(fb.is_lit(62, 0), Some(false));
        assert_eq!(lit_count(&fb), 2);
    }

    #[test]
    fn test_origin_wraps_when_clipping() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(64 + 5, 32 + 1, &[0x80], SpriteEdges::Clip);
        assert_eq!(fb.is_lit(5, 1), Some(true));
    }

    #[test]
    fn test_is_lit_outside_screen() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.draw_sprite(63, 31, &[0x80], SpriteEdges::Wrap);
        assert_eq!(fb.is_lit(63, 31), Some(true));
        assert_eq!(fb.is_lit(64, 31), None);
        assert_eq!(fb.is_lit(0, 32), None);
    }

    #[test]
    fn test_dummy_keeps_frame() -> Result<(), io::Error> {
        let mut fb = FrameBuffer::new(8, 2);
        fb.draw_sprite(0, 1, &[0x01], SpriteEdges::Wrap);
        let mut d = DummyDisplay::new();
        d.draw(&fb)?;
        assert_eq!(d.frames, 1);
        assert!(d.last[15]);
        Ok(())
    }
}
