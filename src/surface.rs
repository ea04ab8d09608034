use tiny_skia::{Color, Pixmap, PixmapPaint, PremultipliedColorU8, Transform};

use crate::error::{DialogueError, DialogueResult};
use crate::font_assets::{GlyphBitmap, COVERAGE_THRESHOLD};
use crate::schema::Layout;

/// A fixed-size RGBA raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> DialogueResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(DialogueError::SurfaceAllocation { width, height })?;
        Ok(Self { pixmap })
    }

    /// Builds a surface from straight (non-premultiplied) RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> DialogueResult<Self> {
        let mut surface = Self::new(width, height)?;
        if rgba.len() != surface.pixmap.data().len() {
            return Err(DialogueError::SurfaceAllocation { width, height });
        }
        for (pixel, src) in surface.pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
            *pixel = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(surface)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Composites `src` over this surface with its top-left corner at `(x, y)`.
    pub fn draw(&mut self, src: &Surface, x: i32, y: i32) {
        self.pixmap.draw_pixmap(
            x,
            y,
            src.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Stamps a glyph at pen position `(x, y)`, where `y` is the top of the text line.
    pub fn draw_glyph(&mut self, glyph: &GlyphBitmap, x: i32, y: i32, color: [u8; 3]) {
        if glyph.is_empty() {
            return;
        }
        let width = self.width() as i32;
        let height = self.height() as i32;
        let ink = PremultipliedColorU8::from_rgba(color[0], color[1], color[2], 255)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
        let pixels = self.pixmap.pixels_mut();

        for row in 0..glyph.height {
            let py = y.saturating_add(glyph.top).saturating_add(row as i32);
            if py < 0 || py >= height {
                continue;
            }
            for col in 0..glyph.width {
                let px = x.saturating_add(glyph.left).saturating_add(col as i32);
                if px < 0 || px >= width {
                    continue;
                }
                if glyph.coverage[row * glyph.width + col] >= COVERAGE_THRESHOLD {
                    pixels[(py * width + px) as usize] = ink;
                }
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Straight RGBA bytes, row-major.
    pub fn rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect()
    }

    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|pixel| pixel.alpha() == 0)
    }
}

/// The three rasters a render mutates.
///
/// `composite` is what gets captured, `history` holds every glyph typed on the current
/// page at its page position, and `scratch` only ever holds the two surviving lines
/// in the middle of a scroll.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub composite: Surface,
    pub history: Surface,
    pub scratch: Surface,
    margin_top: i32,
    line_height: i32,
}

impl RenderState {
    pub fn new(layout: &Layout) -> DialogueResult<Self> {
        Ok(Self {
            composite: Surface::new(layout.width, layout.height)?,
            history: Surface::new(layout.width, layout.height)?,
            scratch: Surface::new(layout.width, layout.scratch_height())?,
            margin_top: layout.margin_top as i32,
            line_height: layout.line_height as i32,
        })
    }

    /// Draws a glyph onto both the composite and the page history.
    pub fn stamp(&mut self, glyph: &GlyphBitmap, x: i32, y: i32, color: [u8; 3]) {
        self.composite.draw_glyph(glyph, x, y, color);
        self.history.draw_glyph(glyph, x, y, color);
    }

    /// Drops the top page line and moves the other two up one slot.
    ///
    /// The composite ends up as background plus the shifted history, ready to be
    /// captured as a single frame.
    pub fn scroll(&mut self, background: &Surface) {
        self.composite.draw(background, 0, 0);
        self.scratch.clear();
        let lift = self.margin_top.saturating_add(self.line_height);
        self.scratch.draw(&self.history, 0, lift.saturating_neg());
        self.history.clear();
        self.history.draw(&self.scratch, 0, self.margin_top);
        self.composite.draw(&self.history, 0, 0);
    }

    pub fn scrolled(mut self, background: &Surface) -> Self {
        self.scroll(background);
        self
    }
}
