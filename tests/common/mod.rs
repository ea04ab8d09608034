#![allow(dead_code)]

use std::path::PathBuf;

use ebtext::font_assets::{FontFace, GlyphBitmap, Typeface};
use ebtext::surface::Surface;
use ebtext::theme::{Arrows, Theme};
use ebtext::{DialogueError, DialogueResult, RenderOptions};

pub const BACKGROUND: [u8; 4] = [16, 16, 48, 255];
pub const BORDER: [u8; 4] = [255, 255, 255, 255];
pub const GLYPH_ADVANCE: f32 = 16.0;
pub const SPACE_ADVANCE: f32 = 8.0;
/// Glyphs are solid 12x30 blocks starting 4 px below the line top.
pub const GLYPH_TOP: i32 = 4;
/// Characters the block face refuses to measure.
pub const UNSUPPORTED: char = '\u{2603}';

/// Deterministic stand-in for a font: every printable glyph is a solid block.
pub struct BlockFace {
    name: &'static str,
}

impl BlockFace {
    pub fn boxed(name: &'static str) -> Box<dyn Typeface> {
        Box::new(Self { name })
    }
}

impl Typeface for BlockFace {
    fn name(&self) -> &str {
        self.name
    }

    fn advance(&self, ch: char) -> DialogueResult<f32> {
        match ch {
            UNSUPPORTED => Err(DialogueError::measurement(self.name, ch)),
            ' ' => Ok(SPACE_ADVANCE),
            _ => Ok(GLYPH_ADVANCE),
        }
    }

    fn rasterize(&self, ch: char) -> DialogueResult<GlyphBitmap> {
        self.advance(ch)?;
        if ch == ' ' {
            return Ok(GlyphBitmap::empty());
        }
        let (width, height) = if ch == '•' { (8, 8) } else { (12, 30) };
        Ok(GlyphBitmap {
            left: 0,
            top: GLYPH_TOP,
            width,
            height,
            coverage: vec![255; width * height],
        })
    }
}

/// Bitstream Vera licensed monospace face checked in under `tests/fixtures/fonts`.
pub fn fixture_font_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts/DejaVuSansMono.ttf")
}

pub fn fixture_face(px: f32) -> FontFace {
    FontFace::from_path(&fixture_font_path(), px).expect("fixture font should load")
}

pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Surface {
    Surface::from_rgba(width, height, &color.repeat((width * height) as usize)).unwrap()
}

/// Dark box with a 4 px white border, sized to the default layout.
pub fn background(width: u32, height: u32) -> Surface {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let border = x < 4 || y < 4 || x >= width - 4 || y >= height - 4;
            rgba.extend_from_slice(if border { &BORDER } else { &BACKGROUND });
        }
    }
    Surface::from_rgba(width, height, &rgba).unwrap()
}

pub fn arrows() -> Arrows {
    Arrows {
        big: solid(24, 16, [255, 255, 255, 255]),
        small: solid(24, 16, [128, 128, 128, 255]),
        none: solid(24, 16, BACKGROUND),
    }
}

pub fn theme(options: &RenderOptions) -> Theme {
    Theme::from_parts(
        options,
        background(604, 256),
        arrows(),
        BlockFace::boxed("block-body"),
        BlockFace::boxed("block-marker"),
    )
}

pub fn plain_theme() -> Theme {
    theme(&RenderOptions::default())
}

pub const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Etiam sed justo arcu. Sed ut urna finibus ipsum volutpat malesuada. Suspendisse euismod metus vitae lectus pellentesque fermentum. Nulla facilisi. Sed vulputate ligula vel nisi ullamcorper, sit amet tempor mauris convallis.";

pub const MOM: &str = "What was that noise?\nNess, you don't seem scared. Are you nuts?\nAnd now you want to go check it out? ...oh ...okay.\nYou'll sneak out of your room anyway, even if I asked you not to.\nAt least change out of your jammies before you go.";
