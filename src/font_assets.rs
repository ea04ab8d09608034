use std::fs;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::{DialogueError, DialogueResult};

/// Coverage at or above this value is drawn fully; anything lower is dropped.
/// Text is drawn without anti-aliasing so glyph pixels stay inside the palette.
pub const COVERAGE_THRESHOLD: u8 = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Offset of the bitmap's left edge from the pen position.
    pub left: i32,
    /// Offset of the bitmap's top edge from the line top.
    pub top: i32,
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    pub fn empty() -> Self {
        Self {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
            coverage: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A sized font: the text-measurement and glyph-raster capability the renderer needs.
///
/// Wrapping and drawing both go through `advance`, so a line measured while wrapping is
/// exactly as wide as the glyphs later drawn for it.
pub trait Typeface {
    fn name(&self) -> &str;

    fn advance(&self, ch: char) -> DialogueResult<f32>;

    fn rasterize(&self, ch: char) -> DialogueResult<GlyphBitmap>;

    fn measure(&self, text: &str) -> DialogueResult<f32> {
        text.chars().try_fold(0.0, |width, ch| Ok(width + self.advance(ch)?))
    }
}

pub struct FontFace {
    name: String,
    font: Font,
    px: f32,
    ascent: f32,
}

impl FontFace {
    pub fn from_path(path: &Path, px: f32) -> DialogueResult<Self> {
        let bytes = fs::read(path).map_err(|error| DialogueError::resource("font", path, error))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, bytes, px)
            .map_err(|reason| DialogueError::resource("font", path, reason))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>, px: f32) -> Result<Self, String> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|error| format!("failed to parse font: {error}"))?;
        let ascent = font
            .horizontal_line_metrics(px)
            .map(|metrics| metrics.ascent)
            .unwrap_or(px);
        Ok(Self {
            name: name.into(),
            font,
            px,
            ascent,
        })
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    fn ensure_supported(&self, ch: char) -> DialogueResult<()> {
        if ch.is_whitespace() || self.font.lookup_glyph_index(ch) != 0 {
            Ok(())
        } else {
            Err(DialogueError::measurement(&self.name, ch))
        }
    }
}

impl Typeface for FontFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance(&self, ch: char) -> DialogueResult<f32> {
        self.ensure_supported(ch)?;
        Ok(self.font.metrics(ch, self.px).advance_width)
    }

    fn rasterize(&self, ch: char) -> DialogueResult<GlyphBitmap> {
        self.ensure_supported(ch)?;
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        if metrics.width == 0 || metrics.height == 0 {
            return Ok(GlyphBitmap::empty());
        }
        // fontdue reports ymin as the bitmap bottom relative to the baseline.
        let bottom = self.ascent - metrics.ymin as f32;
        Ok(GlyphBitmap {
            left: metrics.xmin,
            top: (bottom - metrics.height as f32).round() as i32,
            width: metrics.width,
            height: metrics.height,
            coverage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Typeface for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn advance(&self, ch: char) -> DialogueResult<f32> {
            if ch == '\u{fffd}' {
                return Err(DialogueError::measurement("fixed", ch));
            }
            Ok(if ch == ' ' { 4.0 } else { 10.0 })
        }

        fn rasterize(&self, _ch: char) -> DialogueResult<GlyphBitmap> {
            Ok(GlyphBitmap::empty())
        }
    }

    #[test]
    fn measure_sums_advances() {
        assert_eq!(Fixed.measure("ab c").unwrap(), 34.0);
        assert_eq!(Fixed.measure("").unwrap(), 0.0);
    }

    #[test]
    fn measure_propagates_first_failure() {
        let err = Fixed.measure("a\u{fffd}b").unwrap_err();
        assert!(matches!(err, DialogueError::Measurement { ch: '\u{fffd}', .. }));
    }

    #[test]
    fn missing_font_file_is_a_resource_failure() {
        let Err(err) = FontFace::from_path(Path::new("/nonexistent/dialogue.otf"), 42.0) else {
            panic!("expected missing font to fail");
        };
        assert_eq!(err.code(), crate::error::RESOURCE_LOAD_FAILURE);
    }

    #[test]
    fn garbage_bytes_do_not_parse_as_font() {
        assert!(FontFace::from_bytes("junk", b"not-a-real-font".to_vec(), 42.0).is_err());
    }
}
