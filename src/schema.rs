use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Deserialize;

pub const PLAIN_THEME: &str = "plain";
pub const MAX_PAGE_LINES: u8 = 3;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueConfig {
    #[serde(default)]
    pub options: RenderOptions,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub resources: ResourcePaths,
}

impl DialogueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.options.theme.trim().is_empty() {
            bail!("options.theme cannot be empty");
        }
        if self.options.theme.contains(['/', '\\']) || self.options.theme == ".." {
            bail!(
                "options.theme must be a bare directory name, got '{}'",
                self.options.theme
            );
        }
        self.layout.validate()?;
        self.timing.validate()?;
        Ok(())
    }
}

/// The two switches the renderer itself recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderOptions {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Selects the alternate body font and its compensating baseline offsets.
    #[serde(default)]
    pub saturn: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            saturn: false,
        }
    }
}

impl RenderOptions {
    pub fn text_color(&self) -> [u8; 3] {
        if self.theme == PLAIN_THEME {
            [255, 255, 255]
        } else {
            [247, 246, 195]
        }
    }
}

fn default_theme() -> String {
    PLAIN_THEME.to_owned()
}

/// Box geometry in pixels. Defaults match the 604x256 dialogue bitmaps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub line_height: u32,
    pub body_font_px: f32,
    pub marker_font_px: f32,
    pub marker_glyph: char,
    pub marker_offset_x: i32,
    /// Extra drop of the text baseline when the alternate font is active.
    pub saturn_text_offset: i32,
    /// How far the speaker marker is lifted back up when the alternate font is active.
    pub saturn_marker_lift: i32,
    pub arrow_inset_x: u32,
    pub arrow_inset_y: u32,
    pub max_colors: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 604,
            height: 256,
            margin_left: 56,
            margin_right: 48,
            margin_top: 34,
            line_height: 64,
            body_font_px: 42.0,
            marker_font_px: 42.0,
            marker_glyph: '•',
            marker_offset_x: 26,
            saturn_text_offset: 8,
            saturn_marker_lift: 4,
            arrow_inset_x: 64,
            arrow_inset_y: 32,
            max_colors: 16,
        }
    }
}

impl Layout {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "layout size must be positive, got {}x{}",
                self.width,
                self.height
            );
        }
        if self.line_height == 0 {
            bail!("layout.line_height must be > 0");
        }
        if self.margin_left + self.margin_right >= self.width {
            bail!(
                "layout margins ({} + {}) leave no room for text in a {} px box",
                self.margin_left,
                self.margin_right,
                self.width
            );
        }
        if self.scratch_height() > self.height {
            bail!(
                "layout.height {} cannot hold two {} px lines below a {} px top margin",
                self.height,
                self.line_height,
                self.margin_top
            );
        }
        if self.body_font_px <= 0.0 || self.marker_font_px <= 0.0 {
            bail!("font sizes must be > 0");
        }
        if self.arrow_inset_x > self.width || self.arrow_inset_y > self.height {
            bail!("arrow insets must lie inside the box");
        }
        if !(2..=256).contains(&self.max_colors) {
            bail!(
                "layout.max_colors must be within 2..=256, got {}",
                self.max_colors
            );
        }
        Ok(())
    }

    /// Pixel budget a visual line must stay strictly below.
    /// Zero when the margins swallow the box; `validate` rejects that for loaded configs.
    pub fn line_budget(&self) -> f32 {
        self.width
            .saturating_sub(self.margin_left)
            .saturating_sub(self.margin_right) as f32
    }

    pub fn scratch_height(&self) -> u32 {
        self.margin_top
            .saturating_add(self.line_height.saturating_mul(2))
    }

    pub fn first_line_y(&self, saturn: bool) -> i32 {
        let offset = if saturn { self.saturn_text_offset } else { 0 };
        (self.margin_top as i32).saturating_add(offset)
    }

    pub fn arrow_origin(&self) -> (i32, i32) {
        (
            self.width.saturating_sub(self.arrow_inset_x) as i32,
            self.height.saturating_sub(self.arrow_inset_y) as i32,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Timing {
    pub glyph_ms: u32,
    pub blink_ms: u32,
    pub settle_ms: u32,
    pub hold_ms: u32,
    pub blinks: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            glyph_ms: 20,
            blink_ms: 200,
            settle_ms: 0,
            hold_ms: 2000,
            blinks: 3,
        }
    }
}

impl Timing {
    pub fn validate(&self) -> Result<()> {
        if self.blinks == 0 {
            bail!("timing.blinks must be > 0");
        }
        // GIF delays are centiseconds stored in a u16.
        let limit = u32::from(u16::MAX) * 10;
        for (name, value) in [
            ("glyph_ms", self.glyph_ms),
            ("blink_ms", self.blink_ms),
            ("settle_ms", self.settle_ms),
            ("hold_ms", self.hold_ms),
        ] {
            if value > limit {
                bail!("timing.{name} must be <= {limit}, got {value}");
            }
        }
        Ok(())
    }

    pub fn frames_per_prompt(&self) -> usize {
        self.blinks as usize * 2 + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ResourcePaths {
    pub root: PathBuf,
    pub dialogue_font: String,
    pub saturn_font: String,
    pub background: String,
    pub arrow_big: String,
    pub arrow_small: String,
    pub arrow_none: String,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("res"),
            dialogue_font: "dialogue.otf".to_owned(),
            saturn_font: "saturn.ttf".to_owned(),
            background: "dialog.png".to_owned(),
            arrow_big: "arrowbig.png".to_owned(),
            arrow_small: "arrowsm.png".to_owned(),
            arrow_none: "arrownone.png".to_owned(),
        }
    }
}
