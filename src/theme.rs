use std::path::Path;

use image::ImageReader;

use crate::error::{DialogueError, DialogueResult};
use crate::font_assets::{FontFace, Typeface};
use crate::schema::{Layout, RenderOptions, ResourcePaths};
use crate::surface::Surface;

/// The three prompt arrow tiles.
#[derive(Debug, Clone)]
pub struct Arrows {
    pub big: Surface,
    pub small: Surface,
    pub none: Surface,
}

/// Everything loaded up front for one render: bitmaps, faces and ink color.
pub struct Theme {
    pub name: String,
    pub background: Surface,
    pub arrows: Arrows,
    /// Face used for the dialogue text (the alternate font when `saturn` is set).
    pub body: Box<dyn Typeface>,
    /// Face used for the speaker marker; always the primary dialogue font.
    pub marker: Box<dyn Typeface>,
    pub text_color: [u8; 3],
    pub saturn: bool,
}

impl std::fmt::Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme")
            .field("name", &self.name)
            .field("body", &self.body.name())
            .field("marker", &self.marker.name())
            .field("text_color", &self.text_color)
            .field("saturn", &self.saturn)
            .finish_non_exhaustive()
    }
}

impl Theme {
    /// Loads the themed bitmaps and fonts from `paths.root`.
    ///
    /// Nothing is rendered if any of them is missing or undecodable.
    pub fn load(paths: &ResourcePaths, options: &RenderOptions, layout: &Layout) -> DialogueResult<Self> {
        let theme_dir = paths.root.join(&options.theme);
        let background = load_bitmap(&theme_dir.join(&paths.background))?;
        let arrows = Arrows {
            big: load_bitmap(&theme_dir.join(&paths.arrow_big))?,
            small: load_bitmap(&theme_dir.join(&paths.arrow_small))?,
            none: load_bitmap(&theme_dir.join(&paths.arrow_none))?,
        };

        let dialogue_path = paths.root.join(&paths.dialogue_font);
        let marker = FontFace::from_path(&dialogue_path, layout.marker_font_px)?;
        let body = if options.saturn {
            FontFace::from_path(&paths.root.join(&paths.saturn_font), layout.body_font_px)?
        } else {
            FontFace::from_path(&dialogue_path, layout.body_font_px)?
        };

        tracing::debug!(
            theme = %options.theme,
            root = %paths.root.display(),
            saturn = options.saturn,
            "loaded theme resources"
        );

        Ok(Self {
            name: options.theme.clone(),
            background,
            arrows,
            body: Box::new(body),
            marker: Box::new(marker),
            text_color: options.text_color(),
            saturn: options.saturn,
        })
    }

    /// Assembles a theme from already-loaded parts.
    pub fn from_parts(
        options: &RenderOptions,
        background: Surface,
        arrows: Arrows,
        body: Box<dyn Typeface>,
        marker: Box<dyn Typeface>,
    ) -> Self {
        Self {
            name: options.theme.clone(),
            background,
            arrows,
            body,
            marker,
            text_color: options.text_color(),
            saturn: options.saturn,
        }
    }
}

pub fn load_bitmap(path: &Path) -> DialogueResult<Surface> {
    let image = ImageReader::open(path)
        .map_err(|error| DialogueError::resource("bitmap", path, error))?
        .with_guessed_format()
        .map_err(|error| DialogueError::resource("bitmap", path, error))?
        .decode()
        .map_err(|error| DialogueError::resource("bitmap", path, error))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Surface::from_rgba(width, height, image.as_raw())
}
