//! Renders dialogue text as an animated retro RPG text box.
//!
//! Text is wrapped to the box ([`wrap`]), typed out one glyph per frame ([`typewriter`]),
//! scrolled a line at a time once a page is full ([`surface::RenderState::scroll`]) and
//! paced by blinking continue prompts ([`prompt`]). The resulting frames share one palette
//! derived from the background and are encoded as a looping GIF ([`encoding`]).

pub mod config;
pub mod encoding;
pub mod error;
pub mod font_assets;
pub mod frame;
pub mod palette;
pub mod prompt;
pub mod renderer;
pub mod schema;
pub mod surface;
pub mod theme;
pub mod typewriter;
pub mod wrap;

pub use error::{DialogueError, DialogueResult};
pub use renderer::{encode_gif, DialogueRenderer, RenderedDialogue};
pub use schema::{DialogueConfig, Layout, RenderOptions, Timing};
pub use theme::Theme;
pub use wrap::{wrap_dialogue, AnnotatedStream, Token};
