use crate::encoding::{AnimationSink, GifSink};
use crate::error::DialogueResult;
use crate::frame::Frame;
use crate::palette::Palette;
use crate::schema::{Layout, Timing};
use crate::theme::Theme;
use crate::typewriter::{RenderStats, Typewriter};
use crate::wrap::{wrap_dialogue, AnnotatedStream};

/// A finished, fully deterministic frame sequence.
#[derive(Debug, Clone)]
pub struct RenderedDialogue {
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
    pub frames: Vec<Frame>,
    pub stats: RenderStats,
}

impl RenderedDialogue {
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|frame| u64::from(frame.delay_ms)).sum()
    }
}

pub struct DialogueRenderer<'a> {
    theme: &'a Theme,
    layout: &'a Layout,
    timing: &'a Timing,
}

impl<'a> DialogueRenderer<'a> {
    pub fn new(theme: &'a Theme, layout: &'a Layout, timing: &'a Timing) -> Self {
        Self {
            theme,
            layout,
            timing,
        }
    }

    pub fn wrap(&self, text: &str) -> DialogueResult<AnnotatedStream> {
        wrap_dialogue(text, self.layout.line_budget(), self.theme.body.as_ref())
    }

    /// Wraps and types `text`. Any collaborator failure abandons the render.
    #[tracing::instrument(skip_all, fields(theme = %self.theme.name, chars = text.chars().count()))]
    pub fn render(&self, text: &str) -> DialogueResult<RenderedDialogue> {
        let stream = self.wrap(text)?;
        self.render_stream(&stream)
    }

    pub fn render_stream(&self, stream: &AnnotatedStream) -> DialogueResult<RenderedDialogue> {
        let typewriter = Typewriter::new(self.theme, self.layout, self.timing)?;
        let (palette, frames, stats) = typewriter.run(stream)?;

        tracing::info!(
            frames = frames.len(),
            glyphs = stats.glyph_frames,
            prompts = stats.prompts,
            scrolls = stats.scrolls,
            "rendered dialogue"
        );

        Ok(RenderedDialogue {
            width: self.layout.width,
            height: self.layout.height,
            palette,
            frames,
            stats,
        })
    }

    /// Renders `text` straight to GIF bytes.
    pub fn render_gif(&self, text: &str) -> DialogueResult<Vec<u8>> {
        let rendered = self.render(text)?;
        encode_gif(&rendered)
    }
}

pub fn encode_gif(rendered: &RenderedDialogue) -> DialogueResult<Vec<u8>> {
    let mut sink = GifSink::new(rendered.width, rendered.height, &rendered.palette)?;
    for frame in &rendered.frames {
        sink.write_frame(frame)?;
    }
    Box::new(sink).finish()
}
