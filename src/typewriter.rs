use crate::error::DialogueResult;
use crate::frame::{Frame, FrameRecorder};
use crate::palette::Palette;
use crate::prompt::play_continue_prompt;
use crate::schema::{Layout, Timing, MAX_PAGE_LINES};
use crate::surface::RenderState;
use crate::theme::Theme;
use crate::wrap::{AnnotatedStream, Token};

/// Whether the next speaker marker has to wait behind a continue prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing typed yet.
    AwaitingFirstGlyph,
    /// A speaker is talking; the next speaker gets a prompt first.
    MidPage,
    /// A prompt was just played at a page overflow; the next speaker starts right away.
    JustTransitioned,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub glyph_frames: usize,
    pub prompts: usize,
    pub scrolls: usize,
    /// 1-based ordinals of the line breaks that triggered each scroll.
    pub scroll_breaks: Vec<usize>,
    pub line_breaks: usize,
}

/// Walks an annotated stream and records one frame per typed glyph, plus prompt and
/// hold frames, against a single render state.
pub struct Typewriter<'t> {
    theme: &'t Theme,
    layout: &'t Layout,
    timing: &'t Timing,
    state: RenderState,
    recorder: FrameRecorder,
    cursor: Cursor,
    lines_on_page: u8,
    phase: Phase,
    stats: RenderStats,
}

impl<'t> Typewriter<'t> {
    /// Draws the background, derives the palette from it and records the opening frame.
    pub fn new(theme: &'t Theme, layout: &'t Layout, timing: &'t Timing) -> DialogueResult<Self> {
        let mut state = RenderState::new(layout)?;
        state.composite.draw(&theme.background, 0, 0);
        let recorder = FrameRecorder::start(&state.composite, layout.max_colors);
        // From here on each capture only carries what changed since the previous one.
        state.composite.clear();

        Ok(Self {
            theme,
            layout,
            timing,
            state,
            recorder,
            cursor: Cursor {
                x: layout.margin_left as f32,
                y: layout.first_line_y(theme.saturn),
            },
            lines_on_page: 1,
            phase: Phase::AwaitingFirstGlyph,
            stats: RenderStats::default(),
        })
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn lines_on_page(&self) -> u8 {
        self.lines_on_page
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn frame_count(&self) -> usize {
        self.recorder.len()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Types the whole stream, then records the final hold frame.
    pub fn run(mut self, stream: &AnnotatedStream) -> DialogueResult<(Palette, Vec<Frame>, RenderStats)> {
        let tokens = stream.tokens();
        for (index, token) in tokens.iter().enumerate() {
            self.step(*token, tokens.get(index + 1).copied())?;
        }
        self.recorder.capture(&self.state.composite, self.timing.hold_ms);

        let (palette, frames) = self.recorder.finish();
        Ok((palette, frames, self.stats))
    }

    /// Applies one token; `next` is the token after it, if any.
    pub fn step(&mut self, token: Token, next: Option<Token>) -> DialogueResult<()> {
        match token {
            Token::LineBreak => {
                self.line_break(next);
                Ok(())
            }
            Token::SpeakerStart => self.speaker_start(),
            Token::Glyph(ch) => self.type_glyph(ch),
        }
    }

    fn line_break(&mut self, next: Option<Token>) {
        self.cursor.x = self.layout.margin_left as f32;
        self.cursor.y = self.cursor.y.saturating_add(self.layout.line_height as i32);
        self.stats.line_breaks += 1;

        if self.lines_on_page < MAX_PAGE_LINES {
            self.lines_on_page += 1;
            return;
        }

        // A fourth line is about to appear.
        if next == Some(Token::SpeakerStart) {
            self.continue_prompt();
            self.phase = Phase::JustTransitioned;
        }
        if next.is_none() {
            // Nothing left to type, so the page never needs to move.
            return;
        }

        self.state.scroll(&self.theme.background);
        self.cursor.y = self.cursor.y.saturating_sub(self.layout.line_height as i32);
        self.stats.scrolls += 1;
        self.stats.scroll_breaks.push(self.stats.line_breaks);
        tracing::debug!(line_break = self.stats.line_breaks, "scrolled page");
    }

    fn speaker_start(&mut self) -> DialogueResult<()> {
        if self.phase == Phase::MidPage {
            self.continue_prompt();
        }
        self.phase = Phase::MidPage;

        let glyph = self.theme.marker.rasterize(self.layout.marker_glyph)?;
        let lift = if self.theme.saturn {
            self.layout.saturn_marker_lift
        } else {
            0
        };
        let x = (self.cursor.x.round() as i32).saturating_sub(self.layout.marker_offset_x);
        let y = self.cursor.y.saturating_sub(lift);
        self.state.stamp(&glyph, x, y, self.theme.text_color);
        Ok(())
    }

    fn type_glyph(&mut self, ch: char) -> DialogueResult<()> {
        let glyph = self.theme.body.rasterize(ch)?;
        let advance = self.theme.body.advance(ch)?;
        let (x, y) = (self.cursor.x.round() as i32, self.cursor.y);

        self.state.stamp(&glyph, x, y, self.theme.text_color);
        self.recorder.capture(&self.state.composite, self.timing.glyph_ms);
        // The history keeps the glyph; the composite only needs it for this one frame.
        self.state.composite.clear();

        self.cursor.x += advance;
        self.stats.glyph_frames += 1;
        Ok(())
    }

    fn continue_prompt(&mut self) {
        play_continue_prompt(
            &mut self.state.composite,
            &self.theme.arrows,
            self.layout.arrow_origin(),
            self.timing,
            &mut self.recorder,
        );
        self.stats.prompts += 1;
        tracing::debug!(prompts = self.stats.prompts, "played continue prompt");
    }
}
