use crate::error::DialogueResult;
use crate::font_assets::Typeface;

/// One element of the annotated stream the typewriter consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Glyph(char),
    LineBreak,
    SpeakerStart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedStream {
    tokens: Vec<Token>,
}

impl AnnotatedStream {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|token| matches!(token, Token::Glyph(_)))
            .count()
    }

    pub fn line_break_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|token| matches!(token, Token::LineBreak))
            .count()
    }

    /// The visual lines of the stream, in order, without markers.
    ///
    /// A speaker with no closing line break still shows up as one (possibly empty) line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut open = false;
        for token in &self.tokens {
            match token {
                Token::Glyph(ch) => {
                    current.push(*ch);
                    open = true;
                }
                Token::LineBreak => {
                    lines.push(std::mem::take(&mut current));
                    open = false;
                }
                Token::SpeakerStart => open = true,
            }
        }
        if open {
            lines.push(current);
        }
        lines
    }

    fn push_line(&mut self, line: &str) {
        self.tokens.extend(line.chars().map(Token::Glyph));
        self.tokens.push(Token::LineBreak);
    }
}

/// Breaks dialogue text into box-width visual lines.
///
/// Each hard line of `text` becomes one speaker paragraph: a `SpeakerStart`, its wrapped
/// lines each closed by a `LineBreak`. A line is kept only while `face.measure(line)` stays
/// strictly below `budget`; a single word wider than the budget gets a line of its own.
pub fn wrap_dialogue(text: &str, budget: f32, face: &dyn Typeface) -> DialogueResult<AnnotatedStream> {
    let mut stream = AnnotatedStream { tokens: Vec::new() };

    let text = text.trim_end_matches(['\n', '\r']);
    if text.is_empty() {
        stream.tokens.push(Token::SpeakerStart);
        return Ok(stream);
    }

    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        stream.tokens.push(Token::SpeakerStart);

        if face.measure(paragraph)? < budget {
            stream.push_line(paragraph);
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = format!("{current}{word}");
            // Leading separators alone never make a line.
            if current.trim_end_matches(' ').is_empty() || face.measure(&candidate)? < budget {
                current = candidate;
            } else {
                stream.push_line(current.strip_suffix(' ').unwrap_or(&current));
                current = word.to_owned();
            }
            current.push(' ');
        }
        stream.push_line(current.strip_suffix(' ').unwrap_or(&current));
    }

    Ok(stream)
}
