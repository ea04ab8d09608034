use std::borrow::Cow;

use gif::{DisposalMethod, Encoder, Repeat};

use crate::error::{DialogueError, DialogueResult};
use crate::frame::{Disposal, Frame};
use crate::palette::{Palette, TRANSPARENT_INDEX};

/// Receives indexed frames in strict call order and finalizes into one binary buffer.
pub trait AnimationSink {
    fn write_frame(&mut self, frame: &Frame) -> DialogueResult<()>;
    fn finish(self: Box<Self>) -> DialogueResult<Vec<u8>>;
}

/// Looping GIF with the render palette as its global color table.
pub struct GifSink {
    encoder: Encoder<Vec<u8>>,
    width: u16,
    height: u16,
    frames_written: usize,
}

impl GifSink {
    pub fn new(width: u32, height: u32, palette: &Palette) -> DialogueResult<Self> {
        let (width, height) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(width), Ok(height)) => (width, height),
            _ => {
                return Err(DialogueError::encode(format!(
                    "{width}x{height} exceeds the GIF size limit"
                )))
            }
        };
        let mut encoder = Encoder::new(Vec::new(), width, height, &palette.rgb_table())
            .map_err(DialogueError::encode)?;
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(DialogueError::encode)?;
        Ok(Self {
            encoder,
            width,
            height,
            frames_written: 0,
        })
    }
}

impl AnimationSink for GifSink {
    fn write_frame(&mut self, frame: &Frame) -> DialogueResult<()> {
        let expected = usize::from(self.width) * usize::from(self.height);
        if frame.indices.len() != expected {
            return Err(DialogueError::encode(format!(
                "frame {} has {} pixels, expected {}",
                self.frames_written,
                frame.indices.len(),
                expected
            )));
        }
        let gif_frame = gif::Frame {
            width: self.width,
            height: self.height,
            delay: delay_centiseconds(frame.delay_ms),
            dispose: match frame.disposal {
                Disposal::Unspecified => DisposalMethod::Any,
                Disposal::Keep => DisposalMethod::Keep,
            },
            transparent: Some(TRANSPARENT_INDEX),
            buffer: Cow::Borrowed(&frame.indices),
            ..gif::Frame::default()
        };
        self.encoder
            .write_frame(&gif_frame)
            .map_err(DialogueError::encode)?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> DialogueResult<Vec<u8>> {
        tracing::debug!(
            format = "gif",
            frames = self.frames_written,
            "finalizing animation"
        );
        self.encoder.into_inner().map_err(DialogueError::encode)
    }
}

/// GIF delays are centiseconds; milliseconds are rounded to the nearest one.
pub fn delay_centiseconds(delay_ms: u32) -> u16 {
    u16::try_from(delay_ms.saturating_add(5) / 10).unwrap_or(u16::MAX)
}
