use crate::palette::Palette;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    /// No directive; decoders leave the frame in place under the next one.
    #[default]
    Unspecified,
    /// Explicitly retained. Every later capture is drawn over the opening frame.
    Keep,
}

/// One captured raster, already mapped onto the render palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub indices: Vec<u8>,
    pub delay_ms: u32,
    pub disposal: Disposal,
}

/// Append-only log of captures, all sharing one palette.
#[derive(Debug)]
pub struct FrameRecorder {
    palette: Palette,
    width: u32,
    height: u32,
    frames: Vec<Frame>,
}

impl FrameRecorder {
    /// Derives the shared palette from `first` and records it as the opening frame.
    pub fn start(first: &Surface, max_colors: usize) -> Self {
        let rgba = first.rgba();
        let palette = Palette::derive(&rgba, max_colors);
        let indices = palette.index_pixels(&rgba);
        Self {
            palette,
            width: first.width(),
            height: first.height(),
            frames: vec![Frame {
                indices,
                delay_ms: 0,
                disposal: Disposal::Keep,
            }],
        }
    }

    pub fn capture(&mut self, surface: &Surface, delay_ms: u32) {
        debug_assert_eq!((surface.width(), surface.height()), (self.width, self.height));
        self.frames.push(Frame {
            indices: self.palette.index_pixels(&surface.rgba()),
            delay_ms,
            disposal: Disposal::Unspecified,
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn finish(self) -> (Palette, Vec<Frame>) {
        (self.palette, self.frames)
    }
}
