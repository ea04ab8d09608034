use crate::frame::FrameRecorder;
use crate::schema::Timing;
use crate::surface::Surface;
use crate::theme::Arrows;

/// Blinks the continue arrow on the composite: big/small `timing.blinks` times, then the
/// empty tile with the settle delay so the arrow is gone before drawing resumes.
///
/// Only the composite is touched; the prompt never becomes part of the page history.
pub fn play_continue_prompt(
    composite: &mut Surface,
    arrows: &Arrows,
    origin: (i32, i32),
    timing: &Timing,
    recorder: &mut FrameRecorder,
) {
    let (x, y) = origin;
    for _ in 0..timing.blinks {
        composite.draw(&arrows.big, x, y);
        recorder.capture(composite, timing.blink_ms);
        composite.draw(&arrows.small, x, y);
        recorder.capture(composite, timing.blink_ms);
    }
    composite.draw(&arrows.none, x, y);
    recorder.capture(composite, timing.settle_ms);
}
