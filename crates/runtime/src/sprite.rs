use serde::{Deserialize, Serialize};

use crate::math::{Rect, Vec2};
use crate::render::Pixmap;

/// One source rectangle on the sprite sheet plus how long it holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub src: Rect,
    pub duration: f32,
}

/// A named contiguous run of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub first_frame: usize,
    pub frame_count: usize,
}

/// Frames, named animations over them, and the draw pivot offset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sprite {
    frames: Vec<Frame>,
    animations: Vec<Animation>,
    origin: Vec2,
    #[serde(skip)]
    sheet: Pixmap,
}

impl Sprite {
    pub fn new(frames: Vec<Frame>, animations: Vec<Animation>, origin: Vec2) -> Self {
        Self {
            frames,
            animations,
            origin,
            sheet: Pixmap::default(),
        }
    }

    pub fn bind_sheet(&mut self, sheet: Pixmap) {
        self.sheet = sheet;
    }

    pub fn sheet(&self) -> &Pixmap {
        &self.sheet
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn animation(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }

    pub fn animation_named(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|anim| anim.name == name)
    }

    /// Sum of the frame durations in the animation's range. Frames
    /// referenced past the end of the frame list contribute nothing.
    pub fn total_duration(&self, animation: &Animation) -> f32 {
        self.animation_frames(animation)
            .iter()
            .map(|frame| frame.duration)
            .sum()
    }

    fn animation_frames(&self, animation: &Animation) -> &[Frame] {
        let start = animation.first_frame.min(self.frames.len());
        let end = (animation.first_frame + animation.frame_count).min(self.frames.len());
        &self.frames[start..end]
    }

    /// Resolves the frame shown at elapsed time `time`.
    ///
    /// Non-looping playback clamps at the last frame once the total
    /// duration is reached; looping playback wraps. Within a cycle
    /// the frames are walked in order, subtracting each duration
    /// until the remainder is used up. A fully zero-duration range
    /// resolves to its first frame.
    pub fn frame_at(&self, animation: &Animation, time: f32, looped: bool) -> Option<&Frame> {
        let frames = self.animation_frames(animation);
        let (first, last) = match (frames.first(), frames.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return None,
        };

        let total = self.total_duration(animation);
        if total <= 0.0 {
            return Some(first);
        }
        if !looped && time >= total {
            return Some(last);
        }

        let mut remaining = time.rem_euclid(total);
        for frame in frames {
            remaining -= frame.duration;
            if remaining <= 0.0 {
                return Some(frame);
            }
        }
        Some(first)
    }
}
