//! Amplitude-dependent error bounds for G.711 round trips.

use g7xx::g711::G711Mode;

/// Error bound applied to one decoded sample.
///
/// Above `small_signal_threshold` the error is judged relative to the input
/// magnitude; at or below it, as an absolute difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceBand {
    pub small_signal_threshold: i32,
    pub max_relative_error: f32,
    pub max_absolute_error: i32,
}

impl ToleranceBand {
    pub const ALAW: Self = Self {
        small_signal_threshold: 140,
        max_relative_error: 0.10,
        max_absolute_error: 15,
    };

    pub const ULAW: Self = Self {
        small_signal_threshold: 40,
        max_relative_error: 0.10,
        max_absolute_error: 4,
    };

    /// The band for a companding law.
    pub fn for_law(law: G711Mode) -> Self {
        match law {
            G711Mode::ALaw => Self::ALAW,
            G711Mode::ULaw => Self::ULAW,
        }
    }

    /// Measure `post` against the original `pre`.
    pub fn measure(&self, pre: i16, post: i16) -> Measurement {
        let magnitude = (pre as i32).abs();
        let error = (post as i32 - pre as i32).abs();
        if magnitude > self.small_signal_threshold {
            let relative = error as f32 / magnitude as f32;
            Measurement {
                within: relative <= self.max_relative_error,
                relative: Some(relative),
            }
        } else {
            Measurement {
                within: error <= self.max_absolute_error,
                relative: None,
            }
        }
    }
}

/// Outcome of checking one sample against a [`ToleranceBand`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Whether the sample satisfied its band.
    pub within: bool,
    /// Relative error, present only above the small-signal threshold.
    pub relative: Option<f32>,
}
