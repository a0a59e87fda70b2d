//! Signal power meter.
//!
//! A single-pole IIR estimate of mean square amplitude, reported in dBm0 or
//! dBOv.

/// Power in dBm0 of a full scale 16-bit sine wave (3.14 dB for the G.711
/// digital milliwatt, plus 3.02 dB from peak to mean square).
pub const DBM0_MAX_POWER: f32 = 3.14 + 3.02;

/// Power in dBOv of a full scale 16-bit sine wave.
pub const DBOV_MAX_POWER: f32 = 0.0;

/// Reading reported for a meter that has seen no signal, in dB below full scale.
const SILENCE_DB: f32 = -96.329;

const FULL_SCALE_SQUARED: f32 = 32767.0 * 32767.0;

/// Largest damping shift; wider shifts overflow the 32-bit reading.
pub const MAX_SHIFT: u32 = 31;

/// Exponentially averaging power meter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerMeter {
    shift: u32,
    reading: i32,
}

impl PowerMeter {
    /// Create a new power meter.
    ///
    /// `shift` controls the damping factor of the IIR filter. Larger values
    /// give a slower (more smoothed) response. Values above [`MAX_SHIFT`]
    /// are clamped to it.
    pub fn new(shift: u32) -> Self {
        Self {
            shift: shift.min(MAX_SHIFT),
            reading: 0,
        }
    }

    /// Update the power meter with a single audio sample.
    ///
    /// Returns the current (raw) power meter reading.
    pub fn update(&mut self, amp: i16) -> i32 {
        let square = amp as i32 * amp as i32;
        self.reading += (square - self.reading) >> self.shift;
        self.reading
    }

    /// Get the current power meter reading (raw mean square value).
    pub fn current(&self) -> i32 {
        self.reading
    }

    /// Get the current power meter reading in dBm0.
    pub fn current_dbm0(&self) -> f32 {
        self.current_db() + DBM0_MAX_POWER
    }

    /// Get the current power meter reading in dBOv.
    pub fn current_dbov(&self) -> f32 {
        self.current_db() + DBOV_MAX_POWER
    }

    /// Change the damping factor, clamped to [`MAX_SHIFT`].
    pub fn set_damping(&mut self, shift: u32) {
        self.shift = shift.min(MAX_SHIFT);
    }

    /// The damping shift in use.
    pub fn shift(&self) -> u32 {
        self.shift
    }

    fn current_db(&self) -> f32 {
        if self.reading <= 0 {
            return SILENCE_DB;
        }
        10.0 * (self.reading as f32 / FULL_SCALE_SQUARED).log10()
    }
}

/// Convert a dBm0 level to the equivalent raw power meter reading.
pub fn level_dbm0(level: f32) -> i32 {
    level_db(level - DBM0_MAX_POWER)
}

/// Convert a dBOv level to the equivalent raw power meter reading.
pub fn level_dbov(level: f32) -> i32 {
    level_db(level - DBOV_MAX_POWER)
}

fn level_db(level: f32) -> i32 {
    let level = level.min(0.0);
    (10.0f32.powf(level / 10.0) * FULL_SCALE_SQUARED) as i32
}
