//! Reference power level calibration.
//!
//! The G.711 reference tones are a 1 kHz sine coded at exactly 0 dBm0. A
//! compliant decoder must reproduce that level.

use g7xx::g711::G711Mode;
use tracing::info;

use crate::codec::LawCodec;
use crate::error::{ComplianceError, Result};
use crate::power_meter::PowerMeter;

/// One period of the A-law 0 dBm0 1 kHz reference tone.
pub const ALAW_1KHZ_SINE: [u8; 8] = [0x34, 0x21, 0x21, 0x34, 0xB4, 0xA1, 0xA1, 0xB4];

/// One period of the u-law 0 dBm0 1 kHz reference tone.
pub const ULAW_1KHZ_SINE: [u8; 8] = [0x1E, 0x0B, 0x0B, 0x1E, 0x9E, 0x8B, 0x8B, 0x9E];

/// Power meter damping used for calibration.
pub const REFERENCE_SHIFT: u32 = 7;

/// Samples decoded per tone (one second at 8 kHz).
pub const REFERENCE_SAMPLES: usize = 8000;

/// Order in which the tones are measured through one meter.
pub const TONE_ORDER: [G711Mode; 2] = [G711Mode::ULaw, G711Mode::ALaw];

/// Largest accepted deviation from 0 dBm0.
pub const LEVEL_TOLERANCE_DB: f32 = 0.1;

/// The reference tone period for a law.
pub fn reference_tone(law: G711Mode) -> &'static [u8; 8] {
    match law {
        G711Mode::ALaw => &ALAW_1KHZ_SINE,
        G711Mode::ULaw => &ULAW_1KHZ_SINE,
    }
}

/// Level measured for one decoded reference tone.
#[derive(Debug, Clone)]
pub struct ToneReading {
    pub law: G711Mode,
    pub level_dbm0: f32,
    pub decoded: Vec<i16>,
}

impl ToneReading {
    /// Fail unless the level is within [`LEVEL_TOLERANCE_DB`] of 0 dBm0.
    pub fn check(&self) -> Result<()> {
        if self.level_dbm0.abs() > LEVEL_TOLERANCE_DB {
            return Err(ComplianceError::ReferenceLevel {
                law: self.law,
                level_dbm0: self.level_dbm0,
                tolerance_db: LEVEL_TOLERANCE_DB,
            });
        }
        Ok(())
    }
}

/// Decodes reference tones into a single power meter.
#[derive(Debug, Clone)]
pub struct ReferencePowerCheck {
    meter: PowerMeter,
}

impl Default for ReferencePowerCheck {
    fn default() -> Self {
        Self::new(REFERENCE_SHIFT)
    }
}

impl ReferencePowerCheck {
    pub fn new(shift: u32) -> Self {
        Self {
            meter: PowerMeter::new(shift),
        }
    }

    /// Decode [`REFERENCE_SAMPLES`] of the `law` tone into the meter and
    /// read the resulting level, without judging it.
    pub fn decode_tone<C: LawCodec>(&mut self, codec: &C, law: G711Mode) -> ToneReading {
        let tone = reference_tone(law);
        let decoded: Vec<i16> = tone
            .iter()
            .cycle()
            .take(REFERENCE_SAMPLES)
            .map(|&code| codec.decode_one(law, code))
            .collect();
        for &amp in &decoded {
            self.meter.update(amp);
        }

        let level_dbm0 = self.meter.current_dbm0();
        info!("Reference {law} 1kHz tone is {level_dbm0:.6}dBm0");
        ToneReading {
            law,
            level_dbm0,
            decoded,
        }
    }

    /// Decode the `law` tone and check that it reads 0 dBm0.
    pub fn measure<C: LawCodec>(&mut self, codec: &C, law: G711Mode) -> Result<ToneReading> {
        let reading = self.decode_tone(codec, law);
        reading.check()?;
        Ok(reading)
    }

    pub fn meter(&self) -> &PowerMeter {
        &self.meter
    }
}

/// Measure the u-law and then the A-law reference tone through one meter.
pub fn reference_power_level<C: LawCodec>(codec: &C) -> Result<[ToneReading; 2]> {
    info!("Reference power level tests.");
    let mut check = ReferencePowerCheck::default();
    let [first, second] = TONE_ORDER;
    Ok([check.measure(codec, first)?, check.measure(codec, second)?])
}
