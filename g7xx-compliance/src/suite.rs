//! Compliance runner.
//!
//! Sequences the checks in a fixed order against one codec and optionally
//! records every decoded signal they produce to a WAV file.

use std::fmt;

use tracing::info;

use crate::accuracy::{AccuracyReport, conversion_accuracy};
use crate::audio::TelephonyWriter;
use crate::block::block_equivalence;
use crate::calibration::{ReferencePowerCheck, TONE_ORDER, ToneReading};
use crate::codec::LawCodec;
use crate::error::Result;
use crate::idempotence::cyclic_round_trip;
use crate::transcoding::cross_law_transcoding;

bitflags::bitflags! {
    /// Checks a [`ComplianceSuite`] runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Checks: u8 {
        /// Full-domain conversion accuracy sweep.
        const ACCURACY = 0x01;
        /// Cyclic round-trip repeatability.
        const IDEMPOTENCE = 0x02;
        /// 0 dBm0 reference tone levels.
        const REFERENCE_POWER = 0x04;
        /// Cross-law transcoding consistency.
        const TRANSCODING = 0x08;
        /// Block-mode equivalence.
        const BLOCK = 0x10;
    }
}

impl Default for Checks {
    fn default() -> Self {
        Checks::all()
    }
}

impl fmt::Display for Checks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// What a successful suite run measured.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub checks: Checks,
    pub accuracy: Option<AccuracyReport>,
    /// u-law then A-law reference tone readings.
    pub tones: Vec<ToneReading>,
    /// Samples verified by the block check.
    pub block_samples: Option<usize>,
    /// Samples appended to the audio log.
    pub logged_samples: u32,
}

/// Runs the selected checks, stopping at the first failure.
#[derive(Default)]
pub struct ComplianceSuite {
    checks: Checks,
    audio_log: Option<TelephonyWriter>,
}

impl ComplianceSuite {
    pub fn new(checks: Checks) -> Self {
        Self {
            checks,
            audio_log: None,
        }
    }

    /// Record the decoded accuracy sweeps and reference tones to `writer`.
    pub fn with_audio_log(mut self, writer: TelephonyWriter) -> Self {
        self.audio_log = Some(writer);
        self
    }

    pub fn checks(&self) -> Checks {
        self.checks
    }

    /// Run every selected check against `codec`.
    pub fn run<C: LawCodec>(mut self, codec: &C) -> Result<SuiteReport> {
        let mut report = SuiteReport {
            checks: self.checks,
            ..SuiteReport::default()
        };

        if self.checks.contains(Checks::ACCURACY) {
            let accuracy = conversion_accuracy(codec);
            self.log_audio(&accuracy.alaw.decoded)?;
            self.log_audio(&accuracy.ulaw.decoded)?;
            report.accuracy = Some(accuracy.into_result()?);
        }

        if self.checks.contains(Checks::IDEMPOTENCE) {
            cyclic_round_trip(codec)?;
        }

        if self.checks.contains(Checks::REFERENCE_POWER) {
            info!("Reference power level tests.");
            let mut check = ReferencePowerCheck::default();
            for law in TONE_ORDER {
                let reading = check.decode_tone(codec, law);
                self.log_audio(&reading.decoded)?;
                reading.check()?;
                report.tones.push(reading);
            }
        }

        if self.checks.contains(Checks::TRANSCODING) {
            cross_law_transcoding(codec)?;
        }

        if self.checks.contains(Checks::BLOCK) {
            report.block_samples = Some(block_equivalence(codec)?);
        }

        if let Some(writer) = self.audio_log.take() {
            report.logged_samples = writer.len();
            writer.close()?;
        }

        info!("Tests passed.");
        Ok(report)
    }

    fn log_audio(&mut self, samples: &[i16]) -> Result<()> {
        match self.audio_log.as_mut() {
            Some(writer) => writer.write_frame(samples),
            None => Ok(()),
        }
    }
}
