use std::path::Path;

use g7xx::g711::{G711Mode, G711State};
use g7xx_compliance::codec::{G711Session, LawCodec, Reference};
use g7xx_compliance::error::{ComplianceError, Result};

/// Generate a sine wave at the given frequency and sample rate.
fn sine_wave(freq_hz: f32, sample_rate: f32, num_samples: usize, amplitude: f32) -> Vec<i16> {
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            (amplitude * (2.0 * std::f32::consts::PI * freq_hz * t).sin()) as i16
        })
        .collect()
}

/// Write `samples` as a 16-bit WAV file with the given format.
fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Read every sample of a 16-bit WAV file.
fn read_wav(path: &Path) -> Vec<i16> {
    let mut reader = hound::WavReader::open(path).unwrap();
    reader.samples::<i16>().map(|s| s.unwrap()).collect()
}

/// Ways a deliberately broken codec can misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    /// Every decoded sample is halved.
    HalfDecode,
    /// A-law to u-law transcoding flips a segment bit.
    FlipTranscode,
    /// Block encode reports half the samples it was given.
    ShortBlockEncode,
    /// Block decode outputs silence.
    SilentBlockDecode,
}

/// The reference codec with one injected fault.
struct Faulty(Fault);

struct FaultySession {
    inner: G711State,
    fault: Fault,
}

impl LawCodec for Faulty {
    type Session = FaultySession;

    fn encode_one(&self, law: G711Mode, sample: i16) -> u8 {
        Reference.encode_one(law, sample)
    }

    fn decode_one(&self, law: G711Mode, code: u8) -> i16 {
        let linear = Reference.decode_one(law, code);
        match self.0 {
            Fault::HalfDecode => linear / 2,
            _ => linear,
        }
    }

    fn alaw_to_ulaw(&self, code: u8) -> u8 {
        let ulaw = Reference.alaw_to_ulaw(code);
        match self.0 {
            Fault::FlipTranscode => ulaw ^ 0x40,
            _ => ulaw,
        }
    }

    fn ulaw_to_alaw(&self, code: u8) -> u8 {
        Reference.ulaw_to_alaw(code)
    }

    fn session(&self, law: G711Mode) -> Result<FaultySession> {
        Ok(FaultySession {
            inner: G711State::new(law),
            fault: self.0,
        })
    }
}

impl G711Session for FaultySession {
    fn encode(&mut self, codes: &mut [u8], samples: &[i16]) -> usize {
        let len = self.inner.encode(codes, samples);
        match self.fault {
            Fault::ShortBlockEncode => len / 2,
            _ => len,
        }
    }

    fn decode(&mut self, samples: &mut [i16], codes: &[u8]) -> usize {
        let len = self.inner.decode(samples, codes);
        if self.fault == Fault::SilentBlockDecode {
            samples[..len].fill(0);
        }
        len
    }

    fn transcode(&mut self, out: &mut [u8], codes: &[u8]) -> usize {
        self.inner.transcode(out, codes)
    }
}

// =========================================================================
// Tolerance bands
// =========================================================================
mod tolerance {
    use g7xx_compliance::tolerance::*;

    use super::*;

    #[test]
    fn threshold_switches_to_relative_bound() {
        let band = ToleranceBand::ALAW;
        let at = band.measure(140, 155);
        assert!(at.within);
        assert_eq!(at.relative, None);

        let above = band.measure(141, 156);
        assert!(!above.within, "15/141 exceeds 10%");
        assert!(above.relative.unwrap() > 0.10);
    }

    #[test]
    fn ulaw_small_signal_bound_is_tighter() {
        let band = ToleranceBand::for_law(G711Mode::ULaw);
        assert!(band.measure(40, 44).within);
        assert!(!band.measure(40, 45).within);
        assert!(band.measure(-40, -36).within);
    }

    #[test]
    fn extremes_scenario_within_alaw_band() {
        let input = [-32768i16, 0, 32767];
        let mut state = G711State::new(G711Mode::ALaw);
        let mut codes = [0u8; 3];
        let mut decoded = [0i16; 3];
        assert_eq!(state.encode(&mut codes, &input), 3);
        assert_eq!(state.decode(&mut decoded, &codes), 3);

        let band = ToleranceBand::ALAW;
        for (&pre, &post) in input.iter().zip(&decoded) {
            assert!(band.measure(pre, post).within, "{pre} decoded as {post}");
        }
        assert!(((decoded[0] as i32 + 32768).abs() as f32) / 32768.0 <= 0.10);
        assert!(decoded[1].abs() <= 15);
    }

    proptest::proptest! {
        #[test]
        fn reference_round_trip_within_band(sample in proptest::prelude::any::<i16>()) {
            for law in [G711Mode::ALaw, G711Mode::ULaw] {
                let post = Reference.round_trip(law, sample);
                proptest::prop_assert!(ToleranceBand::for_law(law).measure(sample, post).within);
            }
        }
    }
}

// =========================================================================
// Conversion accuracy
// =========================================================================
mod accuracy {
    use g7xx_compliance::accuracy::*;

    use super::*;

    #[test]
    fn reference_passes_full_sweep() {
        let report = conversion_accuracy(&Reference);
        assert!(report.passed());
        assert_eq!(report.alaw.failures(), 0);
        assert_eq!(report.ulaw.failures(), 0);
        assert!(report.alaw.worst_percent() > 0.0 && report.alaw.worst_percent() < 10.0);
        assert!(report.ulaw.worst_percent() > 0.0 && report.ulaw.worst_percent() < 10.0);
        assert_eq!(report.alaw.decoded.len(), DOMAIN_SIZE);
        assert_eq!(report.ulaw.decoded.len(), DOMAIN_SIZE);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn decoded_sweep_is_in_domain_order() {
        let sweep = sweep_law(&Reference, G711Mode::ALaw);
        let domain = full_domain();
        assert_eq!(domain.first(), Some(&i16::MIN));
        assert_eq!(domain.last(), Some(&i16::MAX));
        assert_eq!(sweep.decoded[0], -32256);
        assert_eq!(sweep.decoded[DOMAIN_SIZE - 1], 32256);
        assert_eq!(sweep.decoded[32768], 8);
    }

    #[test]
    fn halved_decoder_fails_both_laws() {
        let report = conversion_accuracy(&Faulty(Fault::HalfDecode));
        assert!(!report.passed());
        assert!(report.alaw.failures() > 0);
        assert!(report.ulaw.failures() > 0);
        let failures = (report.alaw.failures(), report.ulaw.failures());
        match report.into_result() {
            Err(ComplianceError::ExcessiveError {
                alaw_failures,
                ulaw_failures,
            }) => assert_eq!((alaw_failures, ulaw_failures), failures),
            other => panic!("expected ExcessiveError, got {other:?}"),
        }
    }
}

// =========================================================================
// Round-trip idempotence
// =========================================================================
mod idempotence {
    use g7xx_compliance::idempotence::*;

    use super::*;

    #[test]
    fn reference_is_idempotent() {
        cyclic_round_trip(&Reference).unwrap();
    }

    #[test]
    fn halved_decoder_drifts() {
        match cyclic_round_trip(&Faulty(Fault::HalfDecode)) {
            Err(ComplianceError::RoundTripMismatch {
                law,
                pre,
                post,
                post_post,
            }) => {
                assert_eq!(law, G711Mode::ALaw);
                assert_eq!(pre, i16::MIN);
                assert_ne!(post, post_post);
            }
            other => panic!("expected RoundTripMismatch, got {other:?}"),
        }
    }
}

// =========================================================================
// Power meter
// =========================================================================
mod power_meter {
    use g7xx_compliance::power_meter::*;

    use super::*;

    #[test]
    fn silence_is_very_negative() {
        let mut meter = PowerMeter::new(6);
        for _ in 0..1000 {
            meter.update(0);
        }
        assert_eq!(meter.current(), 0);
        let dbm0 = meter.current_dbm0();
        assert!(dbm0 < -60.0, "silence should measure < -60 dBm0, got {dbm0}");
        assert!((meter.current_dbov() - (dbm0 - DBM0_MAX_POWER)).abs() < 1e-4);
    }

    #[test]
    fn sine_power_reasonable() {
        let mut meter = PowerMeter::new(6);
        for s in sine_wave(1000.0, 8000.0, 2000, 32000.0) {
            meter.update(s);
        }
        let dbm0 = meter.current_dbm0();
        assert!(
            dbm0 > -10.0 && dbm0 < 10.0,
            "full-scale sine should measure within -10..+10 dBm0, got {dbm0}"
        );
    }

    #[test]
    fn level_conversions() {
        let reading = level_dbm0(0.0);
        assert!(reading > 0);
        assert!(level_dbov(0.0) > reading);

        // A square wave has a mean square equal to its amplitude squared.
        let amp = (reading as f64).sqrt().round() as i16;
        let mut meter = PowerMeter::new(7);
        for i in 0..4000 {
            meter.update(if i % 2 == 0 { amp } else { -amp });
        }
        let dbm0 = meter.current_dbm0();
        assert!(dbm0.abs() < 0.1, "square wave at 0 dBm0 read {dbm0}");
    }

    #[test]
    fn oversized_shift_is_clamped() {
        let mut meter = PowerMeter::new(40);
        assert_eq!(meter.shift(), MAX_SHIFT);
        meter.set_damping(7);
        assert_eq!(meter.shift(), 7);
        meter.set_damping(32);
        assert_eq!(meter.shift(), MAX_SHIFT);
        for _ in 0..100 {
            meter.update(i16::MAX);
            meter.update(i16::MIN);
        }
        assert!(meter.current() >= 0);
    }

    #[test]
    fn damping_controls_response_speed() {
        let mut fast = PowerMeter::new(7);
        let mut slow = PowerMeter::new(7);
        slow.set_damping(10);
        for _ in 0..100 {
            fast.update(10000);
            slow.update(10000);
        }
        assert!(fast.current() > slow.current());
    }
}

// =========================================================================
// Reference power level
// =========================================================================
mod calibration {
    use g7xx_compliance::calibration::*;

    use super::*;

    #[test]
    fn reference_tones_read_zero_dbm0() {
        let [ulaw, alaw] = reference_power_level(&Reference).unwrap();
        assert_eq!(ulaw.law, G711Mode::ULaw);
        assert_eq!(alaw.law, G711Mode::ALaw);
        for reading in [&ulaw, &alaw] {
            assert!(
                reading.level_dbm0.abs() <= LEVEL_TOLERANCE_DB,
                "{} tone read {} dBm0",
                reading.law,
                reading.level_dbm0
            );
            assert_eq!(reading.decoded.len(), REFERENCE_SAMPLES);
        }
    }

    #[test]
    fn decoded_tone_repeats_every_eight_samples() {
        let mut check = ReferencePowerCheck::default();
        let reading = check.measure(&Reference, G711Mode::ALaw).unwrap();
        for (i, &s) in reading.decoded.iter().enumerate().skip(8) {
            assert_eq!(s, reading.decoded[i - 8]);
        }
        assert!(check.meter().current() > 0);
    }

    #[test]
    fn halved_decoder_is_six_db_low() {
        match reference_power_level(&Faulty(Fault::HalfDecode)) {
            Err(ComplianceError::ReferenceLevel {
                law, level_dbm0, ..
            }) => {
                assert_eq!(law, G711Mode::ULaw);
                assert!(level_dbm0 < -5.0 && level_dbm0 > -7.0, "{level_dbm0}");
            }
            other => panic!("expected ReferenceLevel, got {other:?}"),
        }
    }
}

// =========================================================================
// Cross-law transcoding
// =========================================================================
mod transcoding {
    use g7xx::g711::{alaw_to_ulaw, ulaw_to_alaw};
    use g7xx_compliance::error::TranscodeDirection;
    use g7xx_compliance::transcoding::*;

    use super::*;

    #[test]
    fn reference_transcodes_consistently() {
        cross_law_transcoding(&Reference).unwrap();
    }

    #[test]
    fn alaw_0x34_survives_round_trip() {
        assert_eq!(ulaw_to_alaw(alaw_to_ulaw(0x34)), 0x34);
    }

    #[test]
    fn alaw_distance_ignores_inversion_mask() {
        // 0x5A and 0x45 are adjacent magnitudes once the even bits are restored.
        assert_eq!(code_distance(G711Mode::ALaw, 0x5A, 0x45), 1);
        assert_eq!(code_distance(G711Mode::ALaw, 0x34, 0x34), 0);
        assert_eq!(code_distance(G711Mode::ULaw, 0x10, 0x11), 1);
        assert_eq!(code_distance(G711Mode::ULaw, 0x5A, 0x45), 21);
    }

    #[test]
    fn alaw_codes_moved_one_magnitude_step() {
        for (code, back) in [(0x1A, 0x05), (0x9A, 0x85)] {
            assert_eq!(ulaw_to_alaw(alaw_to_ulaw(code)), back);
            assert_eq!(code.abs_diff(back), 21);
            assert_eq!(code_distance(G711Mode::ALaw, code, back), 1);
        }
    }

    #[test]
    fn flipped_segment_is_caught() {
        match cross_law_transcoding(&Faulty(Fault::FlipTranscode)) {
            Err(ComplianceError::TranscodeMismatch {
                direction, code, ..
            }) => {
                assert_eq!(direction, TranscodeDirection::UlawAlawUlaw);
                assert_eq!(code, 0);
            }
            other => panic!("expected TranscodeMismatch, got {other:?}"),
        }
    }
}

// =========================================================================
// Block mode
// =========================================================================
mod block {
    use g7xx_compliance::block::*;
    use g7xx_compliance::error::BlockStage;

    use super::*;

    #[test]
    fn reference_block_chain_covers_domain() {
        assert_eq!(block_equivalence(&Reference).unwrap(), 65536);
    }

    #[test]
    fn short_encode_is_reported() {
        match block_equivalence(&Faulty(Fault::ShortBlockEncode)) {
            Err(ComplianceError::BlockLength {
                stage,
                actual,
                expected,
            }) => {
                assert_eq!(stage, BlockStage::Encode);
                assert_eq!(actual, 32768);
                assert_eq!(expected, 65536);
            }
            other => panic!("expected BlockLength, got {other:?}"),
        }
    }

    #[test]
    fn silent_decode_is_reported() {
        match block_equivalence(&Faulty(Fault::SilentBlockDecode)) {
            Err(ComplianceError::BlockAccuracy { pre, post }) => {
                assert_eq!(pre, i16::MIN);
                assert_eq!(post, 0);
            }
            other => panic!("expected BlockAccuracy, got {other:?}"),
        }
    }
}

// =========================================================================
// SNR accumulator
// =========================================================================
mod snr {
    use g7xx_compliance::snr::*;
    use proptest::prelude::*;

    #[test]
    fn constant_error_scenario() {
        let mut acc = SnrAccumulator::new();
        for _ in 0..3 {
            acc.update(100, 98);
        }
        assert_eq!(acc.samples(), 3);
        assert_eq!(acc.sum_input_sq(), 30000);
        assert_eq!(acc.sum_error_sq(), 12);
        let expected = 10.0 * 2500f64.log10();
        assert!((acc.finalize() - expected).abs() < 1e-9);
        assert!((acc.finalize() - 33.98).abs() < 0.01);
    }

    #[test]
    fn error_free_stream_is_infinite() {
        let mut acc = SnrAccumulator::new();
        assert_eq!(acc.finalize(), f64::INFINITY);
        acc.update_block(&[1, -2, 3], &[1, -2, 3]);
        assert_eq!(acc.finalize(), f64::INFINITY);
    }

    #[test]
    fn empty_accumulator_has_no_snr() {
        let mut acc = SnrAccumulator::new();
        assert_eq!(acc.try_finalize(), None);
        acc.update(100, 98);
        assert_eq!(acc.try_finalize(), Some(acc.finalize()));
    }

    #[test]
    fn silent_input_with_error_is_negative_infinity() {
        let mut acc = SnrAccumulator::new();
        acc.update(0, 5);
        assert_eq!(acc.finalize(), f64::NEG_INFINITY);
    }

    #[test]
    fn extreme_error_does_not_overflow() {
        let mut acc = SnrAccumulator::new();
        acc.update(i16::MIN, i16::MAX);
        assert_eq!(acc.sum_error_sq(), 65535u64 * 65535);
    }

    proptest! {
        #[test]
        fn block_update_matches_pairwise(
            pairs in proptest::collection::vec((any::<i16>(), any::<i16>()), 0..256)
        ) {
            let (inputs, outputs): (Vec<i16>, Vec<i16>) = pairs.iter().copied().unzip();
            let mut block = SnrAccumulator::new();
            block.update_block(&inputs, &outputs);
            let mut single = SnrAccumulator::new();
            for &(i, o) in &pairs {
                single.update(i, o);
            }
            prop_assert_eq!(&block, &single);
            prop_assert_eq!(block.samples(), pairs.len() as u64);
        }

        #[test]
        fn identical_streams_are_infinite(
            samples in proptest::collection::vec(any::<i16>(), 1..256)
        ) {
            let mut acc = SnrAccumulator::new();
            acc.update_block(&samples, &samples);
            prop_assert_eq!(acc.finalize(), f64::INFINITY);
        }
    }
}

// =========================================================================
// Audio files
// =========================================================================
mod audio {
    use g7xx_compliance::audio::*;

    use super::*;

    #[test]
    fn frames_round_trip_through_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples = sine_wave(1000.0, 8000.0, 500, 12000.0);

        let mut writer = TelephonyWriter::create(&path).unwrap();
        writer.write_frame(&samples).unwrap();
        assert_eq!(writer.len(), 500);
        writer.close().unwrap();

        let mut reader = TelephonyReader::open(&path).unwrap();
        assert_eq!(reader.len(), 500);
        let mut frame = [0i16; 160];
        let mut read = Vec::new();
        loop {
            let len = reader.read_frame(&mut frame).unwrap();
            if len == 0 {
                break;
            }
            read.extend_from_slice(&frame[..len]);
        }
        assert_eq!(read, samples);
    }

    #[test]
    fn wrong_sample_rate_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wideband.wav");
        write_wav(&path, &[0; 16], 16000, 1);
        match TelephonyReader::open(&path) {
            Err(ComplianceError::AudioFormat {
                what,
                actual,
                expected,
                ..
            }) => {
                assert_eq!(what, "sample rate");
                assert_eq!(actual, 16000);
                assert_eq!(expected, SAMPLE_RATE);
            }
            other => panic!("expected AudioFormat, got {:?}", other.err()),
        }
    }

    #[test]
    fn stereo_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, &[0; 16], 8000, 2);
        match TelephonyReader::open(&path) {
            Err(ComplianceError::AudioFormat { what, actual, .. }) => {
                assert_eq!(what, "number of channels");
                assert_eq!(actual, 2);
            }
            other => panic!("expected AudioFormat, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_file_is_an_audio_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TelephonyReader::open(dir.path().join("absent.wav")).err();
        assert!(matches!(err, Some(ComplianceError::Audio { .. })));
        assert_eq!(err.map(|e| e.exit_code()), Some(2));
    }

    #[test]
    fn raw_stream_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.raw");
        let data: Vec<u8> = (0..=255).collect();

        let mut writer = RawWriter::create(&path).unwrap();
        writer.write(&data[..100]).unwrap();
        writer.write(&data[100..]).unwrap();
        writer.close().unwrap();

        let mut reader = RawReader::open(&path).unwrap();
        let mut buf = [0u8; 160];
        assert_eq!(reader.read(&mut buf).unwrap(), 160);
        assert_eq!(&buf[..], &data[..160]);
        assert_eq!(reader.read(&mut buf).unwrap(), 96);
        assert_eq!(&buf[..96], &data[160..]);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}

// =========================================================================
// Compliance suite
// =========================================================================
mod suite {
    use g7xx_compliance::suite::*;

    use super::*;

    #[test]
    fn reference_passes_every_check() {
        let report = ComplianceSuite::new(Checks::all()).run(&Reference).unwrap();
        assert_eq!(report.checks, Checks::all());
        assert!(report.accuracy.is_some_and(|a| a.passed()));
        assert_eq!(report.tones.len(), 2);
        assert_eq!(report.block_samples, Some(65536));
        assert_eq!(report.logged_samples, 0);
    }

    #[test]
    fn audio_log_holds_sweeps_and_tones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g711log.wav");
        let writer = g7xx_compliance::audio::TelephonyWriter::create(&path).unwrap();
        let checks = Checks::ACCURACY | Checks::REFERENCE_POWER;
        let report = ComplianceSuite::new(checks)
            .with_audio_log(writer)
            .run(&Reference)
            .unwrap();
        assert_eq!(report.logged_samples, 65536 * 2 + 8000 * 2);
        assert_eq!(report.block_samples, None);

        let logged = read_wav(&path);
        assert_eq!(logged.len(), 65536 * 2 + 8000 * 2);
        assert_eq!(logged[0], -32256);
    }

    #[test]
    fn failing_tone_is_still_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tones.wav");
        let writer = g7xx_compliance::audio::TelephonyWriter::create(&path).unwrap();
        let err = ComplianceSuite::new(Checks::REFERENCE_POWER)
            .with_audio_log(writer)
            .run(&Faulty(Fault::HalfDecode))
            .unwrap_err();
        assert!(matches!(
            err,
            ComplianceError::ReferenceLevel {
                law: G711Mode::ULaw,
                ..
            }
        ));

        let logged = read_wav(&path);
        assert_eq!(logged.len(), 8000);
        let expected: Vec<i16> = g7xx_compliance::calibration::ULAW_1KHZ_SINE
            .iter()
            .map(|&code| Reference.decode_one(G711Mode::ULaw, code) / 2)
            .collect();
        assert_eq!(&logged[..8], &expected[..]);
    }

    #[test]
    fn skipped_checks_do_not_run() {
        let checks = Checks::all() - Checks::ACCURACY - Checks::BLOCK;
        let report = ComplianceSuite::new(checks).run(&Reference).unwrap();
        assert!(report.accuracy.is_none());
        assert!(report.block_samples.is_none());
        assert_eq!(report.tones.len(), 2);
    }

    #[test]
    fn first_failure_stops_the_run() {
        let err = ComplianceSuite::default()
            .run(&Faulty(Fault::HalfDecode))
            .unwrap_err();
        assert!(matches!(err, ComplianceError::ExcessiveError { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn checks_display() {
        assert_eq!(Checks::default(), Checks::all());
        let shown = (Checks::ACCURACY | Checks::BLOCK).to_string();
        assert!(shown.contains("ACCURACY"));
        assert!(shown.contains("BLOCK"));
    }
}

// =========================================================================
// File pipelines
// =========================================================================
mod pipeline {
    use g7xx::g726::{G726Packing, G726Rate};
    use g7xx_compliance::pipeline::*;

    use super::*;

    fn input_wav(dir: &Path) -> (std::path::PathBuf, Vec<i16>) {
        let path = dir.join("input.wav");
        let samples = sine_wave(1000.0, 8000.0, 1000, 8000.0);
        write_wav(&path, &samples, 8000, 1);
        (path, samples)
    }

    #[test]
    fn g711_encode_decode_measures_snr() {
        let dir = tempfile::tempdir().unwrap();
        let (input, _) = input_wav(dir.path());
        let output = dir.path().join("output.wav");

        for (law, min_snr) in [(G711Mode::ALaw, 30.0), (G711Mode::ULaw, 35.0)] {
            let summary = G711Pipeline::new(law).run(&Reference, &input, &output).unwrap();
            assert_eq!(summary.samples, 1000);
            assert_eq!(summary.frames, 7);
            let snr = summary.snr.unwrap();
            assert!(snr.is_finite() && snr > min_snr, "{law} SNR {snr}");
            assert_eq!(read_wav(&output).len(), 1000);
        }
    }

    #[test]
    fn g711_transcode_decodes_with_other_law() {
        let dir = tempfile::tempdir().unwrap();
        let (input, _) = input_wav(dir.path());
        let output = dir.path().join("output.wav");
        let pipeline = G711Pipeline {
            transcode: true,
            ..G711Pipeline::default()
        };
        assert_eq!(pipeline.decode_law(), G711Mode::ULaw);
        let summary = pipeline.run(&Reference, &input, &output).unwrap();
        assert_eq!(summary.samples, 1000);
        assert!(summary.snr.unwrap() > 30.0);
    }

    #[test]
    fn g711_split_encode_and_decode_match_combined() {
        let dir = tempfile::tempdir().unwrap();
        let (input, _) = input_wav(dir.path());
        let encoded = dir.path().join("g711.g711");
        let split = dir.path().join("split.wav");
        let combined = dir.path().join("combined.wav");

        let encode = G711Pipeline {
            mode: G711PipelineMode::EncodeOnly,
            ..G711Pipeline::default()
        };
        let summary = encode.run(&Reference, &input, &encoded).unwrap();
        assert_eq!(summary.snr, None);
        assert_eq!(std::fs::metadata(&encoded).unwrap().len(), 1000);

        let decode = G711Pipeline {
            mode: G711PipelineMode::DecodeOnly,
            ..G711Pipeline::default()
        };
        let summary = decode.run(&Reference, &encoded, &split).unwrap();
        assert_eq!(summary.samples, 1000);
        assert_eq!(summary.snr, None);

        G711Pipeline::default()
            .run(&Reference, &input, &combined)
            .unwrap();
        assert_eq!(read_wav(&split), read_wav(&combined));
    }

    #[test]
    fn empty_input_has_no_snr() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.wav");
        write_wav(&input, &[], 8000, 1);

        let summary = G711Pipeline::default()
            .run(&Reference, &input, dir.path().join("g711.wav"))
            .unwrap();
        assert_eq!((summary.frames, summary.samples), (0, 0));
        assert_eq!(summary.snr, None);

        let summary = G726Pipeline::default()
            .run(&Reference, &input, dir.path().join("g726.wav"))
            .unwrap();
        assert_eq!((summary.frames, summary.samples), (0, 0));
        assert_eq!(summary.snr, None);
        assert!(read_wav(&dir.path().join("g726.wav")).is_empty());
    }

    #[test]
    fn g711_rejects_wrong_rate() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("wideband.wav");
        write_wav(&input, &sine_wave(1000.0, 16000.0, 320, 8000.0), 16000, 1);
        let err = G711Pipeline::default()
            .run(&Reference, &input, dir.path().join("out.wav"))
            .unwrap_err();
        assert!(matches!(err, ComplianceError::AudioFormat { .. }));
    }

    #[test]
    fn g726_round_trip_measures_snr() {
        let dir = tempfile::tempdir().unwrap();
        let (input, _) = input_wav(dir.path());
        let output = dir.path().join("output.wav");

        let summary = G726Pipeline::default()
            .run(&Reference, &input, &output)
            .unwrap();
        assert_eq!(summary.frames, 7);
        assert_eq!(summary.samples, 1000);
        let snr = summary.snr.unwrap();
        assert!(snr.is_finite() && snr > 10.0, "SNR {snr}");
        assert_eq!(read_wav(&output).len(), 1000);
    }

    #[test]
    fn g726_packed_stream_pairs_samples_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (input, _) = input_wav(dir.path());
        let unpacked = G726Pipeline::default()
            .run(&Reference, &input, dir.path().join("unpacked.wav"))
            .unwrap();

        for packing in [G726Packing::Left, G726Packing::Right] {
            let output = dir.path().join(format!("{packing}.wav"));
            let packed = G726Pipeline::new(G726Rate::Rate16000, packing)
                .run(&Reference, &input, &output)
                .unwrap();
            // 1000 samples at 2 bits fill exactly 250 bytes.
            assert_eq!(packed.samples, 1000);
            assert_eq!(packed.snr, unpacked.snr);
            assert_eq!(
                read_wav(&output),
                read_wav(&dir.path().join("unpacked.wav"))
            );
        }
    }

    #[test]
    fn g726_rejects_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("stereo.wav");
        write_wav(&input, &[0; 320], 8000, 2);
        let err = G726Pipeline::default()
            .run(&Reference, &input, dir.path().join("out.wav"))
            .unwrap_err();
        assert!(matches!(err, ComplianceError::AudioFormat { .. }));
    }
}

// =========================================================================
// Command line
// =========================================================================
mod cli {
    use std::process::Command;

    #[test]
    fn fatal_error_reaches_stderr_with_logging_off() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("absent.wav");
        let output = Command::new(env!("CARGO_BIN_EXE_g7xx-compliance"))
            .env("RUST_LOG", "off")
            .arg("g711")
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(dir.path().join("out.wav"))
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("absent.wav"), "stderr was: {stderr}");
    }

    #[test]
    fn unknown_rate_exits_with_fatal_code() {
        let dir = tempfile::tempdir().unwrap();
        let output = Command::new(env!("CARGO_BIN_EXE_g7xx-compliance"))
            .env("RUST_LOG", "off")
            .args(["g726", "--rate", "8000", "-i"])
            .arg(dir.path().join("in.wav"))
            .arg("-o")
            .arg(dir.path().join("out.wav"))
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("8000"), "stderr was: {stderr}");
    }
}

// =========================================================================
// Logging
// =========================================================================
mod logging {
    use g7xx_compliance::logging::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(LogLevel::from_verbosity(0, false), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(1, false), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(9, false), LogLevel::Trace);
        assert_eq!(LogLevel::from_verbosity(3, true), LogLevel::Error);
    }

    #[test]
    fn level_conversions() {
        for value in 0..=5 {
            let level = LogLevel::try_from(value).unwrap();
            assert_eq!(i32::from(level), value);
        }
        assert!(LogLevel::try_from(6).is_err());
        assert_eq!(LogLevel::Warning.to_string(), "warning");
        assert_eq!(
            LogLevel::None.filter(),
            tracing::level_filters::LevelFilter::OFF
        );
    }
}
