//! File drivers that push telephony audio through a codec frame by frame and
//! measure the end-to-end SNR.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use g7xx::g711::G711Mode;
use g7xx::g726::{G726Packing, G726Rate};
use tracing::{debug, info};

use crate::audio::{RawReader, RawWriter, TelephonyReader, TelephonyWriter};
use crate::codec::{AdpcmCodec, AdpcmSession, G711Session, LawCodec};
use crate::error::{BlockStage, ComplianceError, Result};
use crate::snr::SnrAccumulator;

/// Samples per G.711 frame (20 ms).
pub const G711_FRAME_LEN: usize = 160;

/// Samples per G.726 frame.
pub const G726_FRAME_LEN: usize = 159;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSummary {
    pub frames: usize,
    pub samples: usize,
    /// End-to-end SNR in dB, when both ends of the chain were linear audio
    /// and at least one sample went through.
    pub snr: Option<f64>,
}

fn expect_len(stage: BlockStage, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(ComplianceError::BlockLength {
            stage,
            actual,
            expected,
        });
    }
    Ok(())
}

fn report(input: &Path, output: &Path, using: impl fmt::Display, summary: &PipelineSummary) {
    info!(
        "'{}' translated to '{}' using {using}.",
        input.display(),
        output.display()
    );
    if let Some(snr) = summary.snr {
        info!("SNR = {snr:.6}");
    }
    info!("Samples: {}", summary.samples);
}

/// Which halves of the G.711 chain to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum G711PipelineMode {
    /// WAV in, WAV out, with SNR.
    #[default]
    EncodeDecode,
    /// WAV in, raw codes out.
    EncodeOnly,
    /// Raw codes in, WAV out.
    DecodeOnly,
}

/// G.711 encode, optional transcode, decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G711Pipeline {
    pub law: G711Mode,
    pub mode: G711PipelineMode,
    /// Transcode to the opposite law between encoding and decoding.
    pub transcode: bool,
}

impl Default for G711Pipeline {
    fn default() -> Self {
        Self {
            law: G711Mode::ALaw,
            mode: G711PipelineMode::EncodeDecode,
            transcode: false,
        }
    }
}

impl G711Pipeline {
    pub fn new(law: G711Mode) -> Self {
        Self {
            law,
            ..Self::default()
        }
    }

    /// Law of the codes that reach the decoder.
    pub fn decode_law(&self) -> G711Mode {
        if self.transcode {
            self.law.other()
        } else {
            self.law
        }
    }

    pub fn run<C: LawCodec>(
        &self,
        codec: &C,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<PipelineSummary> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let summary = match self.mode {
            G711PipelineMode::EncodeDecode => self.encode_decode(codec, input, output)?,
            G711PipelineMode::EncodeOnly => self.encode_only(codec, input, output)?,
            G711PipelineMode::DecodeOnly => self.decode_only(codec, input, output)?,
        };
        report(input, output, self.law, &summary);
        Ok(summary)
    }

    fn encode_decode<C: LawCodec>(
        &self,
        codec: &C,
        input: &Path,
        output: &Path,
    ) -> Result<PipelineSummary> {
        let mut reader = TelephonyReader::open(input)?;
        let mut writer = TelephonyWriter::create(output)?;
        let mut encoder = codec.session(self.law)?;
        let mut transcoder = codec.session(self.law)?;
        let mut decoder = codec.session(self.decode_law())?;
        let mut snr = SnrAccumulator::new();

        let mut amp = [0i16; G711_FRAME_LEN];
        let mut codes = [0u8; G711_FRAME_LEN];
        let mut transcoded = [0u8; G711_FRAME_LEN];
        let mut out = [0i16; G711_FRAME_LEN];
        let mut frames = 0;
        let mut samples = 0;

        loop {
            let len = reader.read_frame(&mut amp)?;
            if len == 0 {
                break;
            }
            let coded = encoder.encode(&mut codes, &amp[..len]);
            expect_len(BlockStage::Encode, coded, len)?;
            let codes = if self.transcode {
                let n = transcoder.transcode(&mut transcoded, &codes[..len]);
                expect_len(BlockStage::Transcode, n, len)?;
                &transcoded[..len]
            } else {
                &codes[..len]
            };
            let decoded = decoder.decode(&mut out, codes);
            expect_len(BlockStage::Decode, decoded, len)?;
            writer.write_frame(&out[..len])?;
            snr.update_block(&amp[..len], &out[..len]);
            debug!(frame = frames, len, "frame coded");
            frames += 1;
            samples += len;
        }
        writer.close()?;

        Ok(PipelineSummary {
            frames,
            samples,
            snr: snr.try_finalize(),
        })
    }

    fn encode_only<C: LawCodec>(
        &self,
        codec: &C,
        input: &Path,
        output: &Path,
    ) -> Result<PipelineSummary> {
        let mut reader = TelephonyReader::open(input)?;
        let mut writer = RawWriter::create(output)?;
        let mut encoder = codec.session(self.law)?;
        let mut transcoder = codec.session(self.law)?;

        let mut amp = [0i16; G711_FRAME_LEN];
        let mut codes = [0u8; G711_FRAME_LEN];
        let mut transcoded = [0u8; G711_FRAME_LEN];
        let mut frames = 0;
        let mut samples = 0;

        loop {
            let len = reader.read_frame(&mut amp)?;
            if len == 0 {
                break;
            }
            let coded = encoder.encode(&mut codes, &amp[..len]);
            expect_len(BlockStage::Encode, coded, len)?;
            if self.transcode {
                let n = transcoder.transcode(&mut transcoded, &codes[..len]);
                expect_len(BlockStage::Transcode, n, len)?;
                writer.write(&transcoded[..len])?;
            } else {
                writer.write(&codes[..len])?;
            }
            frames += 1;
            samples += len;
        }
        writer.close()?;

        Ok(PipelineSummary {
            frames,
            samples,
            snr: None,
        })
    }

    fn decode_only<C: LawCodec>(
        &self,
        codec: &C,
        input: &Path,
        output: &Path,
    ) -> Result<PipelineSummary> {
        let mut reader = RawReader::open(input)?;
        let mut writer = TelephonyWriter::create(output)?;
        let mut transcoder = codec.session(self.law)?;
        let mut decoder = codec.session(self.decode_law())?;

        let mut codes = [0u8; G711_FRAME_LEN];
        let mut transcoded = [0u8; G711_FRAME_LEN];
        let mut out = [0i16; G711_FRAME_LEN];
        let mut frames = 0;
        let mut samples = 0;

        loop {
            let len = reader.read(&mut codes)?;
            if len == 0 {
                break;
            }
            let codes = if self.transcode {
                let n = transcoder.transcode(&mut transcoded, &codes[..len]);
                expect_len(BlockStage::Transcode, n, len)?;
                &transcoded[..len]
            } else {
                &codes[..len]
            };
            let decoded = decoder.decode(&mut out, codes);
            expect_len(BlockStage::Decode, decoded, len)?;
            writer.write_frame(&out[..len])?;
            frames += 1;
            samples += len;
        }
        writer.close()?;

        Ok(PipelineSummary {
            frames,
            samples,
            snr: None,
        })
    }
}

/// G.726 encode then decode of a telephony WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct G726Pipeline {
    pub rate: G726Rate,
    pub packing: G726Packing,
}

impl G726Pipeline {
    pub fn new(rate: G726Rate, packing: G726Packing) -> Self {
        Self { rate, packing }
    }

    /// Run the pipeline. With bit packing the decoder may lag the encoder by
    /// a partial byte, so each decoded sample is paired with the oldest input
    /// sample not yet matched.
    pub fn run<C: AdpcmCodec>(
        &self,
        codec: &C,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<PipelineSummary> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let mut reader = TelephonyReader::open(input)?;
        let mut writer = TelephonyWriter::create(output)?;
        let mut encoder = codec.session(self.rate, self.packing)?;
        let mut decoder = codec.session(self.rate, self.packing)?;
        let mut snr = SnrAccumulator::new();
        info!("ADPCM packing is {}", self.packing);

        let mut amp = [0i16; G726_FRAME_LEN];
        let mut adpcm = [0u8; G726_FRAME_LEN];
        // Room for samples completed by bits the packer carried over from
        // the previous frame.
        let mut out = [0i16; G726_FRAME_LEN + 8];
        let mut pending: VecDeque<i16> = VecDeque::with_capacity(G726_FRAME_LEN * 2);
        let mut frames = 0;
        let mut samples = 0;

        loop {
            let len = reader.read_frame(&mut amp)?;
            if len == 0 {
                break;
            }
            pending.extend(&amp[..len]);
            let bytes = encoder.encode(&mut adpcm, &amp[..len]);
            let decoded = decoder.decode(&mut out, &adpcm[..bytes]);
            writer.write_frame(&out[..decoded])?;
            let paired = decoded.min(pending.len());
            for (&sample, input) in out[..paired].iter().zip(pending.drain(..paired)) {
                snr.update(input, sample);
            }
            frames += 1;
            samples += decoded;
        }
        writer.close()?;

        let summary = PipelineSummary {
            frames,
            samples,
            snr: snr.try_finalize(),
        };
        report(input, output, self.rate, &summary);
        Ok(summary)
    }
}
