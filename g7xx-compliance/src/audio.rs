//! Telephony audio files and raw code streams.
//!
//! All handles are scoped: `close` reports errors from the final flush, and
//! dropping a handle closes it on every other path.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{ComplianceError, Result};

/// The only sample rate the harness handles.
pub const SAMPLE_RATE: u32 = 8000;

/// The only channel count the harness handles.
pub const CHANNELS: u16 = 1;

const BITS_PER_SAMPLE: u16 = 16;

/// WAV format of every file the harness writes.
pub fn telephony_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

fn audio_error(path: &Path) -> impl FnOnce(hound::Error) -> ComplianceError + '_ {
    move |source| ComplianceError::Audio {
        path: path.to_path_buf(),
        source,
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ComplianceError + '_ {
    move |source| ComplianceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reader for 8 kHz mono 16-bit WAV files.
pub struct TelephonyReader {
    path: PathBuf,
    reader: WavReader<BufReader<File>>,
}

impl TelephonyReader {
    /// Open `path` and check that it holds telephony audio.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path).map_err(audio_error(path))?;
        let spec = reader.spec();
        let check = |what: &'static str, actual: u32, expected: u32| {
            if actual == expected {
                Ok(())
            } else {
                Err(ComplianceError::AudioFormat {
                    path: path.to_path_buf(),
                    what,
                    actual,
                    expected,
                })
            }
        };
        check("sample rate", spec.sample_rate, SAMPLE_RATE)?;
        check("number of channels", spec.channels as u32, CHANNELS as u32)?;
        check(
            "bits per sample",
            spec.bits_per_sample as u32,
            BITS_PER_SAMPLE as u32,
        )?;
        if spec.sample_format != SampleFormat::Int {
            return Err(ComplianceError::AudioFormat {
                path: path.to_path_buf(),
                what: "integer sample format",
                actual: 0,
                expected: 1,
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            reader,
        })
    }

    /// Fill `frame` from the file, returning the number of samples read.
    /// Zero means end of file.
    pub fn read_frame(&mut self, frame: &mut [i16]) -> Result<usize> {
        let mut len = 0;
        for (slot, sample) in frame.iter_mut().zip(self.reader.samples::<i16>()) {
            *slot = sample.map_err(audio_error(&self.path))?;
            len += 1;
        }
        Ok(len)
    }

    /// Total number of samples in the file.
    pub fn len(&self) -> u32 {
        self.reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writer for 8 kHz mono 16-bit WAV files.
pub struct TelephonyWriter {
    path: PathBuf,
    writer: WavWriter<BufWriter<File>>,
}

impl TelephonyWriter {
    /// Create (or truncate) `path` as a telephony WAV file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let writer = WavWriter::create(path, telephony_spec()).map_err(audio_error(path))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Append every sample of `frame`.
    pub fn write_frame(&mut self, frame: &[i16]) -> Result<()> {
        for &sample in frame {
            self.writer
                .write_sample(sample)
                .map_err(audio_error(&self.path))?;
        }
        Ok(())
    }

    /// Samples written so far.
    pub fn len(&self) -> u32 {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Finish the WAV header and close the file.
    pub fn close(self) -> Result<()> {
        let Self { path, writer } = self;
        writer.finalize().map_err(audio_error(&path))
    }
}

/// Reader for a headerless stream of codec bytes.
pub struct RawReader {
    path: PathBuf,
    reader: BufReader<File>,
}

impl RawReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(io_error(path))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
        })
    }

    /// Fill `buf` as far as the stream allows, returning the byte count.
    /// Zero means end of stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut len = 0;
        while len < buf.len() {
            match self.reader.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_error(&self.path)(e)),
            }
        }
        Ok(len)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writer for a headerless stream of codec bytes.
pub struct RawWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RawWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(io_error(path))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data).map_err(io_error(&self.path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered bytes and close the file.
    pub fn close(mut self) -> Result<()> {
        self.writer.flush().map_err(io_error(&self.path))
    }
}
