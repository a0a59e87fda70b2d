//! Error types for the compliance harness.
//!
//! Every fatal outcome of a check is a variant here, carrying the smallest
//! input that reproduces it together with the expected and actual values.

use std::path::PathBuf;

use g7xx::g711::G711Mode;

/// Process exit status for any fatal condition.
pub const FATAL_EXIT_CODE: i32 = 2;

/// Direction of a cross-law transcoding round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscodeDirection {
    /// u-law -> A-law -> u-law.
    UlawAlawUlaw,
    /// A-law -> u-law -> A-law.
    AlawUlawAlaw,
}

impl std::fmt::Display for TranscodeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscodeDirection::UlawAlawUlaw => f.write_str("u-law -> A-law -> u-law"),
            TranscodeDirection::AlawUlawAlaw => f.write_str("A-law -> u-law -> A-law"),
        }
    }
}

/// Stage of the block-mode codec chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockStage {
    Encode,
    Transcode,
    Decode,
}

impl std::fmt::Display for BlockStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockStage::Encode => f.write_str("encode"),
            BlockStage::Transcode => f.write_str("transcode"),
            BlockStage::Decode => f.write_str("decode"),
        }
    }
}

/// Errors that end a compliance run or a codec pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    /// The full-domain sweep found samples outside their tolerance band.
    #[error("{alaw_failures} A-law values and {ulaw_failures} u-law values with excessive error")]
    ExcessiveError {
        alaw_failures: usize,
        ulaw_failures: usize,
    },
    /// Re-encoding a decoded sample did not reproduce it.
    #[error("{law} second round trip mismatch - at {pre}, {post} != {post_post}")]
    RoundTripMismatch {
        law: G711Mode,
        pre: i16,
        post: i16,
        post_post: i16,
    },
    /// The decoded reference tone did not read 0 dBm0.
    #[error("reference {law} 1kHz tone is {level_dbm0:.3}dBm0, expected 0.0 +/- {tolerance_db}")]
    ReferenceLevel {
        law: G711Mode,
        level_dbm0: f32,
        tolerance_db: f32,
    },
    /// Transcoding a code through the opposite law moved it by more than one step.
    #[error("{direction} gave {code} -> {result}")]
    TranscodeMismatch {
        direction: TranscodeDirection,
        code: u8,
        result: u8,
    },
    /// A block-mode call returned the wrong number of items.
    #[error("block {stage} gave the wrong length - {actual} instead of {expected}")]
    BlockLength {
        stage: BlockStage,
        actual: usize,
        expected: usize,
    },
    /// A block-mode output sample fell outside its tolerance band.
    #[error("block: excessive error at {pre} ({post})")]
    BlockAccuracy { pre: i16, post: i16 },
    /// An audio file does not have the telephony format.
    #[error("unexpected {what} in audio file '{}': {actual}, expected {expected}", path.display())]
    AudioFormat {
        path: PathBuf,
        what: &'static str,
        actual: u32,
        expected: u32,
    },
    /// An audio file could not be opened, read, written or closed.
    #[error("audio file '{}': {source}", path.display())]
    Audio {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    /// A raw byte stream could not be opened, read, written or closed.
    #[error("file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A parameter was out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The log subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
    /// A codec rejected its configuration.
    #[error(transparent)]
    Codec(#[from] g7xx::error::CodecError),
}

impl ComplianceError {
    /// The process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        FATAL_EXIT_CODE
    }
}

/// A convenience Result type for compliance operations.
pub type Result<T> = std::result::Result<T, ComplianceError>;
