//! Cross-law transcoding consistency.
//!
//! Taking a code through the opposite law and back must land on the same
//! code, or on a code one quantization step away.

use g7xx::g711::{ALAW_AMI_MASK, G711Mode};
use tracing::info;

use crate::codec::LawCodec;
use crate::error::{ComplianceError, Result, TranscodeDirection};

/// Largest accepted distance between a code and its transcoded round trip.
pub const MAX_STEP_DISTANCE: u8 = 1;

/// Distance in quantization steps between two codes of the same law.
///
/// A-law codes have their even bits inverted, so adjacent magnitudes are only
/// adjacent numerically once the inversion mask is removed.
pub fn code_distance(law: G711Mode, a: u8, b: u8) -> u8 {
    match law {
        G711Mode::ALaw => (a ^ ALAW_AMI_MASK).abs_diff(b ^ ALAW_AMI_MASK),
        G711Mode::ULaw => a.abs_diff(b),
    }
}

fn check_direction<C: LawCodec>(codec: &C, direction: TranscodeDirection) -> Result<()> {
    info!("Testing transcoding {direction}");
    for code in 0..=u8::MAX {
        let (law, result) = match direction {
            TranscodeDirection::UlawAlawUlaw => {
                (G711Mode::ULaw, codec.alaw_to_ulaw(codec.ulaw_to_alaw(code)))
            }
            TranscodeDirection::AlawUlawAlaw => {
                (G711Mode::ALaw, codec.ulaw_to_alaw(codec.alaw_to_ulaw(code)))
            }
        };
        if result != code && code_distance(law, code, result) > MAX_STEP_DISTANCE {
            return Err(ComplianceError::TranscodeMismatch {
                direction,
                code,
                result,
            });
        }
    }
    Ok(())
}

/// Check every code in both directions, stopping at the first failure.
pub fn cross_law_transcoding<C: LawCodec>(codec: &C) -> Result<()> {
    check_direction(codec, TranscodeDirection::UlawAlawUlaw)?;
    check_direction(codec, TranscodeDirection::AlawUlawAlaw)
}
