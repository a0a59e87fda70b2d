//! Cyclic round-trip repeatability.
//!
//! A decoded G.711 value must be a fixed point of the codec: encoding and
//! decoding it again has to return it unchanged.

use g7xx::g711::G711Mode;
use tracing::info;

use crate::codec::LawCodec;
use crate::error::{ComplianceError, Result};

/// Check one sample under one law.
pub fn check_sample<C: LawCodec>(codec: &C, law: G711Mode, pre: i16) -> Result<()> {
    let post = codec.round_trip(law, pre);
    let post_post = codec.round_trip(law, post);
    if post_post != post {
        return Err(ComplianceError::RoundTripMismatch {
            law,
            pre,
            post,
            post_post,
        });
    }
    Ok(())
}

/// Check every linear sample under both laws, stopping at the first mismatch.
pub fn cyclic_round_trip<C: LawCodec>(codec: &C) -> Result<()> {
    info!("Cyclic conversion repeatability tests.");
    for pre in i16::MIN..=i16::MAX {
        check_sample(codec, G711Mode::ALaw, pre)?;
        check_sample(codec, G711Mode::ULaw, pre)?;
    }
    Ok(())
}
