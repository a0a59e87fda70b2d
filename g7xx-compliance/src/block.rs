//! Block-mode equivalence.
//!
//! The full linear domain goes through one block encode, one block transcode
//! and one block decode. Lengths must be preserved at every stage and the
//! output must meet the same bands as the point-wise sweep.

use g7xx::g711::G711Mode;
use tracing::info;

use crate::accuracy::{DOMAIN_SIZE, full_domain};
use crate::codec::{G711Session, LawCodec};
use crate::error::{BlockStage, ComplianceError, Result};
use crate::tolerance::ToleranceBand;

fn expect_len(stage: BlockStage, actual: usize) -> Result<()> {
    if actual != DOMAIN_SIZE {
        return Err(ComplianceError::BlockLength {
            stage,
            actual,
            expected: DOMAIN_SIZE,
        });
    }
    Ok(())
}

/// Run A-law encode, A-law to u-law transcode and u-law decode over the full
/// domain. Returns the number of samples checked.
pub fn block_equivalence<C: LawCodec>(codec: &C) -> Result<usize> {
    info!("Block coding tests.");
    let mut encoder = codec.session(G711Mode::ALaw)?;
    let mut transcoder = codec.session(G711Mode::ALaw)?;
    let mut decoder = codec.session(G711Mode::ULaw)?;

    let input = full_domain();
    let mut alaw = vec![0u8; DOMAIN_SIZE];
    let mut ulaw = vec![0u8; DOMAIN_SIZE];
    let mut output = vec![0i16; DOMAIN_SIZE];

    let len = encoder.encode(&mut alaw, &input);
    expect_len(BlockStage::Encode, len)?;
    let len = transcoder.transcode(&mut ulaw, &alaw[..len]);
    expect_len(BlockStage::Transcode, len)?;
    let len = decoder.decode(&mut output, &ulaw[..len]);
    expect_len(BlockStage::Decode, len)?;

    let band = ToleranceBand::ALAW;
    for (&pre, &post) in input.iter().zip(&output) {
        if !band.measure(pre, post).within {
            return Err(ComplianceError::BlockAccuracy { pre, post });
        }
    }
    Ok(len)
}
