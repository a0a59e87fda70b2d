//! Codec collaborator contracts.
//!
//! The checks never call a codec directly; they go through these traits so
//! that any G.711/G.726 implementation can be put under test. `Reference`
//! binds them to the pure-Rust codecs in the `g7xx` crate.

use g7xx::g711::{self, G711Mode, G711State};
use g7xx::g726::{G726Packing, G726Rate, G726State};

use crate::error::Result;

/// Point-wise G.711 operations plus a factory for block sessions.
pub trait LawCodec {
    /// Block session type created by [`LawCodec::session`].
    type Session: G711Session;

    /// Encode one linear sample under `law`.
    fn encode_one(&self, law: G711Mode, sample: i16) -> u8;

    /// Decode one `law` code to a linear sample.
    fn decode_one(&self, law: G711Mode, code: u8) -> i16;

    /// Transcode one A-law code to u-law.
    fn alaw_to_ulaw(&self, code: u8) -> u8;

    /// Transcode one u-law code to A-law.
    fn ulaw_to_alaw(&self, code: u8) -> u8;

    /// Create a block session for `law`. The session releases its resources
    /// when dropped.
    fn session(&self, law: G711Mode) -> Result<Self::Session>;

    /// `decode(encode(sample))` under `law`.
    fn round_trip(&self, law: G711Mode, sample: i16) -> i16 {
        self.decode_one(law, self.encode_one(law, sample))
    }
}

/// Block-oriented G.711 session.
///
/// Every call returns the number of items it produced.
pub trait G711Session {
    /// Encode linear samples to codes of the session's law.
    fn encode(&mut self, codes: &mut [u8], samples: &[i16]) -> usize;

    /// Decode codes of the session's law to linear samples.
    fn decode(&mut self, samples: &mut [i16], codes: &[u8]) -> usize;

    /// Transcode codes of the session's law into the opposite law.
    fn transcode(&mut self, out: &mut [u8], codes: &[u8]) -> usize;
}

/// Factory for G.726 sessions.
pub trait AdpcmCodec {
    /// Session type created by [`AdpcmCodec::session`].
    type Session: AdpcmSession;

    /// Create a session for one direction of a stream.
    fn session(&self, rate: G726Rate, packing: G726Packing) -> Result<Self::Session>;
}

/// Streaming G.726 session.
pub trait AdpcmSession {
    /// Encode linear samples, returning the number of bytes produced.
    fn encode(&mut self, adpcm: &mut [u8], samples: &[i16]) -> usize;

    /// Decode ADPCM bytes, returning the number of samples produced.
    fn decode(&mut self, samples: &mut [i16], adpcm: &[u8]) -> usize;
}

/// The pure-Rust codecs from the `g7xx` crate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reference;

impl LawCodec for Reference {
    type Session = G711State;

    fn encode_one(&self, law: G711Mode, sample: i16) -> u8 {
        law.encode(sample)
    }

    fn decode_one(&self, law: G711Mode, code: u8) -> i16 {
        law.decode(code)
    }

    fn alaw_to_ulaw(&self, code: u8) -> u8 {
        g711::alaw_to_ulaw(code)
    }

    fn ulaw_to_alaw(&self, code: u8) -> u8 {
        g711::ulaw_to_alaw(code)
    }

    fn session(&self, law: G711Mode) -> Result<G711State> {
        Ok(G711State::new(law))
    }
}

impl G711Session for G711State {
    fn encode(&mut self, codes: &mut [u8], samples: &[i16]) -> usize {
        G711State::encode(self, codes, samples)
    }

    fn decode(&mut self, samples: &mut [i16], codes: &[u8]) -> usize {
        G711State::decode(self, samples, codes)
    }

    fn transcode(&mut self, out: &mut [u8], codes: &[u8]) -> usize {
        G711State::transcode(self, out, codes)
    }
}

impl AdpcmCodec for Reference {
    type Session = G726State;

    fn session(&self, rate: G726Rate, packing: G726Packing) -> Result<G726State> {
        Ok(G726State::new(rate, packing))
    }
}

impl AdpcmSession for G726State {
    fn encode(&mut self, adpcm: &mut [u8], samples: &[i16]) -> usize {
        G726State::encode(self, adpcm, samples)
    }

    fn decode(&mut self, samples: &mut [i16], adpcm: &[u8]) -> usize {
        G726State::decode(self, samples, adpcm)
    }
}
