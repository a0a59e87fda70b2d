//! G.711 codec (A-law and u-law).
//!
//! Provides both the block encoder/decoder (`G711State`) and stateless
//! sample-level conversion functions, including direct A-law/u-law
//! transcoding.

use std::fmt;

/// G.711 encoding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum G711Mode {
    /// ITU-T G.711 A-law.
    ALaw,
    /// ITU-T G.711 u-law (mu-law).
    ULaw,
}

impl G711Mode {
    /// The opposite companding law.
    pub fn other(self) -> Self {
        match self {
            G711Mode::ALaw => G711Mode::ULaw,
            G711Mode::ULaw => G711Mode::ALaw,
        }
    }

    /// Encode one linear sample under this law.
    #[inline]
    pub fn encode(self, linear: i16) -> u8 {
        match self {
            G711Mode::ALaw => linear_to_alaw(linear),
            G711Mode::ULaw => linear_to_ulaw(linear),
        }
    }

    /// Decode one code of this law to a linear sample.
    #[inline]
    pub fn decode(self, code: u8) -> i16 {
        match self {
            G711Mode::ALaw => alaw_to_linear(code),
            G711Mode::ULaw => ulaw_to_linear(code),
        }
    }

    /// Transcode one code of this law into the opposite law.
    #[inline]
    pub fn transcode(self, code: u8) -> u8 {
        match self {
            G711Mode::ALaw => alaw_to_ulaw(code),
            G711Mode::ULaw => ulaw_to_alaw(code),
        }
    }
}

impl fmt::Display for G711Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            G711Mode::ALaw => f.write_str("A-law"),
            G711Mode::ULaw => f.write_str("u-law"),
        }
    }
}

/// Block G.711 encoder/decoder.
///
/// G.711 itself is stateless; the state only fixes the law. Every block
/// operation processes as many samples as both buffers can hold and returns
/// that count, so callers can detect truncated output by comparing lengths.
#[derive(Debug, Clone)]
pub struct G711State {
    mode: G711Mode,
}

impl G711State {
    /// Create a new G.711 encoder/decoder state for the specified mode.
    pub fn new(mode: G711Mode) -> Self {
        Self { mode }
    }

    /// Returns the encoding mode this state was initialized with.
    pub fn mode(&self) -> G711Mode {
        self.mode
    }

    /// Encode linear PCM samples to G.711.
    ///
    /// Returns the number of G.711 bytes produced.
    pub fn encode(&mut self, g711_data: &mut [u8], amp: &[i16]) -> usize {
        let mode = self.mode;
        let len = amp.len().min(g711_data.len());
        for (out, &sample) in g711_data.iter_mut().zip(&amp[..len]) {
            *out = mode.encode(sample);
        }
        len
    }

    /// Decode G.711 data to linear PCM samples.
    ///
    /// Returns the number of linear samples produced.
    pub fn decode(&mut self, amp: &mut [i16], g711_data: &[u8]) -> usize {
        let mode = self.mode;
        let len = g711_data.len().min(amp.len());
        for (out, &code) in amp.iter_mut().zip(&g711_data[..len]) {
            *out = mode.decode(code);
        }
        len
    }

    /// Transcode between A-law and u-law. The input is taken to be in the law
    /// this state was initialised with; the output is in the opposite law.
    ///
    /// Returns the number of G.711 bytes produced.
    pub fn transcode(&mut self, g711_out: &mut [u8], g711_in: &[u8]) -> usize {
        let mode = self.mode;
        let len = g711_in.len().min(g711_out.len());
        for (out, &code) in g711_out.iter_mut().zip(&g711_in[..len]) {
            *out = mode.transcode(code);
        }
        len
    }
}

// ---------------------------------------------------------------------------
// Stateless conversion functions
//
// The algorithms are taken directly from the ITU G.711 spec.
// ---------------------------------------------------------------------------

/// Bias added during u-law encoding.
const ULAW_BIAS: i32 = 0x84;

/// A-law alternate mark inversion mask.
pub const ALAW_AMI_MASK: u8 = 0x55;

/// Find the position of the highest set bit (0-based from LSB).
/// Returns -1 when the input is 0.
#[inline]
fn top_bit(v: i32) -> i32 {
    if v == 0 {
        return -1;
    }
    let v_unsigned = v as u32;
    (31 - v_unsigned.leading_zeros()) as i32
}

/// Encode a single linear PCM sample to u-law.
#[inline]
pub fn linear_to_ulaw(linear: i16) -> u8 {
    let mut lin = linear as i32;
    let mask: u8;
    if lin >= 0 {
        lin += ULAW_BIAS;
        mask = 0xFF;
    } else {
        lin = ULAW_BIAS - lin;
        mask = 0x7F;
    }
    let seg = top_bit(lin | 0xFF) - 7;
    if seg >= 8 {
        0x7F ^ mask
    } else {
        ((seg << 4) | ((lin >> (seg + 3)) & 0xF)) as u8 ^ mask
    }
}

/// Decode a single u-law sample to linear PCM.
#[inline]
pub fn ulaw_to_linear(ulaw: u8) -> i16 {
    let ulaw = !ulaw;
    let t = ((((ulaw & 0x0F) as i32) << 3) + ULAW_BIAS) << (((ulaw as i32) & 0x70) >> 4);
    if ulaw & 0x80 != 0 {
        (ULAW_BIAS - t) as i16
    } else {
        (t - ULAW_BIAS) as i16
    }
}

/// Encode a single linear PCM sample to A-law.
#[inline]
pub fn linear_to_alaw(linear: i16) -> u8 {
    let mut lin = linear as i32;
    let mask: u8;
    if lin >= 0 {
        mask = 0x80 | ALAW_AMI_MASK;
    } else {
        mask = ALAW_AMI_MASK;
        lin = -lin - 1;
    }
    let seg = top_bit(lin | 0xFF) - 7;
    if seg >= 8 {
        0x7F ^ mask
    } else {
        let shift = if seg != 0 { seg + 3 } else { 4 };
        ((seg << 4) | ((lin >> shift) & 0x0F)) as u8 ^ mask
    }
}

/// Decode a single A-law sample to linear PCM.
#[inline]
pub fn alaw_to_linear(alaw: u8) -> i16 {
    let alaw = alaw ^ ALAW_AMI_MASK;
    let i = ((alaw & 0x0F) as i32) << 4;
    let seg = ((alaw as i32) & 0x70) >> 4;
    let val = if seg != 0 {
        (i + 0x108) << (seg - 1)
    } else {
        i + 8
    };
    if alaw & 0x80 != 0 {
        val as i16
    } else {
        -(val as i16)
    }
}

/// u-law to A-law magnitude conversion, 1-based, from the G.711 tables.
/// Indexed by the inverted u-law magnitude.
const ULAW_TO_ALAW_MAG: [u8; 128] = [
    1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, //
    9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, //
    25, 27, 29, 31, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, //
    46, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, //
    64, 65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 79, //
    81, 82, 83, 84, 85, 86, 87, 88, 89, 90, 91, 92, 93, 94, 95, 96, //
    97, 98, 99, 100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110, 111, 112, //
    113, 114, 115, 116, 117, 118, 119, 120, 121, 122, 123, 124, 125, 126, 127, 128,
];

/// A-law to u-law magnitude conversion, from the G.711 tables.
/// Indexed by the A-law magnitude with the AMI mask removed.
const ALAW_TO_ULAW_MAG: [u8; 128] = [
    1, 3, 5, 7, 9, 11, 13, 15, 16, 17, 18, 19, 20, 21, 22, 23, //
    24, 25, 26, 27, 28, 29, 30, 31, 32, 32, 33, 33, 34, 34, 35, 35, //
    36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 48, 49, 49, //
    50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 64, //
    65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 79, 80, //
    80, 81, 82, 83, 84, 85, 86, 87, 88, 89, 90, 91, 92, 93, 94, 95, //
    96, 97, 98, 99, 100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110, 111, //
    112, 113, 114, 115, 116, 117, 118, 119, 120, 121, 122, 123, 124, 125, 126, 127,
];

/// Transcode a single A-law sample to u-law using the ITU-specified procedure.
#[inline]
pub fn alaw_to_ulaw(alaw: u8) -> u8 {
    if alaw & 0x80 != 0 {
        0xFF ^ ALAW_TO_ULAW_MAG[(alaw ^ 0xD5) as usize]
    } else {
        0x7F ^ ALAW_TO_ULAW_MAG[(alaw ^ ALAW_AMI_MASK) as usize]
    }
}

/// Transcode a single u-law sample to A-law using the ITU-specified procedure.
#[inline]
pub fn ulaw_to_alaw(ulaw: u8) -> u8 {
    if ulaw & 0x80 != 0 {
        0xD5 ^ (ULAW_TO_ALAW_MAG[(0xFF ^ ulaw) as usize] - 1)
    } else {
        ALAW_AMI_MASK ^ (ULAW_TO_ALAW_MAG[(0x7F ^ ulaw) as usize] - 1)
    }
}
