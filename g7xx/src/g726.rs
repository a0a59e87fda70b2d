//! G.726 ADPCM codec.
//!
//! `G726State` carries the adaptive predictor and quantizer state plus any
//! partially packed code bits, so a stream may be fed in blocks of any size.
//! Interworking is with 16-bit linear PCM only.

use std::fmt;

use crate::error::{CodecError, Result};

/// G.726 bit packing mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum G726Packing {
    /// No packing: one code word per byte.
    #[default]
    None,
    /// Left-justified packing: the first code occupies the most significant bits.
    Left,
    /// Right-justified packing: the first code occupies the least significant bits.
    Right,
}

impl fmt::Display for G726Packing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            G726Packing::None => f.write_str("none"),
            G726Packing::Left => f.write_str("left"),
            G726Packing::Right => f.write_str("right"),
        }
    }
}

/// Valid bit rates for G.726.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum G726Rate {
    /// 16 kbit/s (2 bits per sample).
    #[default]
    Rate16000,
    /// 24 kbit/s (3 bits per sample).
    Rate24000,
    /// 32 kbit/s (4 bits per sample).
    Rate32000,
    /// 40 kbit/s (5 bits per sample).
    Rate40000,
}

impl G726Rate {
    /// Returns the bit rate in bits per second.
    pub fn bps(self) -> u32 {
        match self {
            G726Rate::Rate16000 => 16000,
            G726Rate::Rate24000 => 24000,
            G726Rate::Rate32000 => 32000,
            G726Rate::Rate40000 => 40000,
        }
    }

    /// Returns the number of bits per ADPCM sample.
    pub fn bits_per_sample(self) -> u8 {
        match self {
            G726Rate::Rate16000 => 2,
            G726Rate::Rate24000 => 3,
            G726Rate::Rate32000 => 4,
            G726Rate::Rate40000 => 5,
        }
    }

    fn tables(self) -> &'static RateTables {
        match self {
            G726Rate::Rate16000 => &TABLES_16,
            G726Rate::Rate24000 => &TABLES_24,
            G726Rate::Rate32000 => &TABLES_32,
            G726Rate::Rate40000 => &TABLES_40,
        }
    }
}

impl fmt::Display for G726Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            G726Rate::Rate16000 => f.write_str("16 kbit/s"),
            G726Rate::Rate24000 => f.write_str("24 kbit/s"),
            G726Rate::Rate32000 => f.write_str("32 kbit/s"),
            G726Rate::Rate40000 => f.write_str("40 kbit/s"),
        }
    }
}

impl TryFrom<u32> for G726Rate {
    type Error = CodecError;

    fn try_from(bps: u32) -> std::result::Result<Self, Self::Error> {
        match bps {
            16000 => Ok(G726Rate::Rate16000),
            24000 => Ok(G726Rate::Rate24000),
            32000 => Ok(G726Rate::Rate32000),
            40000 => Ok(G726Rate::Rate40000),
            _ => Err(CodecError::InvalidInput(format!(
                "invalid G.726 rate: {bps} bps"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-rate tables (ITU-T G.726)
// ---------------------------------------------------------------------------

struct RateTables {
    /// Number of quantizer output levels used by `quantize`.
    quantizer_states: i32,
    /// Quantizer decision levels, in the log2 domain.
    decision: &'static [i32],
    /// Code word to reconstructed normalized log magnitude.
    dqln: &'static [i32],
    /// Code word to log scale factor multiplier.
    wi: &'static [i32],
    /// Code word to transition-detector input.
    fi: &'static [i32],
}

static TABLES_16: RateTables = RateTables {
    quantizer_states: 4,
    decision: &[261],
    dqln: &[116, 365, 365, 116],
    wi: &[-704, 14048, 14048, -704],
    fi: &[0x000, 0xE00, 0xE00, 0x000],
};

static TABLES_24: RateTables = RateTables {
    quantizer_states: 7,
    decision: &[8, 218, 331],
    dqln: &[-2048, 135, 273, 373, 373, 273, 135, -2048],
    wi: &[-128, 960, 4384, 18624, 18624, 4384, 960, -128],
    fi: &[0x000, 0x200, 0x400, 0xE00, 0xE00, 0x400, 0x200, 0x000],
};

static TABLES_32: RateTables = RateTables {
    quantizer_states: 15,
    decision: &[-124, 80, 178, 246, 300, 349, 400],
    dqln: &[
        -2048, 4, 135, 213, 273, 323, 373, 425, 425, 373, 323, 273, 213, 135, 4, -2048,
    ],
    wi: &[
        -384, 576, 1312, 2048, 3584, 6336, 11360, 35904, 35904, 11360, 6336, 3584, 2048, 1312,
        576, -384,
    ],
    fi: &[
        0x000, 0x000, 0x000, 0x200, 0x200, 0x200, 0x600, 0xE00, 0xE00, 0x600, 0x200, 0x200,
        0x200, 0x000, 0x000, 0x000,
    ],
};

static TABLES_40: RateTables = RateTables {
    quantizer_states: 31,
    decision: &[
        -122, -16, 68, 139, 198, 250, 298, 339, 378, 413, 445, 475, 502, 528, 553,
    ],
    dqln: &[
        -2048, -66, 28, 104, 169, 224, 274, 318, 358, 395, 429, 459, 488, 514, 539, 566, 566,
        539, 514, 488, 459, 429, 395, 358, 318, 274, 224, 169, 104, 28, -66, -2048,
    ],
    wi: &[
        448, 448, 768, 1248, 1280, 1312, 1856, 3200, 4512, 5728, 7008, 8960, 11456, 14080,
        16928, 22272, 22272, 16928, 14080, 11456, 8960, 7008, 5728, 4512, 3200, 1856, 1312,
        1280, 1248, 768, 448, 448,
    ],
    fi: &[
        0x000, 0x000, 0x000, 0x000, 0x000, 0x200, 0x200, 0x200, 0x200, 0x200, 0x400, 0x600,
        0x800, 0xA00, 0xC00, 0xC00, 0xC00, 0xC00, 0xA00, 0x800, 0x600, 0x400, 0x200, 0x200,
        0x200, 0x200, 0x200, 0x000, 0x000, 0x000, 0x000, 0x000,
    ],
};

/// Floating point zero as stored in the `dq`/`sr` delay lines, negative sign.
const NEG_ZERO_FLOAT: i16 = 0xFC20_u16 as i16;

#[inline]
fn top_bit(v: i32) -> i32 {
    if v == 0 {
        return -1;
    }
    (31 - (v as u32).leading_zeros()) as i32
}

/// Multiply a predictor coefficient by a value held in the 4-bit exponent,
/// 6-bit mantissa floating point format of the delay lines.
fn fmult(an: i32, srn: i32) -> i32 {
    let anmag = if an > 0 { an } else { (-an) & 0x1FFF };
    let anexp = top_bit(anmag) - 5;
    let anmant = if anmag == 0 {
        32
    } else if anexp >= 0 {
        anmag >> anexp
    } else {
        anmag << -anexp
    };
    let wanexp = anexp + ((srn >> 6) & 0xF) - 13;
    let wanmant = (anmant * (srn & 0x3F) + 0x30) >> 4;
    let retval = if wanexp >= 0 {
        (wanmant << wanexp) & 0x7FFF
    } else {
        wanmant >> -wanexp
    };
    if (an ^ srn) < 0 { -retval } else { retval }
}

/// Convert a magnitude to the delay line floating point format.
#[inline]
fn to_float(mag: i32) -> i32 {
    let exp = top_bit(mag) + 1;
    (exp << 6) + ((mag << 6) >> exp)
}

fn quantize(d: i32, y: i32, tables: &RateTables) -> usize {
    // LOG: base-2 log of |d|
    let dqm = d.abs();
    let exp = top_bit(dqm >> 1) + 1;
    let mant = ((dqm << 7) >> exp) & 0x7F;
    let dl = (exp << 7) + mant;
    // SUBTB
    let dln = dl - (y >> 2);
    // QUAN
    let size = (tables.quantizer_states - 1) >> 1;
    let i = tables
        .decision
        .iter()
        .take(size as usize)
        .position(|&level| dln < level)
        .unwrap_or(size as usize) as i32;
    if d < 0 {
        ((size << 1) + 1 - i) as usize
    } else if i == 0 && tables.quantizer_states & 1 != 0 {
        // Zero is only a valid code with an even number of states.
        tables.quantizer_states as usize
    } else {
        i as usize
    }
}

fn reconstruct(sign: bool, dqln: i32, y: i32) -> i32 {
    // ADDA
    let dql = dqln + (y >> 2);
    if dql < 0 {
        return if sign { -0x8000 } else { 0 };
    }
    // ANTILOG
    let dex = (dql >> 7) & 15;
    let dqt = 128 + (dql & 127);
    let dq = (dqt << 7) >> (14 - dex);
    if sign { dq - 0x8000 } else { dq }
}

/// G.726 encoder/decoder state.
///
/// A single state handles both encoding and decoding, depending on which
/// method is called, but a stream should use one state per direction.
#[derive(Debug, Clone)]
pub struct G726State {
    rate: G726Rate,
    packing: G726Packing,
    /// Locked (slow) quantizer scale factor.
    yl: i32,
    /// Unlocked (fast) quantizer scale factor.
    yu: i16,
    /// Short term energy estimate.
    dms: i16,
    /// Long term energy estimate.
    dml: i16,
    /// Linear weighting coefficient of `yl` and `yu`.
    ap: i16,
    /// Pole predictor coefficients.
    a: [i16; 2],
    /// Zero predictor coefficients.
    b: [i16; 6],
    /// Signs of previous partially reconstructed signals.
    pk: [i16; 2],
    /// Previous quantized differences, floating point format.
    dq: [i16; 6],
    /// Previous reconstructed signals, floating point format.
    sr: [i16; 2],
    /// Tone detect.
    td: bool,
    in_buffer: u32,
    in_bits: u32,
    out_buffer: u32,
    out_bits: u32,
}

impl G726State {
    /// Create a new G.726 state.
    pub fn new(rate: G726Rate, packing: G726Packing) -> Self {
        Self {
            rate,
            packing,
            yl: 34816,
            yu: 544,
            dms: 0,
            dml: 0,
            ap: 0,
            a: [0; 2],
            b: [0; 6],
            pk: [0; 2],
            dq: [32; 6],
            sr: [32; 2],
            td: false,
            in_buffer: 0,
            in_bits: 0,
            out_buffer: 0,
            out_bits: 0,
        }
    }

    /// Returns the bit rate this state was initialized with.
    pub fn rate(&self) -> G726Rate {
        self.rate
    }

    /// Returns the packing mode this state was initialized with.
    pub fn packing(&self) -> G726Packing {
        self.packing
    }

    /// Number of bytes `encode` emits for `samples` more input samples,
    /// given the bits already pending in the packer.
    pub fn encoded_len(&self, samples: usize) -> usize {
        match self.packing {
            G726Packing::None => samples,
            _ => {
                (self.out_bits as usize + samples * self.rate.bits_per_sample() as usize) / 8
            }
        }
    }

    /// Encode linear PCM to G.726.
    ///
    /// Returns the number of G.726 bytes produced. Encoding stops early if
    /// `g726_data` has no room for the next byte.
    pub fn encode(&mut self, g726_data: &mut [u8], amp: &[i16]) -> usize {
        let bits = self.rate.bits_per_sample() as u32;
        let mut g726_bytes = 0;
        for &sample in amp {
            let emits = self.packing == G726Packing::None || self.out_bits + bits >= 8;
            if emits && g726_bytes >= g726_data.len() {
                break;
            }
            let code = self.encode_sample(sample) as u32;
            match self.packing {
                G726Packing::None => {
                    g726_data[g726_bytes] = code as u8;
                    g726_bytes += 1;
                }
                G726Packing::Left => {
                    self.out_buffer = ((self.out_buffer << bits) | code) & 0xFFFF;
                    self.out_bits += bits;
                    if self.out_bits >= 8 {
                        g726_data[g726_bytes] = (self.out_buffer >> (self.out_bits - 8)) as u8;
                        g726_bytes += 1;
                        self.out_bits -= 8;
                    }
                }
                G726Packing::Right => {
                    self.out_buffer |= code << self.out_bits;
                    self.out_bits += bits;
                    if self.out_bits >= 8 {
                        g726_data[g726_bytes] = self.out_buffer as u8;
                        g726_bytes += 1;
                        self.out_bits -= 8;
                        self.out_buffer >>= 8;
                    }
                }
            }
        }
        g726_bytes
    }

    /// Decode G.726 data to linear PCM.
    ///
    /// Returns the number of samples produced. Decoding stops early if `amp`
    /// is full.
    pub fn decode(&mut self, amp: &mut [i16], g726_data: &[u8]) -> usize {
        let bits = self.rate.bits_per_sample() as u32;
        let code_mask = (1u32 << bits) - 1;
        let mut bytes = g726_data.iter();
        let mut samples = 0;
        while samples < amp.len() {
            let code = match self.packing {
                G726Packing::None => match bytes.next() {
                    Some(&byte) => byte as u32,
                    None => break,
                },
                G726Packing::Left => {
                    if self.in_bits < bits {
                        let Some(&byte) = bytes.next() else { break };
                        self.in_buffer = ((self.in_buffer << 8) | byte as u32) & 0xFFFF;
                        self.in_bits += 8;
                    }
                    self.in_bits -= bits;
                    (self.in_buffer >> self.in_bits) & code_mask
                }
                G726Packing::Right => {
                    if self.in_bits < bits {
                        let Some(&byte) = bytes.next() else { break };
                        self.in_buffer |= (byte as u32) << self.in_bits;
                        self.in_bits += 8;
                    }
                    let code = self.in_buffer & code_mask;
                    self.in_buffer >>= bits;
                    self.in_bits -= bits;
                    code
                }
            };
            amp[samples] = self.decode_sample(code as u8);
            samples += 1;
        }
        samples
    }

    fn encode_sample(&mut self, amp: i16) -> u8 {
        let tables = self.rate.tables();
        let sign_bit = 1usize << (self.rate.bits_per_sample() - 1);

        // Linear input is reduced to the 14-bit range of the algorithm.
        let sl = (amp as i32) >> 2;
        let sezi = self.predictor_zero();
        let sez = sezi >> 1;
        let se = (sezi + self.predictor_pole()) >> 1;
        let d = sl - se;

        let y = self.step_size();
        let i = quantize(d, y, tables);
        let dq = reconstruct(i & sign_bit != 0, tables.dqln[i], y);
        let sr = if dq < 0 { se - (dq & 0x3FFF) } else { se + dq };
        let dqsez = sr + sez - se;

        self.update(y, tables.wi[i], tables.fi[i], dq, sr, dqsez);
        i as u8
    }

    fn decode_sample(&mut self, code: u8) -> i16 {
        let tables = self.rate.tables();
        let bits = self.rate.bits_per_sample();
        let i = (code & ((1u8 << bits) - 1)) as usize;
        let sign_bit = 1usize << (bits - 1);

        let sezi = self.predictor_zero();
        let sez = sezi >> 1;
        let se = (sezi + self.predictor_pole()) >> 1;

        let y = self.step_size();
        let dq = reconstruct(i & sign_bit != 0, tables.dqln[i], y);
        let sr = if dq < 0 { se - (dq & 0x3FFF) } else { se + dq };
        let dqsez = sr - se + sez;

        self.update(y, tables.wi[i], tables.fi[i], dq, sr, dqsez);
        (sr << 2).clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    fn predictor_zero(&self) -> i32 {
        self.b
            .iter()
            .zip(&self.dq)
            .map(|(&b, &dq)| fmult((b >> 2) as i32, dq as i32))
            .sum()
    }

    fn predictor_pole(&self) -> i32 {
        fmult((self.a[1] >> 2) as i32, self.sr[1] as i32)
            + fmult((self.a[0] >> 2) as i32, self.sr[0] as i32)
    }

    fn step_size(&self) -> i32 {
        if self.ap >= 256 {
            return self.yu as i32;
        }
        let mut y = self.yl >> 6;
        let dif = self.yu as i32 - y;
        let al = (self.ap >> 2) as i32;
        if dif > 0 {
            y += (dif * al) >> 6;
        } else if dif < 0 {
            y += (dif * al + 0x3F) >> 6;
        }
        y
    }

    fn update(&mut self, y: i32, wi: i32, fi: i32, dq: i32, sr: i32, dqsez: i32) {
        let pk0: i16 = if dqsez < 0 { 1 } else { 0 };
        let mag = dq & 0x7FFF;

        // TRANS: transition detector
        let ylint = self.yl >> 15;
        let ylfrac = (self.yl >> 10) & 0x1F;
        let thr1 = (32 + ylfrac) << ylint;
        let thr2 = if ylint > 9 { 31 << 10 } else { thr1 };
        let dqthr = (thr2 + (thr2 >> 1)) >> 1;
        let tr = self.td && mag > dqthr;

        // Quantizer scale factor adaptation
        let yu = (y + ((wi - y) >> 5)).clamp(544, 5120);
        self.yu = yu as i16;
        self.yl += yu + ((-self.yl) >> 6);

        let mut a2p = 0;
        if tr {
            self.a = [0; 2];
            self.b = [0; 6];
        } else {
            let pks1 = pk0 ^ self.pk[0];

            // UPA2
            a2p = self.a[1] as i32 - ((self.a[1] >> 7) as i32);
            if dqsez != 0 {
                let fa1 = if pks1 != 0 {
                    self.a[0] as i32
                } else {
                    -(self.a[0] as i32)
                };
                if fa1 < -8191 {
                    a2p -= 0x100;
                } else if fa1 > 8191 {
                    a2p += 0xFF;
                } else {
                    a2p += fa1 >> 5;
                }

                if pk0 ^ self.pk[1] != 0 {
                    if a2p <= -12160 {
                        a2p = -12288;
                    } else if a2p >= 12416 {
                        a2p = 12288;
                    } else {
                        a2p -= 0x80;
                    }
                } else if a2p <= -12416 {
                    a2p = -12288;
                } else if a2p >= 12160 {
                    a2p = 12288;
                } else {
                    a2p += 0x80;
                }
            }
            self.a[1] = a2p as i16;

            // UPA1
            let mut a1 = self.a[0] as i32 - ((self.a[0] >> 8) as i32);
            if dqsez != 0 {
                if pks1 == 0 {
                    a1 += 192;
                } else {
                    a1 -= 192;
                }
            }

            // LIMD
            let a1ul = 15360 - a2p;
            self.a[0] = a1.clamp(-a1ul, a1ul) as i16;

            // UPB: update the zero predictor coefficients
            let leak = if self.rate == G726Rate::Rate40000 { 9 } else { 8 };
            for (b, &prev) in self.b.iter_mut().zip(&self.dq) {
                let mut coef = *b as i32 - ((*b >> leak) as i32);
                if mag != 0 {
                    if (dq ^ prev as i32) >= 0 {
                        coef += 128;
                    } else {
                        coef -= 128;
                    }
                }
                *b = coef as i16;
            }
        }

        // FLOAT A: delay the quantized difference
        self.dq.copy_within(0..5, 1);
        self.dq[0] = if mag == 0 {
            if dq >= 0 { 0x20 } else { NEG_ZERO_FLOAT }
        } else if dq >= 0 {
            to_float(mag) as i16
        } else {
            (to_float(mag) - 0x400) as i16
        };

        // FLOAT B: delay the reconstructed signal
        self.sr[1] = self.sr[0];
        self.sr[0] = if sr == 0 {
            0x20
        } else if sr > 0 {
            to_float(sr) as i16
        } else if sr > -32768 {
            (to_float(-sr) - 0x400) as i16
        } else {
            NEG_ZERO_FLOAT
        };

        // DELAY A
        self.pk[1] = self.pk[0];
        self.pk[0] = pk0;

        // TONE
        self.td = !tr && a2p < -11776;

        // Adaptation speed control
        self.dms = (self.dms as i32 + ((fi - self.dms as i32) >> 5)) as i16;
        self.dml = (self.dml as i32 + (((fi << 2) - self.dml as i32) >> 7)) as i16;

        let ap = self.ap as i32;
        let dms = self.dms as i32;
        let dml = self.dml as i32;
        self.ap = if tr {
            256
        } else if y < 1536 || self.td || ((dms << 2) - dml).abs() >= (dml >> 3) {
            (ap + ((0x200 - ap) >> 4)) as i16
        } else {
            (ap + ((-ap) >> 4)) as i16
        };
    }
}
