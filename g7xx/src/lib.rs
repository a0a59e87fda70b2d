//! Pure-Rust implementations of the narrow-band telephony codecs from the
//! [spandsp](https://github.com/freeswitch/spandsp) family.
//!
//! Provides G.711 (A-law and u-law, point-wise and block) with direct
//! A-law/u-law transcoding, and G.726 ADPCM at 16, 24, 32 and 40 kbit/s with
//! optional bit packing.

pub mod error;

pub mod g711;
pub mod g726;
