//! Full-domain conversion accuracy sweep.
//!
//! Every 16-bit linear value is round-tripped through each law and checked
//! against that law's [`ToleranceBand`]. Violations are counted rather than
//! fatal so the worst-case statistics always cover the whole domain.

use g7xx::g711::G711Mode;
use tracing::{info, warn};

use crate::codec::LawCodec;
use crate::error::{ComplianceError, Result};
use crate::tolerance::ToleranceBand;

/// Number of values in the 16-bit linear domain.
pub const DOMAIN_SIZE: usize = 1 << 16;

/// Every linear sample value, from -32768 to 32767.
pub fn full_domain() -> Vec<i16> {
    (i16::MIN..=i16::MAX).collect()
}

/// A sample whose round trip fell outside its tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub pre: i16,
    pub post: i16,
}

/// Sweep results for one law.
#[derive(Debug, Clone)]
pub struct LawAccuracy {
    pub law: G711Mode,
    pub violations: Vec<Violation>,
    /// Largest relative error seen above the small-signal threshold.
    pub worst_relative: f32,
    /// `decode(encode(x))` for every `x` in [`full_domain`] order.
    pub decoded: Vec<i16>,
}

impl LawAccuracy {
    pub fn failures(&self) -> usize {
        self.violations.len()
    }

    pub fn worst_percent(&self) -> f32 {
        self.worst_relative * 100.0
    }
}

/// Sweep results for both laws.
#[derive(Debug, Clone)]
pub struct AccuracyReport {
    pub alaw: LawAccuracy,
    pub ulaw: LawAccuracy,
}

impl AccuracyReport {
    /// Whether no sample of either law exceeded its band.
    pub fn passed(&self) -> bool {
        self.alaw.violations.is_empty() && self.ulaw.violations.is_empty()
    }

    /// Turn the report into an error if any sample failed.
    pub fn into_result(self) -> Result<Self> {
        if self.passed() {
            Ok(self)
        } else {
            Err(ComplianceError::ExcessiveError {
                alaw_failures: self.alaw.failures(),
                ulaw_failures: self.ulaw.failures(),
            })
        }
    }
}

/// Round-trip the full linear domain through one law.
pub fn sweep_law<C: LawCodec>(codec: &C, law: G711Mode) -> LawAccuracy {
    let band = ToleranceBand::for_law(law);
    let mut violations = Vec::new();
    let mut worst_relative = 0.0f32;
    let mut decoded = Vec::with_capacity(DOMAIN_SIZE);

    for pre in i16::MIN..=i16::MAX {
        let post = codec.round_trip(law, pre);
        let measurement = band.measure(pre, post);
        if !measurement.within {
            warn!(%law, pre, post, "{law}: Excessive error at {pre} ({post})");
            violations.push(Violation { pre, post });
        }
        if let Some(relative) = measurement.relative {
            worst_relative = worst_relative.max(relative);
        }
        decoded.push(post);
    }

    LawAccuracy {
        law,
        violations,
        worst_relative,
        decoded,
    }
}

/// Run the conversion accuracy sweep for A-law and u-law.
///
/// The worst-case errors are logged whether or not the sweep passed; use
/// [`AccuracyReport::into_result`] to turn failures into an error.
pub fn conversion_accuracy<C: LawCodec>(codec: &C) -> AccuracyReport {
    info!("Conversion accuracy tests.");
    let alaw = sweep_law(codec, G711Mode::ALaw);
    let ulaw = sweep_law(codec, G711Mode::ULaw);

    info!(
        "Worst A-law error (ignoring small values) {:.6}%",
        alaw.worst_percent()
    );
    info!(
        "Worst u-law error (ignoring small values) {:.6}%",
        ulaw.worst_percent()
    );
    if !alaw.violations.is_empty() || !ulaw.violations.is_empty() {
        warn!("{} A-law values with excessive error", alaw.failures());
        warn!("{} u-law values with excessive error", ulaw.failures());
    }

    AccuracyReport { alaw, ulaw }
}
