//! Compliance and quality harness for G.711 and G.726 codecs.
//!
//! The checks reach codecs only through the traits in [`codec`], so any
//! implementation can be validated. [`codec::Reference`] binds them to the
//! pure-Rust codecs of the `g7xx` crate.
//!
//! # Example
//!
//! ```no_run
//! use g7xx_compliance::codec::Reference;
//! use g7xx_compliance::suite::{Checks, ComplianceSuite};
//!
//! let report = ComplianceSuite::new(Checks::all()).run(&Reference)?;
//! assert_eq!(report.block_samples, Some(65536));
//! # Ok::<(), g7xx_compliance::error::ComplianceError>(())
//! ```

pub mod accuracy;
pub mod audio;
pub mod block;
pub mod calibration;
pub mod codec;
pub mod error;
pub mod idempotence;
pub mod logging;
pub mod pipeline;
pub mod power_meter;
pub mod snr;
pub mod suite;
pub mod tolerance;
pub mod transcoding;

pub use error::{ComplianceError, Result};
