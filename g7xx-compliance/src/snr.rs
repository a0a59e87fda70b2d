//! Streaming signal-to-noise ratio measurement.

/// Running sums for an SNR estimate over an (input, output) sample stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnrAccumulator {
    sum_input_sq: u64,
    sum_error_sq: u64,
    samples: u64,
}

impl SnrAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one (input, output) pair.
    pub fn update(&mut self, input: i16, output: i16) {
        let input = input as i64;
        let error = input - output as i64;
        self.sum_input_sq += (input * input) as u64;
        self.sum_error_sq += (error * error) as u64;
        self.samples += 1;
    }

    /// Add paired samples. Unpaired trailing samples of the longer slice are
    /// ignored.
    pub fn update_block(&mut self, inputs: &[i16], outputs: &[i16]) {
        for (&input, &output) in inputs.iter().zip(outputs) {
            self.update(input, output);
        }
    }

    /// The SNR in dB over everything accumulated so far.
    ///
    /// A stream with no error reads `f64::INFINITY`; a silent input with a
    /// non-zero error reads `f64::NEG_INFINITY`.
    pub fn finalize(&self) -> f64 {
        if self.sum_error_sq == 0 {
            return f64::INFINITY;
        }
        if self.sum_input_sq == 0 {
            return f64::NEG_INFINITY;
        }
        10.0 * (self.sum_input_sq as f64 / self.sum_error_sq as f64).log10()
    }

    /// The SNR in dB, or `None` when no sample has been accumulated.
    pub fn try_finalize(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.finalize())
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn sum_input_sq(&self) -> u64 {
        self.sum_input_sq
    }

    pub fn sum_error_sq(&self) -> u64 {
        self.sum_error_sq
    }
}
