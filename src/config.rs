//! Knobs for the two analyses.

/// Configuration for a solve run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveConfig {
    /// Button presses summed by the bulk counter.
    pub presses: usize,

    /// Presses after which a period search gives up.
    pub max_presses: usize,

    /// Name of the true sink. Detected from the first dangling output when
    /// not set.
    pub sink: Option<String>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            presses: 1000,
            max_presses: 1_000_000,
            sink: None,
        }
    }
}

impl SolveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of presses for the bulk counter.
    pub fn with_presses(mut self, presses: usize) -> Self {
        self.presses = presses;
        self
    }

    /// Set the period search ceiling.
    pub fn with_max_presses(mut self, max_presses: usize) -> Self {
        self.max_presses = max_presses;
        self
    }

    /// Override sink detection.
    pub fn with_sink(mut self, sink: impl Into<String>) -> Self {
        self.sink = Some(sink.into());
        self
    }
}
