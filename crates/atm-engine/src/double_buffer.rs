//! Double buffer handed to the output sink.
//!
//! The sink plays one half while the renderer refills the other. Each
//! logical sample is written [`OVERSAMPLE`] times because the sink's carrier
//! runs at twice the logical rate.

use crate::clock::LOGICAL_SAMPLE_RATE;
use crate::render::{Renderer, BIAS};

/// Logical samples rendered per half.
pub const LOGICAL_SAMPLES_PER_HALF: usize = 128;

/// Sink values written per logical sample.
pub const OVERSAMPLE: usize = 2;

/// Sink values per half.
pub const SINK_SAMPLES_PER_HALF: usize = LOGICAL_SAMPLES_PER_HALF * OVERSAMPLE;

/// Rate at which the sink consumes values.
pub const SINK_SAMPLE_RATE: u32 = LOGICAL_SAMPLE_RATE * OVERSAMPLE as u32;

const TOTAL: usize = SINK_SAMPLES_PER_HALF * 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub fn other(self) -> Half {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }

    fn range(self) -> core::ops::Range<usize> {
        match self {
            Half::First => 0..SINK_SAMPLES_PER_HALF,
            Half::Second => SINK_SAMPLES_PER_HALF..TOTAL,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DoubleBuffer {
    data: [u8; TOTAL],
}

impl DoubleBuffer {
    pub fn new() -> Self {
        Self { data: [BIAS; TOTAL] }
    }

    /// Fill both halves before the sink starts.
    pub fn prime(&mut self, renderer: &mut Renderer) {
        self.refill(Half::First, renderer);
        self.refill(Half::Second, renderer);
    }

    /// Refill a half the sink has finished with.
    pub fn refill(&mut self, half: Half, renderer: &mut Renderer) {
        renderer.fill(&mut self.data[half.range()]);
    }

    pub fn half(&self, half: Half) -> &[u8] {
        &self.data[half.range()]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for DoubleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
