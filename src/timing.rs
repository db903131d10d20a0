use crate::decode::BIT_THRESHOLD_TICKS;

/// How long the host holds the line low to request a reading, in milliseconds.
pub const START_LOW_MS: u32 = 10;

/// How long edges are recorded after the trigger, in microsecond ticks.
///
/// The whole response takes about 5 ms; the window also covers the sensor's
/// minimum interval between two readings.
pub const ACQUISITION_WINDOW_US: u32 = 2_000_000;

/// Timing parameters of one acquisition cycle.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Low time of the start signal, in milliseconds.
    ///
    /// Values below [`START_LOW_MS`] are raised to it; the sensor ignores
    /// shorter start signals.
    pub start_low_ms: u32,
    /// Length of the capture window, in microsecond ticks.
    pub window_us: u32,
    /// High-pulse length above which a bit reads as `1`.
    pub bit_threshold: u16,
}

impl Timing {
    pub const fn new() -> Self {
        Self {
            start_low_ms: START_LOW_MS,
            window_us: ACQUISITION_WINDOW_US,
            bit_threshold: BIT_THRESHOLD_TICKS,
        }
    }

    /// Same as [`Timing::new`] with a different capture window.
    pub const fn with_window_us(window_us: u32) -> Self {
        Self {
            window_us,
            ..Self::new()
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}
