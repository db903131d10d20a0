/// Number of interval slots available to one measurement cycle.
///
/// A full response is 42 intervals (the response preamble plus 40 data bits),
/// the rest is headroom for glitches on the line.
pub const CAPACITY: usize = 60;

/// Fixed-capacity sequence of inter-edge durations, in microsecond ticks.
///
/// Writes past [`CAPACITY`] are dropped: the buffer saturates instead of
/// wrapping or overwriting earlier samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeIntervalBuffer {
    samples: [u16; CAPACITY],
    len: usize,
    dropped: usize,
}

impl EdgeIntervalBuffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            samples: [0; CAPACITY],
            len: 0,
            dropped: 0,
        }
    }

    /// Empties the buffer for the next cycle.
    pub fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }

    /// Appends an interval.
    ///
    /// Returns `false` and leaves the buffer untouched when it is full.
    pub fn push(&mut self, interval: u16) -> bool {
        match self.samples.get_mut(self.len) {
            Some(slot) => {
                *slot = interval;
                self.len += 1;
                true
            }
            None => {
                self.dropped = self.dropped.saturating_add(1);
                false
            }
        }
    }

    /// Recorded intervals, oldest first.
    pub fn as_slice(&self) -> &[u16] {
        &self.samples[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == CAPACITY
    }

    /// Intervals that arrived after the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for EdgeIntervalBuffer {
    fn default() -> Self {
        Self::new()
    }
}
