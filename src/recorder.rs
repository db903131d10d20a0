//! Edge timestamp recorder.
//!
//! Turns captured edge timestamps into the durations of the high phase of each
//! bit. Only falling edges produce a sample: the interval between a rising edge
//! and the following falling edge is how long the sensor held the line high.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::buffer::EdgeIntervalBuffer;

/// Which edge the capture unit latches next.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapturePolarity {
    Rising,
    Falling,
}

impl CapturePolarity {
    /// The opposite edge.
    pub const fn toggled(self) -> Self {
        match self {
            CapturePolarity::Rising => CapturePolarity::Falling,
            CapturePolarity::Falling => CapturePolarity::Rising,
        }
    }
}

/// Duration between two readings of a free-running 16-bit counter.
///
/// The counter may wrap between the two readings, e.g. `65500 -> 40` is 76 ticks.
#[inline]
pub const fn interval(previous: u16, current: u16) -> u16 {
    current.wrapping_sub(previous)
}

/// Classifies one edge.
///
/// `line_high` is the line level sampled right after the edge. A high line means
/// a rising edge: the next capture must be the falling edge and nothing is
/// measured yet. A low line means a falling edge ended a high phase, whose
/// length is returned as a sample.
#[inline]
pub fn classify_edge(
    previous: u16,
    timestamp: u16,
    line_high: bool,
) -> (CapturePolarity, Option<u16>) {
    if line_high {
        (CapturePolarity::Falling, None)
    } else {
        (CapturePolarity::Rising, Some(interval(previous, timestamp)))
    }
}

/// State owned by the edge handler during one acquisition cycle.
///
/// [`on_edge`](Self::on_edge) is safe to call from an interrupt handler: it runs
/// in constant time and never allocates or blocks.
#[derive(Clone, Debug)]
pub struct EdgeRecorder {
    intervals: EdgeIntervalBuffer,
    previous: u16,
    polarity: CapturePolarity,
}

impl EdgeRecorder {
    pub const fn new() -> Self {
        Self {
            intervals: EdgeIntervalBuffer::new(),
            previous: 0,
            polarity: CapturePolarity::Falling,
        }
    }

    /// Starts a new cycle: no samples, capture on falling edge, intervals
    /// measured from `now`.
    pub fn reset(&mut self, now: u16) {
        self.intervals.clear();
        self.previous = now;
        self.polarity = CapturePolarity::Falling;
    }

    /// Handles a captured edge and returns the polarity to capture next.
    pub fn on_edge(&mut self, timestamp: u16, line_high: bool) -> CapturePolarity {
        let (polarity, sample) = classify_edge(self.previous, timestamp, line_high);
        if let Some(sample) = sample {
            self.intervals.push(sample);
        }
        self.previous = timestamp;
        self.polarity = polarity;
        polarity
    }

    pub fn intervals(&self) -> &EdgeIntervalBuffer {
        &self.intervals
    }

    pub fn polarity(&self) -> CapturePolarity {
        self.polarity
    }

    /// Counter value at the last edge.
    pub fn previous(&self) -> u16 {
        self.previous
    }
}

impl Default for EdgeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage of the recorder the driver resets, fills and decodes.
///
/// An owned [`EdgeRecorder`] is filled by the driver itself from polled
/// captures. A [`SharedRecorder`] is filled by the application's capture
/// interrupt handler.
pub trait RecorderCell {
    /// Runs `f` with exclusive access to the recorder.
    fn lock<T>(&mut self, f: impl FnOnce(&mut EdgeRecorder) -> T) -> T;
}

impl RecorderCell for EdgeRecorder {
    #[inline]
    fn lock<T>(&mut self, f: impl FnOnce(&mut EdgeRecorder) -> T) -> T {
        f(self)
    }
}

/// Recorder shared between the driver and a capture interrupt handler.
///
/// Place it in a `static`, call [`on_edge`](Self::on_edge) from the handler
/// and pass `&RECORDER` to [`Dht::with_recorder`](crate::Dht::with_recorder).
/// The driver only touches it before the capture interrupt is enabled and
/// after it is disabled again.
///
/// ```ignore
/// static RECORDER: SharedRecorder = SharedRecorder::new();
///
/// #[interrupt]
/// fn TIM2() {
///     let timestamp = capture_register();
///     let polarity = RECORDER.on_edge(timestamp, data_line_is_high());
///     set_capture_edge(polarity);
/// }
/// ```
pub struct SharedRecorder {
    inner: Mutex<RefCell<EdgeRecorder>>,
}

impl SharedRecorder {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(EdgeRecorder::new())),
        }
    }

    /// Handles a captured edge and returns the polarity to capture next.
    ///
    /// Meant to be called from the capture interrupt handler.
    pub fn on_edge(&self, timestamp: u16, line_high: bool) -> CapturePolarity {
        critical_section::with(|cs| {
            self.inner
                .borrow_ref_mut(cs)
                .on_edge(timestamp, line_high)
        })
    }
}

impl Default for SharedRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderCell for &SharedRecorder {
    fn lock<T>(&mut self, f: impl FnOnce(&mut EdgeRecorder) -> T) -> T {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CAPACITY;

    #[test]
    fn interval_tolerates_counter_wrap() {
        assert_eq!(interval(65500, 40), 76);
        assert_eq!(interval(100, 170), 70);
        assert_eq!(interval(u16::MAX, 0), 1);
    }

    #[test]
    fn rising_edge_records_nothing() {
        assert_eq!(classify_edge(10, 60, true), (CapturePolarity::Falling, None));
    }

    #[test]
    fn falling_edge_records_high_time() {
        assert_eq!(
            classify_edge(60, 130, false),
            (CapturePolarity::Rising, Some(70))
        );
        assert_eq!(
            classify_edge(65530, 20, false),
            (CapturePolarity::Rising, Some(26))
        );
    }

    #[test]
    fn recorder_toggles_polarity_and_tracks_previous() {
        let mut recorder = EdgeRecorder::new();
        recorder.reset(1000);

        assert_eq!(recorder.on_edge(1050, true), CapturePolarity::Falling);
        assert_eq!(recorder.previous(), 1050);
        assert!(recorder.intervals().is_empty());

        assert_eq!(recorder.on_edge(1120, false), CapturePolarity::Rising);
        assert_eq!(recorder.previous(), 1120);
        assert_eq!(recorder.intervals().as_slice(), &[70]);

        assert_eq!(recorder.on_edge(1170, true), CapturePolarity::Falling);
        assert_eq!(recorder.on_edge(1196, false), CapturePolarity::Rising);
        assert_eq!(recorder.intervals().as_slice(), &[70, 26]);
    }

    #[test]
    fn recorder_stops_at_capacity() {
        let mut recorder = EdgeRecorder::new();
        recorder.reset(0);

        let mut now: u16 = 0;
        for _ in 0..CAPACITY + 10 {
            now = now.wrapping_add(50);
            recorder.on_edge(now, true);
            now = now.wrapping_add(26);
            recorder.on_edge(now, false);
        }

        assert_eq!(recorder.intervals().len(), CAPACITY);
        assert_eq!(recorder.intervals().dropped(), 10);
        assert!(recorder.intervals().as_slice().iter().all(|&s| s == 26));
    }

    #[test]
    fn reset_forgets_previous_cycle() {
        let mut recorder = EdgeRecorder::new();
        recorder.reset(0);
        recorder.on_edge(70, false);
        assert_eq!(recorder.polarity(), CapturePolarity::Rising);

        recorder.reset(5000);

        assert!(recorder.intervals().is_empty());
        assert_eq!(recorder.polarity(), CapturePolarity::Falling);
        assert_eq!(recorder.previous(), 5000);
    }

    #[test]
    fn shared_recorder_records_from_handler() {
        static RECORDER: SharedRecorder = SharedRecorder::new();
        let mut cell = &RECORDER;
        cell.lock(|recorder| recorder.reset(100));

        assert_eq!(RECORDER.on_edge(150, true), CapturePolarity::Falling);
        assert_eq!(RECORDER.on_edge(220, false), CapturePolarity::Rising);

        let samples = cell.lock(|recorder| recorder.intervals().clone());
        assert_eq!(samples.as_slice(), &[70]);
    }
}
