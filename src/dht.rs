use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::capture::{Armed, EdgeCapture};
use crate::decode;
use crate::error::DhtError;
use crate::reading::{MeasurementResult, Reading};
use crate::recorder::{CapturePolarity, EdgeRecorder, RecorderCell, interval};
use crate::timing::{START_LOW_MS, Timing};

/// Driver for a DHT sensor read through timer input-capture.
///
/// Instead of sampling the line in a busy loop, the driver lets the capture
/// unit timestamp every edge of the response and decodes the recorded
/// high-pulse lengths afterwards.
///
/// By default the driver owns its [`EdgeRecorder`] and records polled
/// captures. With [`Dht::with_recorder`] and a
/// [`SharedRecorder`](crate::recorder::SharedRecorder), edges are recorded by
/// the application's capture interrupt handler instead.
pub struct Dht<PIN, CAP, D, R = EdgeRecorder> {
    pin: PIN,
    capture: CAP,
    delay: D,
    recorder: R,
    timing: Timing,
}

impl<PIN, CAP, DELAY, E> Dht<PIN, CAP, DELAY>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    CAP: EdgeCapture,
    DELAY: DelayNs,
{
    /// Creates a new instance of the driver with the default [`Timing`].
    ///
    /// # Arguments
    ///
    /// * `pin` - The open-drain GPIO pin connected to the data line. Must support both input and output.
    /// * `capture` - The timer channel capturing edges on the same line, ticking once per microsecond.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    pub fn new(pin: PIN, capture: CAP, delay: DELAY) -> Self {
        Self::with_timing(pin, capture, delay, Timing::default())
    }

    /// Creates a new instance of the driver with custom timing parameters.
    pub fn with_timing(pin: PIN, capture: CAP, delay: DELAY, timing: Timing) -> Self {
        Dht::with_recorder(pin, capture, delay, EdgeRecorder::new(), timing)
    }
}

impl<PIN, CAP, DELAY, R, E> Dht<PIN, CAP, DELAY, R>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    CAP: EdgeCapture,
    DELAY: DelayNs,
    R: RecorderCell,
{
    /// Creates a new instance of the driver recording edges into `recorder`.
    ///
    /// Pass `&RECORDER` for a `static RECORDER: SharedRecorder` whose
    /// `on_edge` is called from the capture interrupt handler.
    pub fn with_recorder(pin: PIN, capture: CAP, delay: DELAY, recorder: R, timing: Timing) -> Self {
        Dht {
            pin,
            capture,
            delay,
            recorder,
            timing,
        }
    }

    /// Runs one measurement cycle.
    ///
    /// Any failure, whether a truncated capture, a checksum mismatch or a pin
    /// error, yields [`MeasurementResult::INVALID`]. The driver never retries;
    /// call again on the next cycle.
    pub fn measure(&mut self) -> MeasurementResult {
        self.try_measure().into()
    }

    /// Runs one measurement cycle and reports why it failed.
    ///
    /// The cycle always takes the full capture window, even when the sensor
    /// does not answer.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if a complete frame was captured and the checksum is valid.
    /// * `Err(DhtError)` on a truncated capture, a checksum mismatch or a pin error.
    pub fn try_measure(&mut self) -> Result<Reading, DhtError<E>> {
        self.reset();
        self.trigger()?;
        self.acquire()?;

        let threshold = self.timing.bit_threshold;
        let frame = self
            .recorder
            .lock(|recorder| {
                let intervals = recorder.intervals();
                if intervals.dropped() > 0 {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("capture saturated, {} intervals dropped", intervals.dropped());
                }
                decode::decode(intervals.as_slice(), threshold)
            })
            .and_then(decode::Frame::validate)
            .map_err(|err| {
                #[cfg(feature = "defmt")]
                defmt::debug!("DHT read failed: {}", err);
                DhtError::Decode(err)
            })?;

        Ok(frame.into())
    }

    /// Copy of the state recorded during the last cycle.
    pub fn last_capture(&mut self) -> EdgeRecorder {
        self.recorder.lock(|recorder| recorder.clone())
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Releases the pin, the capture unit, the delay and the recorder.
    pub fn release(self) -> (PIN, CAP, DELAY, R) {
        (self.pin, self.capture, self.delay, self.recorder)
    }

    /// Clears the previous cycle and waits for a falling edge.
    fn reset(&mut self) {
        self.capture.clear_pending();
        self.capture.set_polarity(CapturePolarity::Falling);
        let now = self.capture.counter();
        self.recorder.lock(|recorder| recorder.reset(now));
    }

    /// Sends the start signal: line low, then released.
    ///
    /// The line is held low for at least [`START_LOW_MS`], whatever the timing says.
    fn trigger(&mut self) -> Result<(), DhtError<E>> {
        self.pin.set_low()?;
        self.delay.delay_ms(self.timing.start_low_ms.max(START_LOW_MS));
        self.pin.set_high()?;
        Ok(())
    }

    /// Records edges for the whole capture window.
    ///
    /// The recorder is borrowed by the armed scope only; once it ends the
    /// capture interrupt is off and nothing writes to the intervals anymore.
    /// Captures the interrupt handler already consumed never show up in
    /// `take_capture`, so only polled edges are recorded here.
    fn acquire(&mut self) -> Result<(), DhtError<E>> {
        let Self {
            pin,
            capture,
            recorder,
            timing,
            ..
        } = self;

        let mut armed = Armed::new(capture, recorder);
        let mut last = armed.counter();
        let mut elapsed: u32 = 0;

        while elapsed < timing.window_us {
            if let Some(timestamp) = armed.take_capture() {
                armed.record(timestamp, pin.is_high()?);
            }

            let now = armed.counter();
            elapsed = elapsed.saturating_add(u32::from(interval(last, now)));
            last = now;
        }

        Ok(())
    }
}
