//! Timer input-capture collaborator.

use crate::recorder::{CapturePolarity, RecorderCell};

/// A timer channel configured for input capture on the sensor's data line.
///
/// The timer must tick once per microsecond. Register writes on these
/// peripherals cannot fail, so none of the methods return errors.
///
/// Edges reach the recorder one of two ways. Either the capture interrupt
/// handler feeds a [`SharedRecorder`](crate::recorder::SharedRecorder) and
/// [`take_capture`](Self::take_capture) keeps its default, or no handler runs
/// and `take_capture` hands the latched captures to the driver, which records
/// them itself.
pub trait EdgeCapture {
    /// Current value of the free-running counter.
    fn counter(&mut self) -> u16;

    /// Selects the edge the next capture latches on.
    fn set_polarity(&mut self, polarity: CapturePolarity);

    /// Discards a capture latched before the cycle started.
    fn clear_pending(&mut self);

    fn enable_interrupt(&mut self);

    fn disable_interrupt(&mut self);

    /// Counter value latched at the last edge, if one occurred since the
    /// previous call and no interrupt handler consumed it.
    fn take_capture(&mut self) -> Option<u16> {
        None
    }
}

impl<T: EdgeCapture + ?Sized> EdgeCapture for &mut T {
    #[inline]
    fn counter(&mut self) -> u16 {
        T::counter(self)
    }

    #[inline]
    fn set_polarity(&mut self, polarity: CapturePolarity) {
        T::set_polarity(self, polarity)
    }

    #[inline]
    fn clear_pending(&mut self) {
        T::clear_pending(self)
    }

    #[inline]
    fn enable_interrupt(&mut self) {
        T::enable_interrupt(self)
    }

    #[inline]
    fn disable_interrupt(&mut self) {
        T::disable_interrupt(self)
    }

    #[inline]
    fn take_capture(&mut self) -> Option<u16> {
        T::take_capture(self)
    }
}

/// Capture unit with its interrupt enabled, together with the recorder it fills.
///
/// The interrupt is enabled when the guard is created and disabled when it is
/// dropped, so the window in which edges are recorded is exactly the guard's
/// scope, early returns included. The recorder stays borrowed for that whole
/// scope.
pub struct Armed<'a, C: EdgeCapture, R: RecorderCell> {
    capture: &'a mut C,
    recorder: &'a mut R,
}

impl<'a, C: EdgeCapture, R: RecorderCell> Armed<'a, C, R> {
    pub fn new(capture: &'a mut C, recorder: &'a mut R) -> Self {
        capture.enable_interrupt();
        Self { capture, recorder }
    }

    pub fn counter(&mut self) -> u16 {
        self.capture.counter()
    }

    pub fn take_capture(&mut self) -> Option<u16> {
        self.capture.take_capture()
    }

    /// Records a polled edge and points the capture unit at the next one.
    pub fn record(&mut self, timestamp: u16, line_high: bool) {
        let polarity = self
            .recorder
            .lock(|recorder| recorder.on_edge(timestamp, line_high));
        self.capture.set_polarity(polarity);
    }
}

impl<C: EdgeCapture, R: RecorderCell> Drop for Armed<'_, C, R> {
    fn drop(&mut self) {
        self.capture.disable_interrupt();
    }
}
