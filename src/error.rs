use core::fmt;

/// Protocol-level faults found while decoding a capture.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer edge intervals were recorded than a full frame needs.
    TruncatedCapture {
        /// Number of intervals recorded during the window.
        recorded: usize,
    },
    /// The transmitted checksum does not match the decoded data bytes.
    ChecksumMismatch {
        /// Checksum byte sent by the sensor.
        expected: u8,
        /// Checksum computed from the decoded humidity and temperature.
        computed: u8,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TruncatedCapture { recorded } => {
                write!(f, "truncated capture: {recorded} intervals recorded")
            }
            DecodeError::ChecksumMismatch { expected, computed } => write!(
                f,
                "checksum mismatch: sensor sent {expected:#04x}, data sums to {computed:#04x}"
            ),
        }
    }
}

/// Possible errors from the DHT driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The captured pulse train could not be decoded into a valid reading.
    Decode(DecodeError),
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhtError::Decode(err) => err.fmt(f),
            DhtError::PinError(err) => write!(f, "pin error: {err:?}"),
        }
    }
}
