use core::fmt;

use crate::decode::Frame;
use crate::error::DhtError;

/// A validated reading.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading {
    /// Relative humidity in tenths of a percent.
    pub humidity: u16,
    /// Temperature in tenths of a degree Celsius.
    pub temperature: u16,
}

impl Reading {
    /// Relative humidity in percent.
    pub fn relative_humidity(&self) -> f32 {
        self.humidity as f32 / 10.0
    }

    /// Temperature in degrees Celsius.
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 10.0
    }

    /// Humidity ready to print, e.g. `55.5`.
    pub fn humidity_tenths(&self) -> Tenths {
        Tenths(self.humidity)
    }

    /// Temperature ready to print, e.g. `24.6`.
    pub fn temperature_tenths(&self) -> Tenths {
        Tenths(self.temperature)
    }
}

impl From<Frame> for Reading {
    fn from(frame: Frame) -> Self {
        Reading {
            humidity: frame.humidity,
            temperature: frame.temperature,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% {}C",
            self.humidity_tenths(),
            self.temperature_tenths()
        )
    }
}

/// Fixed-point value with one decimal, formatted without floating point.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tenths(pub u16);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// Outcome of one measurement cycle.
///
/// `humidity` and `temperature` are zero unless `valid` is set.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasurementResult {
    /// Relative humidity in tenths of a percent.
    pub humidity: u16,
    /// Temperature in tenths of a degree Celsius.
    pub temperature: u16,
    pub valid: bool,
}

impl MeasurementResult {
    pub const INVALID: Self = Self {
        humidity: 0,
        temperature: 0,
        valid: false,
    };

    /// The reading, if the cycle succeeded.
    pub fn reading(&self) -> Option<Reading> {
        self.valid.then_some(Reading {
            humidity: self.humidity,
            temperature: self.temperature,
        })
    }
}

impl From<Reading> for MeasurementResult {
    fn from(reading: Reading) -> Self {
        Self {
            humidity: reading.humidity,
            temperature: reading.temperature,
            valid: true,
        }
    }
}

impl<E> From<Result<Reading, DhtError<E>>> for MeasurementResult {
    fn from(result: Result<Reading, DhtError<E>>) -> Self {
        result.map_or(Self::INVALID, Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn tenths_format_without_floats() {
        assert_eq!(Tenths(555).to_string(), "55.5");
        assert_eq!(Tenths(7).to_string(), "0.7");
        assert_eq!(Tenths(1000).to_string(), "100.0");
    }

    #[test]
    fn reading_conversions() {
        let reading = Reading {
            humidity: 555,
            temperature: 246,
        };
        assert_eq!(reading.relative_humidity(), 55.5);
        assert_eq!(reading.temperature_celsius(), 24.6);
        assert_eq!(reading.to_string(), "55.5% 24.6C");
    }

    #[test]
    fn failure_discards_values() {
        let failed: Result<Reading, DhtError<()>> =
            Err(DhtError::Decode(DecodeError::TruncatedCapture { recorded: 12 }));

        let result = MeasurementResult::from(failed);

        assert_eq!(result, MeasurementResult::INVALID);
        assert_eq!(result.reading(), None);
    }

    #[test]
    fn success_keeps_values() {
        let reading = Reading {
            humidity: 400,
            temperature: 246,
        };

        let result = MeasurementResult::from(Ok::<_, DhtError<()>>(reading));

        assert!(result.valid);
        assert_eq!(result.reading(), Some(reading));
    }
}
