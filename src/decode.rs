//! Bit extraction and checksum validation.
//!
//! A frame is 40 bits: 16 bits of humidity, 16 bits of temperature and an 8-bit
//! checksum, most significant bit first. Each bit is the length of a high pulse,
//! about 26-28 us for a `0` and about 70 us for a `1`.
//!
//! Intervals recorded before the frame (the sensor's response preamble, line
//! noise after the trigger) are ignored by decoding from the end of the capture
//! backwards: the last sample is the checksum's least significant bit.

use crate::error::DecodeError;

/// High-pulse length, in microsecond ticks, above which a bit reads as `1`.
pub const BIT_THRESHOLD_TICKS: u16 = 40;

/// Number of intervals in a complete frame.
pub const FRAME_BITS: usize = 40;

/// A decoded frame whose checksum has not been checked yet.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Relative humidity in tenths of a percent.
    pub humidity: u16,
    /// Temperature in tenths of a degree Celsius.
    pub temperature: u16,
    /// Checksum byte as transmitted.
    pub checksum: u8,
}

impl Frame {
    /// Sum of the four data bytes, modulo 256.
    pub fn computed_checksum(&self) -> u8 {
        checksum(self.humidity, self.temperature)
    }

    /// Returns the frame if its checksum matches the data.
    pub fn validate(self) -> Result<Self, DecodeError> {
        let computed = self.computed_checksum();
        if computed == self.checksum {
            Ok(self)
        } else {
            Err(DecodeError::ChecksumMismatch {
                expected: self.checksum,
                computed,
            })
        }
    }
}

/// Modulo-256 sum of the bytes of `humidity` and `temperature`.
pub fn checksum(humidity: u16, temperature: u16) -> u8 {
    humidity
        .to_le_bytes()
        .iter()
        .chain(temperature.to_le_bytes().iter())
        .fold(0u8, |sum, v| sum.wrapping_add(*v))
}

/// Reads one bit from a high-pulse length.
#[inline]
pub fn bit(sample: u16, threshold: u16) -> bool {
    sample > threshold
}

/// Decodes the last [`FRAME_BITS`] intervals of a capture.
///
/// Fails with [`DecodeError::TruncatedCapture`] when fewer intervals were
/// recorded; partial frames are never decoded. The checksum is not checked,
/// see [`Frame::validate`].
pub fn decode(samples: &[u16], threshold: u16) -> Result<Frame, DecodeError> {
    if samples.len() < FRAME_BITS {
        return Err(DecodeError::TruncatedCapture {
            recorded: samples.len(),
        });
    }

    let mut newest_first = samples.iter().rev();
    let checksum = pop_bits(&mut newest_first, 8, threshold) as u8;
    let temperature = pop_bits(&mut newest_first, 16, threshold);
    let humidity = pop_bits(&mut newest_first, 16, threshold);

    Ok(Frame {
        humidity,
        temperature,
        checksum,
    })
}

/// Takes `count` samples; the n-th sample taken sets bit n.
fn pop_bits<'a>(samples: &mut impl Iterator<Item = &'a u16>, count: usize, threshold: u16) -> u16 {
    samples
        .take(count)
        .enumerate()
        .filter(|(_, sample)| bit(**sample, threshold))
        .fold(0u16, |value, (i, _)| value | (1 << i))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::vec::Vec;

    pub(crate) const ZERO: u16 = 26;
    pub(crate) const ONE: u16 = 70;

    /// High-pulse lengths for a frame, in transmission order.
    pub(crate) fn encode_frame(humidity: u16, temperature: u16, checksum: u8) -> Vec<u16> {
        let mut bits = Vec::with_capacity(FRAME_BITS);
        for (value, width) in [(humidity, 16), (temperature, 16), (checksum as u16, 8)] {
            for i in (0..width).rev() {
                bits.push(if (value >> i) & 1 == 1 { ONE } else { ZERO });
            }
        }
        bits
    }

    #[test]
    fn threshold_boundary() {
        assert!(!bit(39, BIT_THRESHOLD_TICKS));
        assert!(!bit(40, BIT_THRESHOLD_TICKS));
        assert!(bit(41, BIT_THRESHOLD_TICKS));
    }

    #[test]
    fn checksum_sums_four_bytes() {
        // Humidity: 40.0% -> [0x01, 0x90], temperature: 24.6C -> [0x00, 0xF6]
        assert_eq!(checksum(0x0190, 0x00F6), 0x87);
        assert_eq!(checksum(0xFFFF, 0xFFFF), 0xFC);
        assert_eq!(checksum(0, 0), 0);
    }

    #[test]
    fn decodes_frame() {
        let samples = encode_frame(0x0190, 0x00F6, 0x87);

        let frame = decode(&samples, BIT_THRESHOLD_TICKS).unwrap();

        assert_eq!(
            frame,
            Frame {
                humidity: 400,
                temperature: 246,
                checksum: 0x87,
            }
        );
        assert_eq!(frame.validate(), Ok(frame));
    }

    #[test]
    fn ignores_samples_before_the_frame() {
        let mut samples = vec![12_000, 80];
        samples.extend(encode_frame(555, 246, checksum(555, 246)));

        let frame = decode(&samples, BIT_THRESHOLD_TICKS).unwrap();

        assert_eq!(frame.humidity, 555);
        assert_eq!(frame.temperature, 246);
        assert_eq!(frame.validate(), Ok(frame));
    }

    #[test]
    fn uses_the_given_threshold() {
        // With a threshold above the `1` pulse length every bit reads as zero.
        let samples = encode_frame(0xFFFF, 0xFFFF, 0xFC);
        let frame = decode(&samples, 100).unwrap();
        assert_eq!(frame.humidity, 0);
        assert_eq!(frame.checksum, 0);
    }

    #[test]
    fn truncated_capture_is_rejected() {
        let samples = encode_frame(400, 246, 0x87);

        assert_eq!(
            decode(&samples[1..], BIT_THRESHOLD_TICKS),
            Err(DecodeError::TruncatedCapture { recorded: 39 })
        );
        assert_eq!(
            decode(&[], BIT_THRESHOLD_TICKS),
            Err(DecodeError::TruncatedCapture { recorded: 0 })
        );
    }

    #[test]
    fn checksum_catches_every_single_bit_flip() {
        let clean = encode_frame(0x0190, 0x00F6, 0x87);

        // Only the 32 data bits are covered by the checksum.
        for flipped in 0..32 {
            let mut samples = clean.clone();
            samples[flipped] = if samples[flipped] == ONE { ZERO } else { ONE };

            let frame = decode(&samples, BIT_THRESHOLD_TICKS).unwrap();
            assert!(
                matches!(frame.validate(), Err(DecodeError::ChecksumMismatch { .. })),
                "bit {flipped} flip went unnoticed"
            );
        }
    }
}
