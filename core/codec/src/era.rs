//! Transaction validity window.
//!
//! A mortal era is a power-of-two period (4..=65536 blocks) plus the phase of
//! the birth block inside that period. It packs into two bytes:
//! the low four bits hold `log2(period) - 1` and the upper twelve the
//! quantized phase. An immortal era is the single byte `0x00`.

use parity_scale_codec::{Decode, Encode, Error, Input, Output};

pub const MIN_PERIOD: u64 = 4;
pub const MAX_PERIOD: u64 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    Immortal,
    Mortal { period: u64, phase: u64 },
}

impl Era {
    /// Era starting at block `current` and lasting at least `period` blocks.
    pub fn mortal(period: u64, current: u64) -> Self {
        let period = period
            .checked_next_power_of_two()
            .unwrap_or(MAX_PERIOD)
            .clamp(MIN_PERIOD, MAX_PERIOD);
        let phase = current % period;
        let quantize_factor = (period >> 12).max(1);
        Era::Mortal {
            period,
            phase: phase / quantize_factor * quantize_factor,
        }
    }

    /// A zero duration means the transaction never expires.
    pub fn from_window(first_valid: u64, max_duration: u64) -> Self {
        if max_duration == 0 {
            Era::Immortal
        } else {
            Era::mortal(max_duration, first_valid)
        }
    }

    pub fn is_immortal(&self) -> bool {
        matches!(self, Era::Immortal)
    }

    /// Period in blocks, 0 when immortal.
    pub fn period(&self) -> u64 {
        match self {
            Era::Immortal => 0,
            Era::Mortal { period, .. } => *period,
        }
    }

    pub fn phase(&self) -> u64 {
        match self {
            Era::Immortal => 0,
            Era::Mortal { phase, .. } => *phase,
        }
    }

    /// First block at or before `current` in which the era is valid.
    pub fn birth(&self, current: u64) -> u64 {
        match self {
            Era::Immortal => 0,
            Era::Mortal { period, phase } => (current.max(*phase) - phase) / period * period + phase,
        }
    }

    /// First block after `current` in which the era is no longer valid.
    pub fn death(&self, current: u64) -> u64 {
        match self {
            Era::Immortal => u64::MAX,
            Era::Mortal { period, .. } => self.birth(current) + period,
        }
    }
}

impl Encode for Era {
    fn size_hint(&self) -> usize {
        match self {
            Era::Immortal => 1,
            Era::Mortal { .. } => 2,
        }
    }

    fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
        match self {
            Era::Immortal => dest.push_byte(0),
            Era::Mortal { period, phase } => {
                let quantize_factor = (*period >> 12).max(1);
                let low = (period.trailing_zeros().saturating_sub(1)).clamp(1, 15) as u16;
                let encoded = low | (((*phase / quantize_factor) as u16) << 4);
                encoded.encode_to(dest);
            }
        }
    }
}

impl Decode for Era {
    fn decode<I: Input>(input: &mut I) -> Result<Self, Error> {
        let first = input.read_byte()?;
        if first == 0 {
            return Ok(Era::Immortal);
        }
        let encoded = first as u64 + ((input.read_byte()? as u64) << 8);
        let period = 2 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period >= MIN_PERIOD && phase < period {
            Ok(Era::Mortal { period, phase })
        } else {
            Err("Invalid period and phase".into())
        }
    }
}
