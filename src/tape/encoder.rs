//! Pulse encoder - tape payloads to edge timings
//!
//! Converts T-state timings from the tape image into nanosecond pulse
//! durations for a given CPU clock. Each pulse is the time between two level
//! transitions. A non-positive duration toggles the level without advancing
//! time, which is how a pause turns into silence: the pair `[0, d]` flips the
//! level twice, so the playback loop sees an unchanged level for `d` ns.

use crate::DEFAULT_CPU_FREQ;

/// Lazy stream of pulse durations in nanoseconds.
pub type Pulses<'a> = Box<dyn Iterator<Item = i64> + 'a>;

/// Builds pulse streams for one CPU clock frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    cpu_freq: u32,
}

impl Encoder {
    pub fn new(cpu_freq: u32) -> Self {
        Self { cpu_freq }
    }

    pub fn cpu_freq(&self) -> u32 {
        self.cpu_freq
    }

    /// Duration of `tstates` CPU cycles in nanoseconds, rounded to nearest
    pub fn tstates(&self, tstates: u32) -> i64 {
        let freq = self.cpu_freq.max(1) as u64;
        ((tstates as u64 * 1_000_000_000 + freq / 2) / freq) as i64
    }

    /// `count` pulses of `pulse_len` T-states
    pub fn tone(self, pulse_len: u16, count: u16) -> impl Iterator<Item = i64> {
        std::iter::repeat(self.tstates(pulse_len as u32)).take(count as usize)
    }

    /// One pulse per entry, lengths in T-states
    pub fn sequence<I>(self, pulses: I) -> impl Iterator<Item = i64>
    where
        I: IntoIterator<Item = u16>,
    {
        pulses
            .into_iter()
            .map(move |len| self.tstates(len as u32))
    }

    /// Data bits MSB first, two equal pulses per bit.
    ///
    /// Only `used_bits` of the final byte are sent (0 is treated as 8).
    pub fn data<'a>(
        self,
        zero_pulse: u16,
        one_pulse: u16,
        data: &'a [u8],
        used_bits: u8,
    ) -> impl Iterator<Item = i64> + 'a {
        let zero = self.tstates(zero_pulse as u32);
        let one = self.tstates(one_pulse as u32);
        let last = data.len().saturating_sub(1);
        let last_bits = match used_bits {
            1..=8 => used_bits,
            _ => 8,
        };

        data.iter().enumerate().flat_map(move |(i, &byte)| {
            let bits = if i == last { last_bits } else { 8 };
            (0..bits).flat_map(move |bit| {
                let pulse = if byte & (0x80 >> bit) != 0 { one } else { zero };
                [pulse, pulse]
            })
        })
    }

    /// Silence of `millis` milliseconds; nothing for zero
    pub fn pause(self, millis: u16) -> impl Iterator<Item = i64> {
        let duration = millis as i64 * 1_000_000;
        (millis > 0).then_some([0, duration]).into_iter().flatten()
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_FREQ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tstates_to_ns() {
        let enc = Encoder::new(3_500_000);
        assert_eq!(enc.cpu_freq(), 3_500_000);
        assert_eq!(Encoder::default(), enc);
        // 3.5 T-states per microsecond
        assert_eq!(enc.tstates(3_500_000), 1_000_000_000);
        assert_eq!(enc.tstates(7), 2_000);
        // 2168 / 3.5MHz = 619.428us
        assert_eq!(enc.tstates(2168), 619_429);
    }

    #[test]
    fn test_data_bits_msb_first() {
        let enc = Encoder::new(1_000_000_000); // 1 T-state = 1ns
        let pulses: Vec<i64> = enc.data(1, 2, &[0b1010_0000], 3).collect();
        assert_eq!(pulses, vec![2, 2, 1, 1, 2, 2]);
    }

    #[test]
    fn test_used_bits_only_affects_last_byte() {
        let enc = Encoder::new(1_000_000_000);
        assert_eq!(enc.data(1, 2, &[0xFF, 0x00], 1).count(), 16 + 2);
        assert_eq!(enc.data(1, 2, &[0xFF], 0).count(), 16);
        assert_eq!(enc.data(1, 2, &[], 8).count(), 0);
    }

    #[test]
    fn test_pause_is_level_flip_plus_duration() {
        let enc = Encoder::default();
        assert_eq!(enc.pause(250).collect::<Vec<_>>(), vec![0, 250_000_000]);
        assert_eq!(enc.pause(0).count(), 0);
    }
}
